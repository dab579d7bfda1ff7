//! # MCM Core
//!
//! 複合材料結構件製造成本模型的核心資料模型與類型定義

pub mod calendar;
pub mod catalogue;
pub mod component;
pub mod config;
pub mod input;
pub mod records;
pub mod step;

// Re-export 主要類型
pub use calendar::ProductionCalendar;
pub use catalogue::{
    CapitalEquipment, Catalogue, ConsumableSpec, CureCycle, CureSegment, EquipmentCatalogue,
    Floorspace, GeneralVariables, MaterialCategory, MaterialProperty, MaterialSpec,
    MaterialsCatalogue, Mould, ProductionMethod, ProductionRates, RateLaw,
};
pub use component::{Brand, Component, ScaleVars};
pub use config::{AnalysisConfig, ConsumablePolicy};
pub use input::{
    ManufacturingInput, PartSpec, PartType, ProductSpec, ProductionPhase, ScalingTable,
};
pub use records::{
    ConsumableCosts, CostLedger, EquipmentCosts, LabourCosts, LedgerEntry, MaterialCosts,
};
pub use step::{
    LabourScaling, LabourSource, MaterialScaling, ProductionStep, StepField, ThermalCycleKind,
};

/// 目錄中表示「不適用」的哨兵字串
pub const NOT_APPLICABLE: &str = "N/A";

/// 成本模型錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum McmError {
    #[error("找不到材料: {category} / {name}")]
    MaterialNotFound { category: String, name: String },

    #[error("找不到耗材: {0}")]
    ConsumableNotFound(String),

    #[error("找不到設備: {0}")]
    EquipmentNotFound(String),

    #[error("找不到模具: {0}")]
    MouldNotFound(String),

    #[error("找不到生產方法: {0}")]
    ProductionMethodNotFound(String),

    #[error("找不到生產速率參數: {method} / {parameter}")]
    ProductionRateNotFound { method: String, parameter: String },

    #[error("零件 {component} 未指定 {category} 材料")]
    MaterialNotAssigned { component: String, category: String },

    #[error("零件 {component} 缺少縮放變數: {variable}")]
    ScalingVariableNotFound { component: String, variable: String },

    #[error("材料 {material} 缺少屬性: {property}")]
    MissingMaterialProperty { material: String, property: String },

    #[error("無效的廢料率: {0}（必須介於 0 與 1 之間且小於 1）")]
    InvalidScrapRate(f64),

    #[error("除以零: {0}")]
    DivisionByZero(String),

    #[error("零件 {0} 尚未計算生產線數量")]
    ProductionLinesNotSized(String),

    #[error("工序 {0} 未定義工時來源")]
    LabourUndefined(String),

    #[error("工序覆寫值無效: {key} = {value}")]
    InvalidOverride { key: String, value: String },

    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("JSON 解析錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("零件 {component} 工序 {step} 計算失敗: {source}")]
    Step {
        component: String,
        step: String,
        #[source]
        source: Box<McmError>,
    },
}

impl McmError {
    /// 附加零件名稱與工序標籤
    pub fn at_step(self, component: &str, step: &str) -> Self {
        match self {
            already @ McmError::Step { .. } => already,
            other => McmError::Step {
                component: component.to_string(),
                step: step.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// 取得最內層的錯誤
    pub fn root_cause(&self) -> &McmError {
        match self {
            McmError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, McmError>;

/// 安全除法，除數為零時回傳 `DivisionByZero`
pub fn checked_div(numerator: f64, denominator: f64, context: &str) -> Result<f64> {
    if denominator == 0.0 {
        return Err(McmError::DivisionByZero(context.to_string()));
    }
    Ok(numerator / denominator)
}
