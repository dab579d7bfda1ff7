//! 目錄資料表（材料、設備、生產方法、生產速率）
//!
//! 這些表由外部載入器解析後以記憶體結構提供，核心只做查詢。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::component::ScaleVars;
use crate::step::ProductionStep;
use crate::{checked_div, McmError, Result};

/// 材料類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Fabric,
    Resin,
    Hardener,
    Prepreg,
    Core,
    Adhesive,
    Coating,
}

impl MaterialCategory {
    pub const ALL: [MaterialCategory; 7] = [
        MaterialCategory::Fabric,
        MaterialCategory::Resin,
        MaterialCategory::Hardener,
        MaterialCategory::Prepreg,
        MaterialCategory::Core,
        MaterialCategory::Adhesive,
        MaterialCategory::Coating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::Fabric => "fabric",
            MaterialCategory::Resin => "resin",
            MaterialCategory::Hardener => "hardener",
            MaterialCategory::Prepreg => "prepreg",
            MaterialCategory::Core => "core",
            MaterialCategory::Adhesive => "adhesive",
            MaterialCategory::Coating => "coating",
        }
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 用於質量計算的材料屬性
///
/// 新增屬性時必須同時補上 [`MaterialProperty::si_factor`] 的換算係數。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialProperty {
    /// 面密度（g/m²）
    ArealWeight,
    /// 密度（kg/m³）
    Density,
    /// 厚度（mm）
    Thickness,
    /// 固化後厚度（mm）
    CuredThickness,
}

impl MaterialProperty {
    /// 目錄數值換算到 kg / m 單位的係數
    pub fn si_factor(&self) -> f64 {
        match self {
            MaterialProperty::Density => 1.0,
            MaterialProperty::ArealWeight => 1.0e-3,
            MaterialProperty::Thickness => 1.0e-3,
            MaterialProperty::CuredThickness => 1.0e-3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialProperty::ArealWeight => "areal weight",
            MaterialProperty::Density => "density",
            MaterialProperty::Thickness => "thickness",
            MaterialProperty::CuredThickness => "thickness (cured)",
        }
    }
}

/// 固化曲線的一個區段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CureSegment {
    /// 溫度（°C）
    pub temperature: f64,
    /// 區段時間（小時）
    pub duration: f64,
}

/// 固化曲線（時間序列）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CureCycle {
    pub segments: Vec<CureSegment>,
}

impl CureCycle {
    pub fn new(segments: Vec<CureSegment>) -> Self {
        Self { segments }
    }

    /// 由 (溫度, 時間) 對建立
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            segments: pairs
                .iter()
                .map(|&(temperature, duration)| CureSegment {
                    temperature,
                    duration,
                })
                .collect(),
        }
    }

    /// 所有時間增量總和（小時）
    pub fn total_hours(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

/// 材料屬性
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialSpec {
    #[serde(default)]
    pub description: Option<String>,

    /// 單價（每公斤）
    pub cost: f64,

    #[serde(default)]
    pub density: Option<f64>,

    #[serde(default)]
    pub areal_weight: Option<f64>,

    #[serde(default)]
    pub thickness: Option<f64>,

    #[serde(default)]
    pub cured_thickness: Option<f64>,

    /// 纖維重量分率（0–1）
    #[serde(default)]
    pub fibre_content: Option<f64>,

    /// 樹脂:固化劑 質量比
    #[serde(default)]
    pub resin_hardener_ratio: Option<f64>,

    #[serde(default)]
    pub cure_cycle: Option<CureCycle>,

    #[serde(default)]
    pub post_cure_cycle: Option<CureCycle>,
}

impl MaterialSpec {
    pub fn new(cost: f64) -> Self {
        Self {
            cost,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_areal_weight(mut self, areal_weight: f64) -> Self {
        self.areal_weight = Some(areal_weight);
        self
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = Some(thickness);
        self
    }

    pub fn with_cured_thickness(mut self, thickness: f64) -> Self {
        self.cured_thickness = Some(thickness);
        self
    }

    pub fn with_fibre_content(mut self, fibre_content: f64) -> Self {
        self.fibre_content = Some(fibre_content);
        self
    }

    pub fn with_resin_hardener_ratio(mut self, ratio: f64) -> Self {
        self.resin_hardener_ratio = Some(ratio);
        self
    }

    pub fn with_cure_cycle(mut self, cycle: CureCycle) -> Self {
        self.cure_cycle = Some(cycle);
        self
    }

    pub fn with_post_cure_cycle(mut self, cycle: CureCycle) -> Self {
        self.post_cure_cycle = Some(cycle);
        self
    }

    /// 原始目錄數值
    pub fn property(&self, property: MaterialProperty) -> Option<f64> {
        match property {
            MaterialProperty::ArealWeight => self.areal_weight,
            MaterialProperty::Density => self.density,
            MaterialProperty::Thickness => self.thickness,
            MaterialProperty::CuredThickness => self.cured_thickness,
        }
    }

    /// 換算單位後的數值
    pub fn si_property(&self, material: &str, property: MaterialProperty) -> Result<f64> {
        self.property(property)
            .map(|value| value * property.si_factor())
            .ok_or_else(|| McmError::MissingMaterialProperty {
                material: material.to_string(),
                property: property.as_str().to_string(),
            })
    }
}

/// 耗材屬性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumableSpec {
    /// 單價（每公斤）
    pub cost: f64,
    /// 面密度（g/m²）
    pub areal_weight: f64,
    /// 決定用量的縮放變數
    pub scaling_variable: String,
    #[serde(default)]
    pub scrap_rate: f64,
}

impl ConsumableSpec {
    pub fn new(cost: f64, areal_weight: f64, scaling_variable: &str, scrap_rate: f64) -> Self {
        Self {
            cost,
            areal_weight,
            scaling_variable: scaling_variable.to_string(),
            scrap_rate,
        }
    }
}

/// 材料目錄
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialsCatalogue {
    /// 類別 → 材料名稱 → 屬性
    #[serde(default)]
    pub categories: BTreeMap<MaterialCategory, BTreeMap<String, MaterialSpec>>,

    #[serde(default)]
    pub consumables: BTreeMap<String, ConsumableSpec>,
}

impl MaterialsCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：添加材料
    pub fn with_material(mut self, category: MaterialCategory, name: &str, spec: MaterialSpec) -> Self {
        self.insert_material(category, name, spec);
        self
    }

    /// 建構器模式：添加耗材
    pub fn with_consumable(mut self, name: &str, spec: ConsumableSpec) -> Self {
        self.consumables.insert(name.to_string(), spec);
        self
    }

    pub fn insert_material(&mut self, category: MaterialCategory, name: &str, spec: MaterialSpec) {
        self.categories
            .entry(category)
            .or_default()
            .insert(name.to_string(), spec);
    }

    pub fn material(&self, category: MaterialCategory, name: &str) -> Result<&MaterialSpec> {
        self.categories
            .get(&category)
            .and_then(|materials| materials.get(name))
            .ok_or_else(|| McmError::MaterialNotFound {
                category: category.to_string(),
                name: name.to_string(),
            })
    }

    pub fn consumable(&self, name: &str) -> Result<&ConsumableSpec> {
        self.consumables
            .get(name)
            .ok_or_else(|| McmError::ConsumableNotFound(name.to_string()))
    }
}

/// 廠房佔地規則
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Floorspace {
    /// 不佔用獨立廠房面積
    #[default]
    NotApplicable,
    /// 機台長 × 寬
    Footprint { length: f64, width: f64 },
    /// 以零件縮放變數乘以係數
    ScalingVariable { variable: String, factor: f64 },
    /// 固定面積
    Fixed { area: f64 },
}

impl Floorspace {
    /// 計算佔地面積（m²），縮放變數缺失時回傳 None
    pub fn area(&self, scale_vars: &ScaleVars) -> Option<f64> {
        match self {
            Floorspace::NotApplicable => Some(0.0),
            Floorspace::Footprint { length, width } => Some(length * width),
            Floorspace::ScalingVariable { variable, factor } => {
                scale_vars.get(variable).map(|value| value * factor)
            }
            Floorspace::Fixed { area } => Some(*area),
        }
    }
}

/// 資本設備
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalEquipment {
    pub purchase_cost: f64,

    /// 安裝費用（購置價的百分比）
    #[serde(default)]
    pub installation_percent: f64,

    /// 使用年限（年）
    pub useful_life: f64,

    #[serde(default)]
    pub salvage_value: f64,

    #[serde(default)]
    pub floorspace: Floorspace,

    /// 平均功率（kW）
    #[serde(default)]
    pub average_power_usage: Option<f64>,
}

impl CapitalEquipment {
    pub fn new(purchase_cost: f64, installation_percent: f64, useful_life: f64, salvage_value: f64) -> Self {
        Self {
            purchase_cost,
            installation_percent,
            useful_life,
            salvage_value,
            floorspace: Floorspace::NotApplicable,
            average_power_usage: None,
        }
    }

    pub fn with_floorspace(mut self, floorspace: Floorspace) -> Self {
        self.floorspace = floorspace;
        self
    }

    pub fn with_power_usage(mut self, kilowatts: f64) -> Self {
        self.average_power_usage = Some(kilowatts);
        self
    }

    /// 年折舊 = (購置價 × (1 + 安裝%) − 殘值) / 使用年限
    pub fn annual_depreciation(&self, name: &str) -> Result<f64> {
        let install_factor = 1.0 + self.installation_percent / 100.0;
        checked_div(
            self.purchase_cost * install_factor - self.salvage_value,
            self.useful_life,
            &format!("設備 {} 使用年限", name),
        )
    }
}

/// 模具（線性成本模型，依模具壽命攤提）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mould {
    pub scaling_coefficient: f64,
    pub scaling_constant: f64,
    pub scaling_variable: String,
    /// 模具壽命（件數）
    pub lifetime: f64,
}

impl Mould {
    pub fn new(scaling_coefficient: f64, scaling_constant: f64, scaling_variable: &str, lifetime: f64) -> Self {
        Self {
            scaling_coefficient,
            scaling_constant,
            scaling_variable: scaling_variable.to_string(),
            lifetime,
        }
    }

    /// 每件攤提成本
    pub fn cost_per_part(&self, name: &str, scale_value: f64) -> Result<f64> {
        let total = self.scaling_coefficient * scale_value + self.scaling_constant;
        checked_div(total, self.lifetime, &format!("模具 {} 壽命", name))
    }
}

/// 設備目錄
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentCatalogue {
    #[serde(default)]
    pub capital: BTreeMap<String, CapitalEquipment>,

    #[serde(default)]
    pub moulds: BTreeMap<String, Mould>,
}

impl EquipmentCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capital(mut self, name: &str, equipment: CapitalEquipment) -> Self {
        self.capital.insert(name.to_string(), equipment);
        self
    }

    pub fn with_mould(mut self, name: &str, mould: Mould) -> Self {
        self.moulds.insert(name.to_string(), mould);
        self
    }

    /// 名稱含 "mould"（不分大小寫）即視為模具
    pub fn is_mould(name: &str) -> bool {
        name.to_lowercase().contains("mould")
    }

    pub fn capital(&self, name: &str) -> Result<&CapitalEquipment> {
        self.capital
            .get(name)
            .ok_or_else(|| McmError::EquipmentNotFound(name.to_string()))
    }

    pub fn mould(&self, name: &str) -> Result<&Mould> {
        self.moulds
            .get(name)
            .ok_or_else(|| McmError::MouldNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capital.contains_key(name) || self.moulds.contains_key(name)
    }
}

/// 生產方法（有序工序範本）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionMethod {
    pub steps: Vec<ProductionStep>,
}

impl ProductionMethod {
    pub fn new(steps: Vec<ProductionStep>) -> Self {
        Self { steps }
    }

    /// 深拷貝工序範本並移除忽略清單中的工序
    pub fn steps_excluding(&self, ignore: &[String]) -> Vec<ProductionStep> {
        self.steps
            .iter()
            .filter(|s| !ignore.contains(&s.label))
            .cloned()
            .collect()
    }
}

/// 冪律工時係數：工時 = coefficient × x^exponent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLaw {
    pub coefficient: f64,
    pub exponent: f64,
}

impl RateLaw {
    pub fn new(coefficient: f64, exponent: f64) -> Self {
        Self {
            coefficient,
            exponent,
        }
    }

    pub fn hours(&self, scale_value: f64) -> f64 {
        self.coefficient * scale_value.powf(self.exponent)
    }
}

/// 全域生產參數
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralVariables {
    /// 時薪
    pub salary: f64,

    /// 年產量（parts per annum）
    pub parts_per_annum: f64,

    /// 每日生產小時
    pub product_hours_per_day: f64,

    /// 每年生產天數
    pub product_days_per_year: f64,

    /// 電價（每 kWh）
    #[serde(default)]
    pub energy_rate: f64,
}

impl GeneralVariables {
    pub fn new(salary: f64, parts_per_annum: f64, product_hours_per_day: f64, product_days_per_year: f64) -> Self {
        Self {
            salary,
            parts_per_annum,
            product_hours_per_day,
            product_days_per_year,
            energy_rate: 0.0,
        }
    }

    pub fn with_energy_rate(mut self, energy_rate: f64) -> Self {
        self.energy_rate = energy_rate;
        self
    }

    /// 以生產日曆推算年度生產天數
    pub fn with_calendar(mut self, calendar: &crate::ProductionCalendar, year: i32) -> Self {
        self.product_days_per_year = f64::from(calendar.working_days_in_year(year));
        self
    }

    /// 單條產線每年可用工時
    pub fn annual_hours(&self) -> f64 {
        self.product_hours_per_day * self.product_days_per_year
    }
}

/// 生產速率表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRates {
    pub general: GeneralVariables,

    /// 生產方法 → 速率參數 → 冪律
    #[serde(default)]
    pub methods: BTreeMap<String, BTreeMap<String, RateLaw>>,
}

impl ProductionRates {
    pub fn new(general: GeneralVariables) -> Self {
        Self {
            general,
            methods: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, method: &str, parameter: &str, law: RateLaw) -> Self {
        self.methods
            .entry(method.to_string())
            .or_default()
            .insert(parameter.to_string(), law);
        self
    }

    pub fn rate(&self, method: &str, parameter: &str) -> Result<RateLaw> {
        self.methods
            .get(method)
            .and_then(|rates| rates.get(parameter))
            .copied()
            .ok_or_else(|| McmError::ProductionRateNotFound {
                method: method.to_string(),
                parameter: parameter.to_string(),
            })
    }
}

/// 完整目錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default)]
    pub materials: MaterialsCatalogue,

    #[serde(default)]
    pub equipment: EquipmentCatalogue,

    #[serde(default)]
    pub methods: BTreeMap<String, ProductionMethod>,

    pub rates: ProductionRates,
}

impl Catalogue {
    pub fn new(
        materials: MaterialsCatalogue,
        equipment: EquipmentCatalogue,
        methods: BTreeMap<String, ProductionMethod>,
        rates: ProductionRates,
    ) -> Self {
        Self {
            materials,
            equipment,
            methods,
            rates,
        }
    }

    /// 從 JSON 字串載入
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn method(&self, name: &str) -> Result<&ProductionMethod> {
        self.methods
            .get(name)
            .ok_or_else(|| McmError::ProductionMethodNotFound(name.to_string()))
    }

    pub fn general(&self) -> &GeneralVariables {
        &self.rates.general
    }
}
