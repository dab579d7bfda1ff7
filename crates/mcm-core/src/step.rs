//! 生產工序模型

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalogue::{MaterialCategory, MaterialProperty};
use crate::{McmError, Result, NOT_APPLICABLE};

/// 以縮放變數與速率參數推算工時
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabourScaling {
    /// 縮放變數名稱（例如 "Ply Length"）
    pub variable: String,
    /// 生產速率參數名稱（例如 "fabricCutRate"）
    pub rate: String,
}

impl LabourScaling {
    pub fn new(variable: &str, rate: &str) -> Self {
        Self {
            variable: variable.to_string(),
            rate: rate.to_string(),
        }
    }
}

/// 決定材料質量的縮放變數與材料屬性
///
/// 質量 = 縮放變數值 × Π(屬性值 × 單位換算)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialScaling {
    pub variable: String,
    pub properties: Vec<MaterialProperty>,
}

impl MaterialScaling {
    pub fn new(variable: &str, properties: Vec<MaterialProperty>) -> Self {
        Self {
            variable: variable.to_string(),
            properties,
        }
    }
}

/// 熱循環類型（於目錄編寫時指定）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalCycleKind {
    #[default]
    None,
    /// 樹脂（或預浸料）固化
    Cure,
    /// 樹脂（或預浸料）後固化
    PostCure,
    /// 膠接面固化（黏著劑）
    BondlineCure,
}

impl ThermalCycleKind {
    /// 提供固化曲線的材料類別，依優先順序
    pub fn source_categories(&self) -> &'static [MaterialCategory] {
        match self {
            ThermalCycleKind::None => &[],
            ThermalCycleKind::Cure | ThermalCycleKind::PostCure => {
                &[MaterialCategory::Resin, MaterialCategory::Prepreg]
            }
            ThermalCycleKind::BondlineCure => &[MaterialCategory::Adhesive],
        }
    }

    pub fn is_post_cure(&self) -> bool {
        matches!(self, ThermalCycleKind::PostCure)
    }
}

/// 工時來源（依優先順序判定）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabourSource<'a> {
    RateScaling(&'a LabourScaling),
    FixedHours(f64),
    ThermalCycle(ThermalCycleKind),
}

/// 生產工序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionStep {
    /// 工序標籤（例如 "step 01"）
    pub label: String,

    /// 顯示名稱
    pub name: String,

    #[serde(default)]
    pub labour_scaling: Option<LabourScaling>,

    #[serde(default)]
    pub labour_hours: Option<f64>,

    #[serde(default = "default_staff")]
    pub staff: f64,

    /// 所屬作業階段（preform / cure / assembly / finishing）
    pub activity: String,

    #[serde(default)]
    pub capital_equipment: Vec<String>,

    #[serde(default)]
    pub material: Option<MaterialCategory>,

    #[serde(default)]
    pub material_scaling: Option<MaterialScaling>,

    #[serde(default)]
    pub scrap_rate: Option<f64>,

    #[serde(default)]
    pub consumables: Vec<String>,

    #[serde(default)]
    pub thermal_cycle: ThermalCycleKind,
}

fn default_staff() -> f64 {
    1.0
}

impl ProductionStep {
    pub fn new(label: &str, name: &str, activity: &str) -> Self {
        Self {
            label: label.to_string(),
            name: name.to_string(),
            labour_scaling: None,
            labour_hours: None,
            staff: default_staff(),
            activity: activity.to_string(),
            capital_equipment: Vec::new(),
            material: None,
            material_scaling: None,
            scrap_rate: None,
            consumables: Vec::new(),
            thermal_cycle: ThermalCycleKind::None,
        }
    }

    pub fn with_labour_scaling(mut self, variable: &str, rate: &str) -> Self {
        self.labour_scaling = Some(LabourScaling::new(variable, rate));
        self
    }

    pub fn with_labour_hours(mut self, hours: f64) -> Self {
        self.labour_hours = Some(hours);
        self
    }

    pub fn with_staff(mut self, staff: f64) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_equipment(mut self, names: &[&str]) -> Self {
        self.capital_equipment = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_material(
        mut self,
        category: MaterialCategory,
        variable: &str,
        properties: Vec<MaterialProperty>,
    ) -> Self {
        self.material = Some(category);
        self.material_scaling = Some(MaterialScaling::new(variable, properties));
        self
    }

    pub fn with_scrap_rate(mut self, scrap_rate: f64) -> Self {
        self.scrap_rate = Some(scrap_rate);
        self
    }

    pub fn with_consumables(mut self, names: &[&str]) -> Self {
        self.consumables = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_thermal_cycle(mut self, kind: ThermalCycleKind) -> Self {
        self.thermal_cycle = kind;
        self
    }

    /// 判定工時來源：速率縮放 > 固定工時 > 熱循環
    pub fn labour_source(&self) -> Option<LabourSource<'_>> {
        if let Some(scaling) = &self.labour_scaling {
            return Some(LabourSource::RateScaling(scaling));
        }
        if let Some(hours) = self.labour_hours {
            return Some(LabourSource::FixedHours(hours));
        }
        match self.thermal_cycle {
            ThermalCycleKind::None => None,
            kind => Some(LabourSource::ThermalCycle(kind)),
        }
    }

    /// 需要的設備（排除 "N/A"）
    pub fn equipment(&self) -> impl Iterator<Item = &str> {
        self.capital_equipment
            .iter()
            .map(String::as_str)
            .filter(|name| *name != NOT_APPLICABLE)
    }

    /// 需要的耗材（排除 "N/A"）
    pub fn consumable_names(&self) -> impl Iterator<Item = &str> {
        self.consumables
            .iter()
            .map(String::as_str)
            .filter(|name| *name != NOT_APPLICABLE)
    }

    /// 套用單一覆寫值
    ///
    /// 回傳是否實際修改了欄位；"N/A" 與未知鍵不修改。
    pub fn apply_override(&mut self, key: &str, value: &Value) -> Result<bool> {
        if value.as_str() == Some(NOT_APPLICABLE) {
            return Ok(false);
        }

        let Some(field) = StepField::from_key(key) else {
            tracing::warn!("工序 {} 忽略未知的覆寫鍵: {}", self.label, key);
            return Ok(false);
        };

        match field {
            StepField::Name => self.name = parse_override(key, value)?,
            StepField::LabourScaling => self.labour_scaling = Some(parse_override(key, value)?),
            StepField::LabourHours => self.labour_hours = Some(parse_override(key, value)?),
            StepField::Staff => self.staff = parse_override(key, value)?,
            StepField::Activity => self.activity = parse_override(key, value)?,
            StepField::CapitalEquipment => self.capital_equipment = parse_override(key, value)?,
            StepField::Material => self.material = Some(parse_override(key, value)?),
            StepField::MaterialScaling => self.material_scaling = Some(parse_override(key, value)?),
            StepField::ScrapRate => self.scrap_rate = Some(parse_override(key, value)?),
            StepField::Consumables => self.consumables = parse_override(key, value)?,
            StepField::ThermalCycle => self.thermal_cycle = parse_override(key, value)?,
        }

        Ok(true)
    }
}

fn parse_override<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|_| McmError::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// 可覆寫的工序欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    Name,
    LabourScaling,
    LabourHours,
    Staff,
    Activity,
    CapitalEquipment,
    Material,
    MaterialScaling,
    ScrapRate,
    Consumables,
    ThermalCycle,
}

impl StepField {
    /// 覆寫鍵 → 欄位（接受 snake_case 與目錄常用的 camelCase）
    pub fn from_key(key: &str) -> Option<Self> {
        let field = match key {
            "name" => StepField::Name,
            "labour_scaling" | "labourScaling" => StepField::LabourScaling,
            "labour_hours" | "labourHours" => StepField::LabourHours,
            "staff" => StepField::Staff,
            "activity" => StepField::Activity,
            "capital_equipment" | "capitalEquipment" => StepField::CapitalEquipment,
            "material" => StepField::Material,
            "material_scaling" | "materialScaling" => StepField::MaterialScaling,
            "scrap_rate" | "scrapRate" => StepField::ScrapRate,
            "consumables" => StepField::Consumables,
            "thermal_cycle" | "thermalCycle" => StepField::ThermalCycle,
            _ => return None,
        };
        Some(field)
    }
}
