//! 零件實例模型

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalogue::MaterialCategory;
use crate::input::PartType;
use crate::records::{ConsumableCosts, EquipmentCosts, LabourCosts, MaterialCosts};
use crate::step::ProductionStep;
use crate::{McmError, Result};

/// 縮放變數：名稱 → 數值
pub type ScaleVars = BTreeMap<String, f64>;

/// 零件品牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Brand {
    Preform,
    Assembly,
}

/// 零件實例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// 實例名稱（同一產品內唯一）
    pub name: String,
    pub part_type: PartType,
    /// 所屬產品
    pub product: String,
    pub brand: Brand,
    /// 作業階段（依序）
    pub activity_levels: Vec<String>,

    /// 材料類別 → 目錄材料名稱
    pub material_details: BTreeMap<MaterialCategory, String>,

    /// 縮放變數，重設時保留
    pub scale_vars: ScaleVars,

    pub production_steps: Vec<ProductionStep>,
    /// 每個工序所屬的生產方法名稱（與 `production_steps` 等長）
    pub production_names: Vec<String>,

    pub materials: MaterialCosts,
    pub consumables: ConsumableCosts,
    pub labour: LabourCosts,
    pub equipment: EquipmentCosts,
}

impl Component {
    pub fn new(
        name: &str,
        part_type: PartType,
        product: &str,
        brand: Brand,
        material_details: BTreeMap<MaterialCategory, String>,
        activity_levels: Vec<String>,
    ) -> Self {
        let mut component = Self {
            name: name.to_string(),
            part_type,
            product: product.to_string(),
            brand,
            activity_levels,
            material_details,
            scale_vars: ScaleVars::new(),
            production_steps: Vec::new(),
            production_names: Vec::new(),
            materials: MaterialCosts::default(),
            consumables: ConsumableCosts::default(),
            labour: LabourCosts::default(),
            equipment: EquipmentCosts::default(),
        };
        component.reset_cost_accumulators();
        component
    }

    pub fn with_scale_vars(mut self, scale_vars: ScaleVars) -> Self {
        self.scale_vars = scale_vars;
        self
    }

    pub fn with_scale_var(mut self, name: &str, value: f64) -> Self {
        self.scale_vars.insert(name.to_string(), value);
        self
    }

    /// `{product}/{name}`，跨產品唯一
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.product, self.name)
    }

    pub fn scale_var(&self, variable: &str) -> Result<f64> {
        self.scale_vars
            .get(variable)
            .copied()
            .ok_or_else(|| McmError::ScalingVariableNotFound {
                component: self.name.clone(),
                variable: variable.to_string(),
            })
    }

    pub fn material_name(&self, category: MaterialCategory) -> Result<&str> {
        self.material_details
            .get(&category)
            .map(String::as_str)
            .ok_or_else(|| McmError::MaterialNotAssigned {
                component: self.name.clone(),
                category: category.to_string(),
            })
    }

    pub fn has_material(&self, category: MaterialCategory) -> bool {
        self.material_details.contains_key(&category)
    }

    /// 加入（或取代）一個生產方法展開後的工序
    pub fn define_production_steps(&mut self, method: &str, steps: Vec<ProductionStep>, append: bool) {
        if !append {
            self.production_steps.clear();
            self.production_names.clear();
        }
        self.production_names
            .extend(std::iter::repeat(method.to_string()).take(steps.len()));
        self.production_steps.extend(steps);
    }

    /// 清除成本記錄，保留識別資料、材料指定與縮放變數
    ///
    /// 工序一併清除，重新分析時會再次展開。
    pub fn reset_cost_accumulators(&mut self) {
        self.production_steps.clear();
        self.production_names.clear();
        self.materials = MaterialCosts::with_keys(self.material_details.keys().copied());
        self.consumables = ConsumableCosts::default();
        self.labour = LabourCosts::new(0, &self.activity_levels);
        self.equipment = EquipmentCosts::new(&self.activity_levels);
    }

    /// 結構材料質量（不含耗材與廢料）
    pub fn structural_mass(&self) -> f64 {
        self.materials.structural_mass()
    }
}
