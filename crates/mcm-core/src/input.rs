//! 製造輸入規格（零件類型、材料指定、各階段生產方法）

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::catalogue::MaterialCategory;
use crate::component::{Brand, ScaleVars};
use crate::{McmError, Result, NOT_APPLICABLE};

/// 零件類型
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartType {
    Spar,
    Web,
    Skin,
    Assembly,
    Other(String),
}

impl From<String> for PartType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "spar" => PartType::Spar,
            "web" => PartType::Web,
            "skin" => PartType::Skin,
            "assembly" => PartType::Assembly,
            _ => PartType::Other(value),
        }
    }
}

impl From<PartType> for String {
    fn from(value: PartType) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for PartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartType::Spar => f.write_str("spar"),
            PartType::Web => f.write_str("web"),
            PartType::Skin => f.write_str("skin"),
            PartType::Assembly => f.write_str("assembly"),
            PartType::Other(name) => f.write_str(name),
        }
    }
}

/// 生產階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionPhase {
    Preforming,
    Curing,
    Assembly,
}

impl ProductionPhase {
    pub const ALL: [ProductionPhase; 3] = [
        ProductionPhase::Preforming,
        ProductionPhase::Curing,
        ProductionPhase::Assembly,
    ];
}

impl std::fmt::Display for ProductionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProductionPhase::Preforming => "preforming",
            ProductionPhase::Curing => "curing",
            ProductionPhase::Assembly => "assembly",
        };
        f.write_str(name)
    }
}

/// 單一零件類型的製造規格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartSpec {
    /// 零件鍵（例如 "spar"），實例名稱為 `{key}{序號}`
    pub key: String,

    pub part_type: PartType,

    /// 材料類別 → 目錄材料名稱（"N/A" 表示不適用）
    #[serde(default)]
    pub materials: BTreeMap<MaterialCategory, String>,

    /// 各階段指定的生產方法（"N/A" 表示不適用）
    #[serde(default)]
    pub methods: BTreeMap<ProductionPhase, String>,

    /// 各階段略過的工序標籤
    #[serde(default)]
    pub steps_ignore: BTreeMap<ProductionPhase, Vec<String>>,

    /// 工序標籤 → 欄位 → 覆寫值
    #[serde(default)]
    pub step_overrides: BTreeMap<String, BTreeMap<String, Value>>,

    /// 件數
    #[serde(default = "default_items")]
    pub items: u32,

    /// 明確指定品牌；未指定時由組裝階段推定
    #[serde(default)]
    pub brand: Option<Brand>,
}

fn default_items() -> u32 {
    1
}

impl PartSpec {
    pub fn new(key: &str, part_type: PartType) -> Self {
        Self {
            key: key.to_string(),
            part_type,
            materials: BTreeMap::new(),
            methods: BTreeMap::new(),
            steps_ignore: BTreeMap::new(),
            step_overrides: BTreeMap::new(),
            items: default_items(),
            brand: None,
        }
    }

    pub fn with_material(mut self, category: MaterialCategory, name: &str) -> Self {
        self.materials.insert(category, name.to_string());
        self
    }

    pub fn with_method(mut self, phase: ProductionPhase, method: &str) -> Self {
        self.methods.insert(phase, method.to_string());
        self
    }

    pub fn with_ignored_steps(mut self, phase: ProductionPhase, labels: &[&str]) -> Self {
        self.steps_ignore
            .insert(phase, labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_step_override(mut self, label: &str, key: &str, value: Value) -> Self {
        self.step_overrides
            .entry(label.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self
    }

    pub fn with_items(mut self, items: u32) -> Self {
        self.items = items;
        self
    }

    pub fn with_brand(mut self, brand: Brand) -> Self {
        self.brand = Some(brand);
        self
    }

    /// 已指定的材料（排除 "N/A"）
    pub fn material_details(&self) -> BTreeMap<MaterialCategory, String> {
        self.materials
            .iter()
            .filter(|(_, name)| name.as_str() != NOT_APPLICABLE)
            .map(|(category, name)| (*category, name.clone()))
            .collect()
    }

    /// 指定階段的生產方法（"N/A" 視為未指定）
    pub fn method_for(&self, phase: ProductionPhase) -> Option<&str> {
        self.methods
            .get(&phase)
            .map(String::as_str)
            .filter(|m| *m != NOT_APPLICABLE)
    }

    pub fn ignored_steps(&self, phase: ProductionPhase) -> &[String] {
        self.steps_ignore
            .get(&phase)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 具有組裝階段的零件列入組裝件
    pub fn is_assembly(&self) -> bool {
        self.method_for(ProductionPhase::Assembly).is_some()
    }

    pub fn brand(&self) -> Brand {
        self.brand.unwrap_or(if self.is_assembly() {
            Brand::Assembly
        } else {
            Brand::Preform
        })
    }

    /// 第 `index` 件（從 0 起算）的實例名稱
    pub fn instance_name(&self, index: u32) -> String {
        format!("{}{}", self.key, index + 1)
    }
}

/// 產品（例如一副機翼）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    pub parts: Vec<PartSpec>,
}

impl ProductSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: PartSpec) -> Self {
        self.parts.push(part);
        self
    }
}

/// 完整製造輸入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManufacturingInput {
    pub products: Vec<ProductSpec>,
}

impl ManufacturingInput {
    pub fn new(products: Vec<ProductSpec>) -> Self {
        Self { products }
    }

    /// 從 JSON 字串載入並檢查
    pub fn from_json_str(json: &str) -> Result<Self> {
        let input: Self = serde_json::from_str(json)?;
        input.validate()?;
        Ok(input)
    }

    /// 產品名稱必須唯一；同一產品內零件鍵必須唯一
    pub fn validate(&self) -> Result<()> {
        let mut products = std::collections::BTreeSet::new();
        for product in &self.products {
            if !products.insert(product.name.as_str()) {
                return Err(McmError::InvalidInput(format!("產品名稱重複: {}", product.name)));
            }
            let mut keys = std::collections::BTreeSet::new();
            let mut instances = std::collections::BTreeSet::new();
            for part in &product.parts {
                if !keys.insert(part.key.as_str()) {
                    return Err(McmError::InvalidInput(format!(
                        "產品 {} 的零件鍵重複: {}",
                        product.name, part.key
                    )));
                }
                // "web" 第 11 件與 "web1" 第 1 件同名
                for index in 0..part.items {
                    let name = part.instance_name(index);
                    if !instances.insert(name.clone()) {
                        return Err(McmError::InvalidInput(format!(
                            "產品 {} 的零件實例名稱重複: {}",
                            product.name, name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn total_items(&self) -> u32 {
        self.products
            .iter()
            .flat_map(|p| p.parts.iter())
            .map(|part| part.items)
            .sum()
    }
}

/// 預先計算的縮放變數表：產品 → 零件實例名稱 → 縮放變數
pub type ScalingTable = BTreeMap<String, BTreeMap<String, ScaleVars>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_type_from_string() {
        assert_eq!(PartType::from("Spar".to_string()), PartType::Spar);
        assert_eq!(PartType::from("rib".to_string()), PartType::Other("rib".to_string()));
        assert_eq!(String::from(PartType::Web), "web");
    }

    #[test]
    fn test_brand_inferred_from_assembly_phase() {
        let spar = PartSpec::new("spar", PartType::Spar)
            .with_method(ProductionPhase::Preforming, "Method 1")
            .with_method(ProductionPhase::Assembly, "N/A");
        assert!(!spar.is_assembly());
        assert_eq!(spar.brand(), Brand::Preform);

        let wing = PartSpec::new("wing", PartType::Assembly)
            .with_method(ProductionPhase::Assembly, "Assembly 1");
        assert_eq!(wing.brand(), Brand::Assembly);

        let forced = PartSpec::new("skin", PartType::Skin).with_brand(Brand::Assembly);
        assert_eq!(forced.brand(), Brand::Assembly);
    }

    #[test]
    fn test_material_details_skip_not_applicable() {
        let spar = PartSpec::new("spar", PartType::Spar)
            .with_material(MaterialCategory::Fabric, "Fabric 1")
            .with_material(MaterialCategory::Core, "N/A");

        let details = spar.material_details();
        assert_eq!(details.len(), 1);
        assert_eq!(details[&MaterialCategory::Fabric], "Fabric 1");
    }

    #[test]
    fn test_instance_names() {
        let spar = PartSpec::new("spar", PartType::Spar).with_items(2);
        assert_eq!(spar.instance_name(0), "spar1");
        assert_eq!(spar.instance_name(1), "spar2");
    }

    #[test]
    fn test_input_from_json() {
        let json = r#"{
            "products": [ {
                "name": "wing",
                "parts": [
                    { "key": "spar", "part_type": "spar", "items": 2,
                      "materials": { "fabric": "Fabric 1", "resin": "Resin 1", "core": "N/A" },
                      "methods": { "preforming": "Method 1", "assembly": "N/A" },
                      "steps_ignore": { "preforming": ["step 05"] },
                      "step_overrides": { "step 01": { "scrapRate": 0.1 } } },
                    { "key": "wingbox", "part_type": "assembly",
                      "methods": { "assembly": "Assembly 1" } }
                ]
            } ]
        }"#;

        let input = ManufacturingInput::from_json_str(json).unwrap();
        let spar = &input.products[0].parts[0];
        assert_eq!(spar.items, 2);
        assert_eq!(spar.ignored_steps(ProductionPhase::Preforming), ["step 05".to_string()]);
        assert_eq!(spar.method_for(ProductionPhase::Assembly), None);
        assert_eq!(input.products[0].parts[1].brand(), Brand::Assembly);
        assert_eq!(input.total_items(), 3);
    }

    #[test]
    fn test_duplicate_part_key_rejected() {
        let input = ManufacturingInput::new(vec![ProductSpec::new("wing")
            .with_part(PartSpec::new("spar", PartType::Spar))
            .with_part(PartSpec::new("spar", PartType::Spar))]);
        assert!(matches!(input.validate(), Err(McmError::InvalidInput(_))));
    }

    #[test]
    fn test_colliding_instance_names_rejected() {
        let input = ManufacturingInput::new(vec![ProductSpec::new("wing")
            .with_part(PartSpec::new("web", PartType::Web).with_items(11))
            .with_part(PartSpec::new("web1", PartType::Web))]);
        match input.validate() {
            Err(McmError::InvalidInput(message)) => assert!(message.contains("web11")),
            other => panic!("unexpected result: {:?}", other),
        }

        // 鍵不同且實例名稱不重疊時通過
        let input = ManufacturingInput::new(vec![ProductSpec::new("wing")
            .with_part(PartSpec::new("web", PartType::Web).with_items(9))
            .with_part(PartSpec::new("web1", PartType::Web))]);
        assert!(input.validate().is_ok());
    }
}
