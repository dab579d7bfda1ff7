//! 製造成本主流程

use mcm_core::{
    AnalysisConfig, Brand, Catalogue, Component, GeneralVariables, ManufacturingInput, McmError,
    Result, ScaleVars, ScalingTable,
};

use crate::breakdown::{CostAggregator, CostBreakdown, CostSummary, CostTotals};
use crate::common_equipment::{CommonEquipment, CommonEquipmentResolver};
use crate::consistency::{ConsistencyChecker, ConsistencyReport};
use crate::equipment::EquipmentCalculator;
use crate::expansion::StepExpansion;
use crate::labour::LabourCalculator;
use crate::materials::MaterialsCalculator;
use crate::production_lines::ProductionLines;

/// 製造成本分析
///
/// 持有所有零件實例，依序執行：
/// 1. 工序展開
/// 2. 材料與人工成本（設備延後）
/// 3. 產線數量
/// 4. 共用設備判定
/// 5. 設備成本
/// 6. 成本彙總
pub struct Manufacture {
    catalogue: Catalogue,
    input: ManufacturingInput,
    config: AnalysisConfig,

    components: Vec<Component>,
    lines: ProductionLines,
    common: CommonEquipment,

    totals: CostTotals,
    breakdown: CostBreakdown,
    consistency: ConsistencyReport,
    analysed: bool,
}

impl Manufacture {
    /// 依製造輸入建立零件實例並執行一致性預檢
    pub fn new(catalogue: Catalogue, input: ManufacturingInput, config: AnalysisConfig) -> Result<Self> {
        input.validate()?;

        let mut components = Vec::with_capacity(input.total_items() as usize);
        for product in &input.products {
            for part in &product.parts {
                for index in 0..part.items {
                    components.push(Component::new(
                        &part.instance_name(index),
                        part.part_type.clone(),
                        &product.name,
                        part.brand(),
                        part.material_details(),
                        config.activity_levels.clone(),
                    ));
                }
            }
        }

        let consistency = ConsistencyChecker::check(&input, &catalogue);
        for issue in &consistency.issues {
            tracing::warn!("{}", issue);
        }

        tracing::info!(
            "建立製造模型：{} 個產品，{} 個零件實例",
            input.products.len(),
            components.len()
        );

        Ok(Self {
            catalogue,
            input,
            config,
            components,
            lines: ProductionLines::default(),
            common: CommonEquipment::default(),
            totals: CostTotals::default(),
            breakdown: CostBreakdown::default(),
            consistency,
            analysed: false,
        })
    }

    /// 套用預先計算的縮放變數表，回傳更新的零件數
    pub fn apply_scaling_table(&mut self, table: &ScalingTable) -> usize {
        let mut applied = 0;
        for component in &mut self.components {
            let Some(vars) = table
                .get(&component.product)
                .and_then(|product| product.get(&component.name))
            else {
                tracing::debug!("縮放變數表沒有 {}", component.qualified_name());
                continue;
            };
            component.scale_vars = vars.clone();
            applied += 1;
        }
        applied
    }

    /// 設定單一零件的縮放變數
    pub fn set_scale_vars(&mut self, product: &str, name: &str, vars: ScaleVars) -> Result<()> {
        let component = self
            .components
            .iter_mut()
            .find(|c| c.product == product && c.name == name)
            .ok_or_else(|| McmError::InvalidInput(format!("找不到零件: {}/{}", product, name)))?;
        component.scale_vars = vars;
        Ok(())
    }

    /// 重設所有成本記錄，保留零件與縮放變數
    pub fn reset(&mut self) {
        for component in &mut self.components {
            component.reset_cost_accumulators();
        }
        self.lines = ProductionLines::default();
        self.common = CommonEquipment::default();
        self.totals = CostTotals::default();
        self.breakdown = CostBreakdown::default();
        self.analysed = false;
    }

    /// 執行完整成本分析
    pub fn analyse(&mut self) -> Result<&CostTotals> {
        let start_time = std::time::Instant::now();
        tracing::info!("開始成本分析：{} 個零件", self.components.len());

        self.reset();

        // Step 1: 工序展開
        tracing::debug!("Step 1: 工序展開");
        let parts = self.input.products.iter().flat_map(|product| {
            product
                .parts
                .iter()
                .flat_map(|part| std::iter::repeat(part).take(part.items as usize))
        });
        for (component, part) in self.components.iter_mut().zip(parts) {
            StepExpansion::expand(component, part, &self.catalogue)?;
        }

        // Step 2: 材料與人工成本
        tracing::debug!("Step 2: 材料與人工成本");
        for component in &mut self.components {
            MaterialsCalculator::analyse(component, &self.catalogue, self.config.consumable_policy)?;
            LabourCalculator::analyse(component, &self.catalogue)?;
        }

        // Step 3: 產線數量
        tracing::debug!("Step 3: 產線數量");
        self.lines = ProductionLines::size(&self.components, self.catalogue.general())?;

        // Step 4: 共用設備
        tracing::debug!("Step 4: 共用設備判定");
        self.common = CommonEquipmentResolver::resolve(&self.components, &self.config);

        // Step 5: 設備成本
        tracing::debug!("Step 5: 設備成本");
        self.cost_equipment()?;

        // Step 6: 彙總
        tracing::debug!("Step 6: 成本彙總");
        let (mut totals, breakdown) =
            CostAggregator::aggregate(&self.components, &self.common, &self.catalogue, &self.config);
        totals.floor_area =
            EquipmentCalculator::floor_area(&self.components, &self.catalogue, &self.lines, &self.common)?;
        self.totals = totals;
        self.breakdown = breakdown;
        self.analysed = true;

        tracing::info!("成本分析完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "製造成本 {:.2}，結構質量 {:.3} kg",
            self.totals.manufacturing,
            self.totals.structural_mass
        );

        Ok(&self.totals)
    }

    /// 計算所有零件的設備成本（需先完成產線數量計算）
    pub fn cost_equipment(&mut self) -> Result<()> {
        self.common.costs.clear();
        self.common.power.clear();
        for component in &mut self.components {
            EquipmentCalculator::analyse(
                component,
                &self.catalogue,
                &self.lines,
                &mut self.common,
                &self.config,
            )?;
        }
        Ok(())
    }

    /// 修改年產量（供敏感度分析使用，需重新分析）
    pub fn set_parts_per_annum(&mut self, parts_per_annum: f64) {
        self.catalogue.rates.general.parts_per_annum = parts_per_annum;
        self.analysed = false;
    }

    pub fn general(&self) -> &GeneralVariables {
        self.catalogue.general()
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, product: &str, name: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.product == product && c.name == name)
    }

    /// 預製件（preform 品牌）
    pub fn parts(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.brand == Brand::Preform)
    }

    /// 組裝件（assembly 品牌）
    pub fn assemblies(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.brand == Brand::Assembly)
    }

    pub fn production_lines(&self) -> &ProductionLines {
        &self.lines
    }

    pub fn common_equipment(&self) -> &CommonEquipment {
        &self.common
    }

    pub fn totals(&self) -> &CostTotals {
        &self.totals
    }

    pub fn breakdown(&self) -> &CostBreakdown {
        &self.breakdown
    }

    pub fn consistency(&self) -> &ConsistencyReport {
        &self.consistency
    }

    pub fn is_analysed(&self) -> bool {
        self.analysed
    }

    /// 匯出用摘要，尚未分析時回傳錯誤
    pub fn summary(&self) -> Result<CostSummary> {
        if !self.analysed {
            return Err(McmError::InvalidInput("尚未執行成本分析".to_string()));
        }
        CostSummary::from_totals(&self.totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcm_core::{
        CapitalEquipment, EquipmentCatalogue, MaterialCategory, MaterialProperty, MaterialSpec,
        MaterialsCatalogue, Mould, PartSpec, PartType, ProductSpec, ProductionMethod, ProductionPhase,
        ProductionRates, ProductionStep, RateLaw,
    };
    use std::collections::BTreeMap;

    fn catalogue() -> Catalogue {
        let materials = MaterialsCatalogue::new().with_material(
            MaterialCategory::Fabric,
            "Fabric 1",
            MaterialSpec::new(5.49).with_areal_weight(300.0),
        );
        let equipment = EquipmentCatalogue::new()
            .with_capital("Ply cutter", CapitalEquipment::new(50_000.0, 0.0, 10.0, 0.0))
            .with_capital("Assembly jig", CapitalEquipment::new(80_000.0, 0.0, 8.0, 0.0))
            .with_mould("Spar mould", Mould::new(1000.0, 0.0, "Surface Area", 500.0));

        let mut methods = BTreeMap::new();
        methods.insert(
            "Method 1".to_string(),
            ProductionMethod::new(vec![ProductionStep::new("step 01", "Fabric cutting", "preform")
                .with_labour_scaling("Ply Length", "fabricCutRate")
                .with_equipment(&["Ply cutter", "Spar mould"])
                .with_material(MaterialCategory::Fabric, "Ply Surface Area", vec![MaterialProperty::ArealWeight])]),
        );
        methods.insert(
            "Assembly 1".to_string(),
            ProductionMethod::new(vec![ProductionStep::new("step 01", "Join", "assembly")
                .with_labour_hours(100.0)
                .with_equipment(&["Assembly jig"])]),
        );

        let rates = ProductionRates::new(GeneralVariables::new(30.0, 100.0, 8.0, 250.0))
            .with_rate("Method 1", "fabricCutRate", RateLaw::new(0.005, 1.0));

        Catalogue::new(materials, equipment, methods, rates)
    }

    fn input() -> ManufacturingInput {
        ManufacturingInput::new(vec![ProductSpec::new("wing")
            .with_part(
                PartSpec::new("spar", PartType::Spar)
                    .with_items(2)
                    .with_material(MaterialCategory::Fabric, "Fabric 1")
                    .with_method(ProductionPhase::Preforming, "Method 1"),
            )
            .with_part(PartSpec::new("wingbox", PartType::Assembly).with_method(ProductionPhase::Assembly, "Assembly 1"))])
    }

    fn manufacture() -> Manufacture {
        let mut manufacture = Manufacture::new(catalogue(), input(), AnalysisConfig::default()).unwrap();
        let vars: ScaleVars = [
            ("Ply Surface Area".to_string(), 500.0),
            ("Ply Length".to_string(), 2000.0),
            ("Surface Area".to_string(), 10.0),
        ]
        .into_iter()
        .collect();
        manufacture.set_scale_vars("wing", "spar1", vars.clone()).unwrap();
        manufacture.set_scale_vars("wing", "spar2", vars).unwrap();
        manufacture
    }

    #[test]
    fn test_components_built_from_input() {
        let manufacture = manufacture();
        assert_eq!(manufacture.components().len(), 3);
        assert_eq!(manufacture.parts().count(), 2);
        assert_eq!(manufacture.assemblies().count(), 1);
        assert!(manufacture.consistency().is_consistent());
    }

    #[test]
    fn test_full_analysis() {
        let mut manufacture = manufacture();
        let totals = manufacture.analyse().unwrap().clone();

        // 材料：2 × 823.5
        assert!((totals.materials - 1647.0).abs() < 1e-9);
        // 人工：2 × 10 h × 30 + 100 h × 30
        assert!((totals.labour - 3600.0).abs() < 1e-9);
        // 模具：2 × 10000 / 500 = 40；裁布機（共用）：5000 / 100 = 50；組裝治具：10000 × 5 條 / 100 = 500
        assert_eq!(manufacture.production_lines().assembly_lines["wing/wingbox1"], 5);
        assert!((totals.common_equipment - 50.0).abs() < 1e-9);
        assert!((totals.equipment - 590.0).abs() < 1e-9);

        let subtotal = 1647.0 + 3600.0 + 590.0;
        assert!((totals.manufacturing - subtotal * 1.05).abs() < 1e-9);
        assert!((totals.structural_mass - 300.0).abs() < 1e-9);
        assert!((totals.unit_cost().unwrap() - subtotal * 1.05 / 300.0).abs() < 1e-9);
        assert!(manufacture.summary().is_ok());
    }

    #[test]
    fn test_reanalysis_does_not_duplicate_steps() {
        let mut manufacture = manufacture();
        let first = manufacture.analyse().unwrap().clone();
        let second = manufacture.analyse().unwrap().clone();

        assert_eq!(first, second);
        let spar = manufacture.component("wing", "spar1").unwrap();
        assert_eq!(spar.production_steps.len(), 1);
    }

    #[test]
    fn test_reset_keeps_scale_vars() {
        let mut manufacture = manufacture();
        manufacture.analyse().unwrap();
        manufacture.reset();

        assert!(!manufacture.is_analysed());
        assert_eq!(manufacture.totals(), &CostTotals::default());
        let spar = manufacture.component("wing", "spar2").unwrap();
        assert_eq!(spar.scale_vars["Ply Surface Area"], 500.0);
        assert!(manufacture.summary().is_err());
    }

    #[test]
    fn test_missing_scale_var_reports_component() {
        let mut manufacture = Manufacture::new(catalogue(), input(), AnalysisConfig::default()).unwrap();
        let err = manufacture.analyse().unwrap_err();
        match err {
            McmError::Step { component, step, source } => {
                assert_eq!(component, "spar1");
                assert_eq!(step, "step 01");
                assert!(matches!(*source, McmError::ScalingVariableNotFound { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scaling_table() {
        let mut manufacture = Manufacture::new(catalogue(), input(), AnalysisConfig::default()).unwrap();
        let mut table = ScalingTable::new();
        table
            .entry("wing".to_string())
            .or_default()
            .insert("spar1".to_string(), [("Ply Length".to_string(), 10.0)].into_iter().collect());

        assert_eq!(manufacture.apply_scaling_table(&table), 1);
        assert_eq!(manufacture.component("wing", "spar1").unwrap().scale_vars["Ply Length"], 10.0);
    }
}
