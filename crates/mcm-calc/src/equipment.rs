//! 設備成本計算（資本設備折舊與模具攤提）

use mcm_core::{
    checked_div, AnalysisConfig, Catalogue, Component, EquipmentCatalogue, EquipmentCosts,
    ProductionStep, Result,
};
use std::collections::BTreeMap;

use crate::common_equipment::CommonEquipment;
use crate::production_lines::ProductionLines;

/// 設備成本計算器
pub struct EquipmentCalculator;

impl EquipmentCalculator {
    /// 計算零件的設備成本
    ///
    /// 必須在產線數量與共用設備判定完成後執行。共用設備成本寫入 `common`，
    /// 專用設備寫入零件本身。
    pub fn analyse(
        component: &mut Component,
        catalogue: &Catalogue,
        lines: &ProductionLines,
        common: &mut CommonEquipment,
        config: &AnalysisConfig,
    ) -> Result<()> {
        let line_count = lines.lines_for(component)?;
        let mut equipment = EquipmentCosts::new(&component.activity_levels);

        for (index, step) in component.production_steps.iter().enumerate() {
            let process_hours = component.labour.process_hours.get(index).copied().unwrap_or(0.0);

            Self::step_equipment(
                component,
                step,
                process_hours,
                line_count,
                catalogue,
                common,
                config,
                &mut equipment,
            )
            .map_err(|e| e.at_step(&component.name, &step.label))?;
        }

        equipment.finalize();
        tracing::debug!(
            "零件 {} 專用設備成本 {:.2}（{} 條產線）",
            component.name,
            equipment.cost,
            line_count
        );
        component.equipment = equipment;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn step_equipment(
        component: &Component,
        step: &ProductionStep,
        process_hours: f64,
        line_count: u32,
        catalogue: &Catalogue,
        common: &mut CommonEquipment,
        config: &AnalysisConfig,
        equipment: &mut EquipmentCosts,
    ) -> Result<()> {
        let general = catalogue.general();

        for name in step.equipment() {
            equipment.locate(&step.activity, name);

            if EquipmentCatalogue::is_mould(name) {
                let mould = catalogue.equipment.mould(name)?;
                let scale_value = component.scale_var(&mould.scaling_variable)?;
                equipment.record(name, mould.cost_per_part(name, scale_value)?);
                continue;
            }

            let capital = catalogue.equipment.capital(name)?;
            let depreciation = capital.annual_depreciation(name)?;
            let is_common = common.contains(name);
            let multiplier = if is_common { 1.0 } else { f64::from(line_count) };
            let cost = checked_div(depreciation * multiplier, general.parts_per_annum, "年產量")?;

            if is_common {
                common.record(name, cost);
            } else {
                equipment.record(name, cost);
            }

            if config.include_power_costs {
                let power = Self::power_cost(process_hours, capital.average_power_usage, general.energy_rate);
                if is_common {
                    common.record_power(name, power);
                } else {
                    equipment.record_power(name, power);
                }
            }
        }

        Ok(())
    }

    /// 電力成本 = 製程工時 × 平均功率 × 電價
    pub fn power_cost(process_hours: f64, average_power_usage: Option<f64>, energy_rate: f64) -> f64 {
        process_hours * average_power_usage.unwrap_or(0.0) * energy_rate
    }

    /// 已使用設備的總佔地面積（m²）
    ///
    /// 專用設備依產線數計入；共用設備只計一次，取使用零件中的最大值。
    pub fn floor_area(
        components: &[Component],
        catalogue: &Catalogue,
        lines: &ProductionLines,
        common: &CommonEquipment,
    ) -> Result<f64> {
        let mut dedicated = 0.0;
        let mut shared: BTreeMap<&str, f64> = BTreeMap::new();

        for component in components {
            let line_count = f64::from(lines.lines_for(component)?);
            for name in component.equipment.used_equipment() {
                let Ok(capital) = catalogue.equipment.capital(name) else {
                    continue;
                };
                let Some(area) = capital.floorspace.area(&component.scale_vars) else {
                    tracing::debug!("零件 {} 缺少設備 {} 的佔地縮放變數", component.name, name);
                    continue;
                };
                if common.contains(name) {
                    let entry = shared.entry(name).or_insert(0.0);
                    *entry = entry.max(area);
                } else {
                    dedicated += area * line_count;
                }
            }
        }

        Ok(dedicated + shared.values().sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common_equipment::CommonEquipmentResolver;
    use mcm_core::{
        Brand, CapitalEquipment, Floorspace, GeneralVariables, McmError, Mould, PartType,
        ProductionRates,
    };

    fn catalogue() -> Catalogue {
        let equipment = EquipmentCatalogue::new()
            .with_capital(
                "Oven",
                CapitalEquipment::new(100_000.0, 10.0, 10.0, 10_000.0)
                    .with_power_usage(20.0)
                    .with_floorspace(Floorspace::Footprint { length: 4.0, width: 3.0 }),
            )
            .with_capital(
                "Infusion pump",
                CapitalEquipment::new(20_000.0, 0.0, 5.0, 0.0)
                    .with_power_usage(2.0)
                    .with_floorspace(Floorspace::Fixed { area: 2.0 }),
            )
            .with_mould("Spar mould", Mould::new(1000.0, 5000.0, "Surface Area", 500.0));

        Catalogue::new(
            Default::default(),
            equipment,
            Default::default(),
            ProductionRates::new(GeneralVariables::new(30.0, 100.0, 8.0, 250.0).with_energy_rate(0.2)),
        )
    }

    fn spar(name: &str) -> Component {
        let mut component = Component::new(
            name,
            PartType::Spar,
            "wing",
            Brand::Preform,
            Default::default(),
            vec!["preform".to_string(), "cure".to_string()],
        )
        .with_scale_var("Surface Area", 15.0);
        component.define_production_steps(
            "Method 1",
            vec![
                ProductionStep::new("step 07", "Infusion", "preform").with_equipment(&["Infusion pump", "Spar mould"]),
                ProductionStep::new("step 11", "Cure", "cure").with_equipment(&["Oven"]),
            ],
            true,
        );
        component.labour.process_hours = vec![2.0, 6.0];
        component
    }

    fn sized(components: &[Component], lines: u32) -> ProductionLines {
        let mut sized = ProductionLines::default();
        for c in components {
            sized.product_lines.insert(c.qualified_name(), lines);
        }
        sized
    }

    #[test]
    fn test_dedicated_and_common_costs() {
        let catalogue = catalogue();
        let config = AnalysisConfig::default();
        let mut components = vec![spar("spar1"), spar("spar2")];
        let lines = sized(&components, 2);
        let mut common = CommonEquipmentResolver::resolve(&components, &config);

        for component in &mut components {
            EquipmentCalculator::analyse(component, &catalogue, &lines, &mut common, &config).unwrap();
        }

        let spar1 = &components[0];
        // 模具：(1000 × 15 + 5000) / 500 = 40
        assert!((spar1.equipment.equipment_costs["Spar mould"] - 40.0).abs() < 1e-9);
        // 幫浦：20000 / 5 × 2 條產線 / 100 件 = 80
        assert!((spar1.equipment.equipment_costs["Infusion pump"] - 80.0).abs() < 1e-9);
        assert!(!spar1.equipment.equipment_costs.contains_key("Oven"));
        assert!((spar1.equipment.cost - 120.0).abs() < 1e-9);
        assert_eq!(spar1.equipment.equipment_list["cure"], vec!["Oven".to_string()]);

        // 烤箱：(100000 × 1.1 − 10000) / 10 / 100 = 100，兩個零件共用仍只計一次
        assert_eq!(common.usage["Oven"], 2);
        assert!((common.total_cost() - 100.0).abs() < 1e-9);
        assert_eq!(common.total_power(), 0.0);
    }

    #[test]
    fn test_power_costs_when_enabled() {
        let catalogue = catalogue();
        let config = AnalysisConfig::default().with_power_costs(true);
        let mut components = vec![spar("spar1")];
        let lines = sized(&components, 1);
        let mut common = CommonEquipmentResolver::resolve(&components, &config);

        EquipmentCalculator::analyse(&mut components[0], &catalogue, &lines, &mut common, &config).unwrap();

        // 幫浦：2 h × 2 kW × 0.2 = 0.8；烤箱：6 h × 20 kW × 0.2 = 24
        assert!((components[0].equipment.power - 0.8).abs() < 1e-9);
        assert!((common.total_power() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsized_lines_fail_fast() {
        let catalogue = catalogue();
        let config = AnalysisConfig::default();
        let mut component = spar("spar1");
        let mut common = CommonEquipment::default();

        let err = EquipmentCalculator::analyse(
            &mut component,
            &catalogue,
            &ProductionLines::default(),
            &mut common,
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, McmError::ProductionLinesNotSized(_)));
    }

    #[test]
    fn test_missing_equipment_reports_step() {
        let catalogue = catalogue();
        let config = AnalysisConfig::default();
        let mut component = spar("spar1");
        component.production_steps[0].capital_equipment.push("Robot".to_string());
        let lines = sized(std::slice::from_ref(&component), 1);
        let mut common = CommonEquipment::default();

        let err = EquipmentCalculator::analyse(&mut component, &catalogue, &lines, &mut common, &config).unwrap_err();
        assert!(matches!(err.root_cause(), McmError::EquipmentNotFound(_)));
    }

    #[test]
    fn test_floor_area() {
        let catalogue = catalogue();
        let config = AnalysisConfig::default();
        let mut components = vec![spar("spar1"), spar("spar2")];
        let lines = sized(&components, 3);
        let mut common = CommonEquipmentResolver::resolve(&components, &config);
        for component in &mut components {
            EquipmentCalculator::analyse(component, &catalogue, &lines, &mut common, &config).unwrap();
        }

        let area = EquipmentCalculator::floor_area(&components, &catalogue, &lines, &common).unwrap();
        // 幫浦 2 m² × 3 條 × 2 個零件 + 烤箱 12 m²（共用一次）
        assert!((area - 24.0).abs() < 1e-9);
    }
}
