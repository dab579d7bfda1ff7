//! 人工成本計算

use mcm_core::{
    checked_div, Catalogue, Component, CureCycle, LabourCosts, LabourSource, McmError, ProductionStep,
    Result, ThermalCycleKind,
};

/// 人工成本計算器
pub struct LabourCalculator;

impl LabourCalculator {
    /// 計算零件所有工序的人工工時與成本
    pub fn analyse(component: &mut Component, catalogue: &Catalogue) -> Result<()> {
        let salary = catalogue.general().salary;
        let mut labour = LabourCosts::new(component.production_steps.len(), &component.activity_levels);

        for (index, (step, method)) in component
            .production_steps
            .iter()
            .zip(&component.production_names)
            .enumerate()
        {
            let (labour_hours, process_hours) = Self::step_hours(component, step, method, catalogue)
                .map_err(|e| e.at_step(&component.name, &step.label))?;
            let cost = labour_hours * salary;

            labour.record_step(index, labour_hours, process_hours, cost);
            labour.accumulate_activity(&step.activity, cost, labour_hours);
        }

        labour.finalize();
        tracing::debug!(
            "零件 {} 人工工時 {:.2} h，製程工時 {:.2} h，成本 {:.2}",
            component.name,
            labour.total_labour_hours,
            labour.total_process_hours,
            labour.total_cost
        );
        component.labour = labour;

        Ok(())
    }

    /// 單一工序的 (人工工時, 製程工時)
    pub fn step_hours(
        component: &Component,
        step: &ProductionStep,
        method: &str,
        catalogue: &Catalogue,
    ) -> Result<(f64, f64)> {
        let staff_context = format!("工序 {} 人數", step.label);

        match step.labour_source() {
            Some(LabourSource::RateScaling(scaling)) => {
                let law = catalogue.rates.rate(method, &scaling.rate)?;
                let labour_hours = law.hours(component.scale_var(&scaling.variable)?);
                Ok((labour_hours, checked_div(labour_hours, step.staff, &staff_context)?))
            }
            Some(LabourSource::FixedHours(hours)) => {
                Ok((hours, checked_div(hours, step.staff, &staff_context)?))
            }
            Some(LabourSource::ThermalCycle(kind)) => {
                let process_hours = Self::thermal_cycle(component, kind, catalogue)?.total_hours();
                Ok((process_hours * step.staff, process_hours))
            }
            None => Err(McmError::LabourUndefined(step.label.clone())),
        }
    }

    /// 找出提供熱循環的材料及其固化曲線
    ///
    /// 依來源類別順序取第一個已指定的材料；該材料缺少曲線時直接回傳錯誤。
    pub fn thermal_cycle<'a>(
        component: &Component,
        kind: ThermalCycleKind,
        catalogue: &'a Catalogue,
    ) -> Result<&'a CureCycle> {
        let property = if kind.is_post_cure() { "post-cure cycle" } else { "cure cycle" };

        let Some((category, name)) = kind
            .source_categories()
            .iter()
            .find_map(|&category| component.material_name(category).ok().map(|name| (category, name)))
        else {
            return Err(McmError::MaterialNotAssigned {
                component: component.name.clone(),
                category: kind
                    .source_categories()
                    .first()
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            });
        };

        let spec = catalogue.materials.material(category, name)?;
        let cycle = if kind.is_post_cure() {
            spec.post_cure_cycle.as_ref()
        } else {
            spec.cure_cycle.as_ref()
        };
        cycle.ok_or_else(|| McmError::MissingMaterialProperty {
            material: name.to_string(),
            property: property.to_string(),
        })
    }
}
