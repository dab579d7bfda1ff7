//! 生產工序展開

use mcm_core::{Catalogue, Component, PartSpec, ProductionPhase};

/// 工序展開器
pub struct StepExpansion;

impl StepExpansion {
    /// 依各階段指定的生產方法展開零件工序
    ///
    /// 階段未指定或目錄缺少該方法時略過該階段；回傳新增的工序數。
    pub fn expand(
        component: &mut Component,
        part: &PartSpec,
        catalogue: &Catalogue,
    ) -> mcm_core::Result<usize> {
        let before = component.production_steps.len();

        for phase in ProductionPhase::ALL {
            let Some(method_name) = part.method_for(phase) else {
                tracing::debug!("零件 {} 無 {} 階段", component.name, phase);
                continue;
            };

            let method = match catalogue.method(method_name) {
                Ok(method) => method,
                Err(err) => {
                    tracing::warn!("零件 {} 略過 {} 階段: {}", component.name, phase, err);
                    continue;
                }
            };

            let mut steps = method.steps_excluding(part.ignored_steps(phase));

            for step in &mut steps {
                let Some(overrides) = part.step_overrides.get(&step.label) else {
                    continue;
                };
                for (key, value) in overrides {
                    step.apply_override(key, value)
                        .map_err(|e| e.at_step(&component.name, &step.label))?;
                }
            }

            tracing::debug!(
                "零件 {} {} 階段: {} 展開 {} 個工序",
                component.name,
                phase,
                method_name,
                steps.len()
            );
            component.define_production_steps(method_name, steps, true);
        }

        Ok(component.production_steps.len() - before)
    }
}
