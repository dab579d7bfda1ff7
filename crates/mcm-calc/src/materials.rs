//! 材料與耗材成本計算

use mcm_core::{
    Catalogue, Component, ConsumablePolicy, LedgerEntry, MaterialCategory, MaterialScaling, McmError,
    ProductionStep, Result,
};

/// 單一工序的材料貢獻
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialContribution {
    pub category: MaterialCategory,
    pub entry: LedgerEntry,
    /// 樹脂工序分出的固化劑
    pub hardener: Option<LedgerEntry>,
}

/// 材料成本計算器
pub struct MaterialsCalculator;

impl MaterialsCalculator {
    /// 計算零件所有工序的材料與耗材成本並彙總
    pub fn analyse(
        component: &mut Component,
        catalogue: &Catalogue,
        policy: ConsumablePolicy,
    ) -> Result<()> {
        for index in 0..component.production_steps.len() {
            let step = &component.production_steps[index];
            let label = step.label.clone();

            let contribution = Self::step_materials(component, step, catalogue)
                .map_err(|e| e.at_step(&component.name, &label))?;
            let consumables = Self::step_consumables(component, step, catalogue)
                .map_err(|e| e.at_step(&component.name, &label))?;

            if let Some(contribution) = contribution {
                component.materials.add(&contribution.category, contribution.entry);
                if let Some(hardener) = contribution.hardener {
                    component.materials.add(&MaterialCategory::Hardener, hardener);
                }
            }

            for (name, entry) in consumables {
                match policy {
                    ConsumablePolicy::Overwrite => {
                        let previous = component.consumables.entry(&name);
                        if previous.mass != 0.0 && previous != entry {
                            tracing::warn!(
                                "零件 {} 工序 {} 覆寫耗材 {} (原質量 {:.4} kg)",
                                component.name,
                                label,
                                name,
                                previous.mass
                            );
                        }
                        component.consumables.set(&name, entry);
                    }
                    ConsumablePolicy::Accumulate => component.consumables.add(&name, entry),
                }
            }
        }

        component.materials.finalize();
        component.consumables.finalize();

        tracing::debug!(
            "零件 {} 材料成本 {:.2}，耗材成本 {:.2}",
            component.name,
            component.materials.total_cost,
            component.consumables.total_cost
        );

        Ok(())
    }

    /// 廢料質量 = m × r / (1 − r)，r 必須在 [0, 1) 之間
    pub fn scrap_mass(mass: f64, scrap_rate: f64) -> Result<f64> {
        if !(0.0..1.0).contains(&scrap_rate) {
            return Err(McmError::InvalidScrapRate(scrap_rate));
        }
        Ok(mass * scrap_rate / (1.0 - scrap_rate))
    }

    /// 以縮放變數與材料屬性計算質量與成本
    ///
    /// 回傳 (質量 kg, 成本)。
    pub fn mass_and_cost(
        component: &Component,
        category: MaterialCategory,
        scaling: &MaterialScaling,
        catalogue: &Catalogue,
    ) -> Result<(f64, f64)> {
        let name = component.material_name(category)?;
        let spec = catalogue.materials.material(category, name)?;

        let mut mass = component.scale_var(&scaling.variable)?;
        for property in &scaling.properties {
            mass *= spec.si_property(name, *property)?;
        }

        Ok((mass, mass * spec.cost))
    }

    /// 單一工序的結構材料貢獻；未要求材料時回傳 None
    pub fn step_materials(
        component: &Component,
        step: &ProductionStep,
        catalogue: &Catalogue,
    ) -> Result<Option<MaterialContribution>> {
        let Some(category) = step.material else {
            return Ok(None);
        };
        let scaling = step.material_scaling.as_ref().ok_or_else(|| {
            McmError::InvalidInput(format!("工序 {} 未設定材料縮放變數", step.label))
        })?;
        let scrap_rate = step.scrap_rate.unwrap_or(0.0);

        if category != MaterialCategory::Resin {
            let (mass, cost) = Self::mass_and_cost(component, category, scaling, catalogue)?;
            return Ok(Some(MaterialContribution {
                category,
                entry: Self::with_scrap(mass, cost, scrap_rate)?,
                hardener: None,
            }));
        }

        // 縮放計算得到的是織物質量，依纖維重量分率換算樹脂混合物質量
        let (fabric_mass, _) =
            Self::mass_and_cost(component, MaterialCategory::Fabric, scaling, catalogue)?;
        let fabric_name = component.material_name(MaterialCategory::Fabric)?;
        let fabric = catalogue
            .materials
            .material(MaterialCategory::Fabric, fabric_name)?;
        let fibre_content = fabric
            .fibre_content
            .ok_or_else(|| McmError::MissingMaterialProperty {
                material: fabric_name.to_string(),
                property: "fibre content".to_string(),
            })?;
        let resin_mix_mass = mcm_core::checked_div(
            fabric_mass * (1.0 - fibre_content),
            fibre_content,
            &format!("織物 {} 纖維含量", fabric_name),
        )?;

        let resin_name = component.material_name(MaterialCategory::Resin)?;
        let resin = catalogue
            .materials
            .material(MaterialCategory::Resin, resin_name)?;

        let (resin_mass, hardener) = if component.has_material(MaterialCategory::Hardener) {
            let (resin_mass, hardener_mass) = Self::split_resin_mix(resin_mix_mass, resin_name, resin.resin_hardener_ratio)?;
            let hardener_name = component.material_name(MaterialCategory::Hardener)?;
            let hardener_spec = catalogue
                .materials
                .material(MaterialCategory::Hardener, hardener_name)?;
            let hardener = Self::with_scrap(hardener_mass, hardener_mass * hardener_spec.cost, scrap_rate)?;
            (resin_mass, Some(hardener))
        } else {
            (resin_mix_mass, None)
        };

        Ok(Some(MaterialContribution {
            category: MaterialCategory::Resin,
            entry: Self::with_scrap(resin_mass, resin_mass * resin.cost, scrap_rate)?,
            hardener,
        }))
    }

    /// 依樹脂:固化劑比例拆分混合物質量，回傳 (樹脂, 固化劑)
    pub fn split_resin_mix(resin_mix_mass: f64, resin_name: &str, ratio: Option<f64>) -> Result<(f64, f64)> {
        let ratio = ratio.ok_or_else(|| McmError::MissingMaterialProperty {
            material: resin_name.to_string(),
            property: "resin-hardener ratio".to_string(),
        })?;
        let context = format!("樹脂 {} 固化劑比例", resin_name);
        let resin_mass = resin_mix_mass * mcm_core::checked_div(ratio, ratio + 1.0, &context)?;
        let hardener_mass = mcm_core::checked_div(resin_mass, ratio, &context)?;
        Ok((resin_mass, hardener_mass))
    }

    /// 單一工序的耗材貢獻（耗材名稱 → 質量/成本）
    pub fn step_consumables(
        component: &Component,
        step: &ProductionStep,
        catalogue: &Catalogue,
    ) -> Result<Vec<(String, LedgerEntry)>> {
        step.consumable_names()
            .map(|name| {
                let spec = catalogue.materials.consumable(name)?;
                let area = component.scale_var(&spec.scaling_variable)?;
                let mass = area * spec.areal_weight * 1.0e-3;
                let entry = Self::with_scrap(mass, mass * spec.cost, spec.scrap_rate)?;
                Ok((name.to_string(), entry))
            })
            .collect()
    }

    fn with_scrap(mass: f64, cost: f64, scrap_rate: f64) -> Result<LedgerEntry> {
        let scrap_mass = Self::scrap_mass(mass, scrap_rate)?;
        let unit_cost = if mass != 0.0 { cost / mass } else { 0.0 };
        Ok(LedgerEntry {
            mass,
            cost,
            scrap_mass,
            scrap_cost: scrap_mass * unit_cost,
        })
    }
}
