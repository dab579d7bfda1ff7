//! 集成測試共用夾具：14 道工序的翼樑灌注成型

#![allow(dead_code)]

use mcm_calc::Manufacture;
use mcm_core::{
    AnalysisConfig, CapitalEquipment, Catalogue, ConsumableSpec, CureCycle, EquipmentCatalogue,
    Floorspace, GeneralVariables, ManufacturingInput, MaterialCategory, MaterialProperty, MaterialSpec,
    MaterialsCatalogue, Mould, PartSpec, PartType, ProductSpec, ProductionMethod, ProductionPhase,
    ProductionRates, ProductionStep, RateLaw, ScaleVars, ScalingTable, ThermalCycleKind,
};
use std::collections::BTreeMap;

pub const PRODUCT: &str = "wing";
pub const METHOD: &str = "Method 1";

pub fn materials() -> MaterialsCatalogue {
    MaterialsCatalogue::new()
        .with_material(
            MaterialCategory::Fabric,
            "Fabric 1",
            MaterialSpec::new(5.49).with_areal_weight(300.0).with_fibre_content(0.55),
        )
        .with_material(
            MaterialCategory::Resin,
            "Resin 1",
            MaterialSpec::new(36.12)
                .with_resin_hardener_ratio(5.333)
                .with_cure_cycle(CureCycle::from_pairs(&[(20.0, 1.0), (80.0, 4.0), (20.0, 1.0)])),
        )
        .with_material(MaterialCategory::Hardener, "Hardener 1", MaterialSpec::new(10.0))
        .with_material(
            MaterialCategory::Core,
            "Core 1",
            MaterialSpec::new(20.0).with_density(80.0).with_thickness(10.0),
        )
        .with_material(
            MaterialCategory::Coating,
            "Gel Coat 1",
            MaterialSpec::new(3.63).with_density(1130.0).with_cured_thickness(0.2),
        )
        .with_consumable("Mould release", ConsumableSpec::new(31.35, 1.0, "Surface Area", 0.0))
        .with_consumable("Peel ply", ConsumableSpec::new(39.0, 181.25, "Surface Area", 0.2))
        .with_consumable("Breather fabric", ConsumableSpec::new(6.0, 1331.25, "Surface Area", 0.2))
        .with_consumable("Flow media", ConsumableSpec::new(17.0, 390.63, "Surface Area", 0.2))
        .with_consumable("Paint", ConsumableSpec::new(0.0, 0.0, "Surface Area", 0.2))
}

pub fn equipment() -> EquipmentCatalogue {
    EquipmentCatalogue::new()
        .with_capital("Ply cutter", CapitalEquipment::new(50_000.0, 5.0, 10.0, 0.0))
        .with_capital("Lifting equipment", CapitalEquipment::new(20_000.0, 0.0, 20.0, 0.0))
        .with_capital("Vacuum unit", CapitalEquipment::new(8_000.0, 0.0, 8.0, 0.0).with_power_usage(2.0))
        .with_capital(
            "Oven",
            CapitalEquipment::new(250_000.0, 10.0, 20.0, 25_000.0)
                .with_power_usage(40.0)
                .with_floorspace(Floorspace::Footprint { length: 6.0, width: 4.0 }),
        )
        .with_capital("NDT equipment", CapitalEquipment::new(150_000.0, 0.0, 10.0, 0.0))
        .with_mould("Spar mould scenario 2", Mould::new(500.0, 2_000.0, "Part Length", 200.0))
}

pub fn method() -> ProductionMethod {
    use MaterialProperty::*;

    ProductionMethod::new(vec![
        ProductionStep::new("step 01", "Fabric cutting", "preform")
            .with_labour_scaling("Ply Length", "fabricCutRate")
            .with_equipment(&["Ply cutter"])
            .with_material(MaterialCategory::Fabric, "Ply Surface Area", vec![ArealWeight])
            .with_scrap_rate(0.25),
        ProductionStep::new("step 02", "Core cutting", "preform")
            .with_labour_scaling("Part Length", "coreCutRate")
            .with_material(MaterialCategory::Core, "Surface Area", vec![Density, Thickness])
            .with_scrap_rate(0.25),
        ProductionStep::new("step 03", "Mould preparation", "preform")
            .with_labour_scaling("Surface Area", "mouldPrepRate")
            .with_staff(2.0)
            .with_equipment(&["Lifting equipment", "Spar mould scenario 2"])
            .with_consumables(&["Mould release"]),
        ProductionStep::new("step 04", "Gel coat", "preform")
            .with_labour_scaling("Surface Area", "gelCoatRate")
            .with_material(MaterialCategory::Coating, "Surface Area", vec![Density, CuredThickness])
            .with_scrap_rate(0.05),
        ProductionStep::new("step 05", "Fabric layup", "preform")
            .with_labour_scaling("Ply Surface Area", "layupRate")
            .with_consumables(&["Peel ply"]),
        ProductionStep::new("step 06", "Core layup", "preform").with_labour_scaling("Surface Area", "coreLayupRate"),
        ProductionStep::new("step 07", "Insert installation", "preform")
            .with_labour_hours(1.0)
            .with_staff(2.0),
        ProductionStep::new("step 08", "Consumables layup", "cure")
            .with_labour_scaling("Surface Area", "consumablesRate")
            .with_consumables(&["Breather fabric", "Flow media"]),
        ProductionStep::new("step 09", "Vacuum bagging", "cure")
            .with_labour_hours(0.5)
            .with_equipment(&["Vacuum unit"])
            .with_consumables(&["Breather fabric", "Flow media"]),
        ProductionStep::new("step 10", "Infusion", "cure")
            .with_labour_hours(2.0)
            .with_material(MaterialCategory::Resin, "Ply Surface Area", vec![ArealWeight])
            .with_scrap_rate(0.076),
        ProductionStep::new("step 11", "Cure", "cure")
            .with_thermal_cycle(ThermalCycleKind::Cure)
            .with_equipment(&["Oven"]),
        ProductionStep::new("step 12", "Trimming", "finishing")
            .with_labour_hours(1.0)
            .with_consumables(&["Paint"]),
        ProductionStep::new("step 13", "Demould", "finishing")
            .with_labour_hours(1.0)
            .with_staff(2.0),
        ProductionStep::new("step 14", "Surface inspection", "assembly")
            .with_labour_hours(5.0)
            .with_equipment(&["NDT equipment"]),
    ])
}

pub fn rates() -> ProductionRates {
    ProductionRates::new(GeneralVariables::new(30.0, 100.0, 8.0, 250.0).with_energy_rate(0.2))
        .with_rate(METHOD, "fabricCutRate", RateLaw::new(0.001, 1.0))
        .with_rate(METHOD, "coreCutRate", RateLaw::new(0.05, 1.0))
        .with_rate(METHOD, "mouldPrepRate", RateLaw::new(0.1, 1.0))
        .with_rate(METHOD, "gelCoatRate", RateLaw::new(0.05, 1.0))
        .with_rate(METHOD, "layupRate", RateLaw::new(0.02, 1.0))
        .with_rate(METHOD, "coreLayupRate", RateLaw::new(0.1, 1.0))
        .with_rate(METHOD, "consumablesRate", RateLaw::new(0.1, 1.0))
}

pub fn catalogue() -> Catalogue {
    let mut methods = BTreeMap::new();
    methods.insert(METHOD.to_string(), method());
    Catalogue::new(materials(), equipment(), methods, rates())
}

pub fn spar(items: u32) -> PartSpec {
    PartSpec::new("spar", PartType::Spar)
        .with_material(MaterialCategory::Fabric, "Fabric 1")
        .with_material(MaterialCategory::Resin, "Resin 1")
        .with_material(MaterialCategory::Hardener, "Hardener 1")
        .with_material(MaterialCategory::Core, "Core 1")
        .with_material(MaterialCategory::Coating, "Gel Coat 1")
        .with_method(ProductionPhase::Preforming, METHOD)
        .with_ignored_steps(ProductionPhase::Preforming, &["step 02", "step 04", "step 06", "step 08"])
        .with_items(items)
}

pub fn input(items: u32) -> ManufacturingInput {
    ManufacturingInput::new(vec![ProductSpec::new(PRODUCT).with_part(spar(items))])
}

pub fn spar_scale_vars() -> ScaleVars {
    [
        ("Surface Area", 14.99),
        ("Ply Surface Area", 566.02),
        ("Ply Length", 2515.66),
        ("Part Length", 27.0),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

pub fn scaling_table(items: u32) -> ScalingTable {
    let parts = (1..=items)
        .map(|i| (format!("spar{}", i), spar_scale_vars()))
        .collect();
    let mut table = ScalingTable::new();
    table.insert(PRODUCT.to_string(), parts);
    table
}

pub fn manufacture_with(items: u32, config: AnalysisConfig) -> Manufacture {
    let mut manufacture = Manufacture::new(catalogue(), input(items), config).unwrap();
    assert_eq!(manufacture.apply_scaling_table(&scaling_table(items)), items as usize);
    manufacture
}

pub fn manufacture(items: u32) -> Manufacture {
    manufacture_with(items, AnalysisConfig::default())
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-6 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() < tolerance,
        "actual {} expected {}",
        actual,
        expected
    );
}
