//! 翼盒製造成本示例
//!
//! 由 `demos/data` 載入目錄、製造輸入與縮放變數，執行完整分析與年產量敏感度分析。
//!
//! ```bash
//! RUST_LOG=debug cargo run --example wing_cost
//! ```

use anyhow::{Context, Result};
use mcm::{AnalysisConfig, Catalogue, Manufacture, ManufacturingInput, SensitivitySweep};
use mcm_core::ScalingTable;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("data").join(name)
}

fn read(name: &str) -> Result<String> {
    let path = data_path(name);
    std::fs::read_to_string(&path).with_context(|| format!("無法讀取 {}", path.display()))
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    println!("=== 翼盒製造成本示例 ===\n");

    // 1. 載入資料
    let catalogue = Catalogue::from_json_str(&read("catalogue.json")?)?;
    let input = ManufacturingInput::from_json_str(&read("input.json")?)?;
    let table: ScalingTable = serde_json::from_str(&read("scaling.json")?)?;

    // 2. 建立模型
    let config = AnalysisConfig::default().with_power_costs(true);
    let mut manufacture = Manufacture::new(catalogue, input, config)?;
    let applied = manufacture.apply_scaling_table(&table);
    println!("套用縮放變數: {} 個零件", applied);
    print!("{}", manufacture.consistency());

    // 3. 成本分析
    let totals = manufacture.analyse()?.clone();
    println!("\n成本總覽:");
    println!("  材料:     {:>12.2}", totals.materials);
    println!("  人工:     {:>12.2}", totals.labour);
    println!("  設備:     {:>12.2}", totals.equipment);
    println!("  電力:     {:>12.2}", totals.power);
    println!("  管理費:   {:>12.2}", totals.overhead);
    println!("  製造成本: {:>12.2}", totals.manufacturing);
    println!("  結構質量: {:>12.3} kg", totals.structural_mass);
    match totals.unit_cost {
        Some(unit_cost) => println!("  每公斤:   {:>12.2}", unit_cost),
        None => println!("  每公斤:   N/A"),
    }
    println!("  佔地面積: {:>12.1} m²", totals.floor_area);

    println!("\n產線:");
    let lines = manufacture.production_lines();
    for (name, count) in lines.product_lines.iter().chain(&lines.assembly_lines) {
        println!("  - {}: {}", name, count);
    }

    println!("\n設備成本:");
    for (name, cost) in &manufacture.breakdown().equipment_by_component {
        println!("  - {}: {:.2}", name, cost);
    }

    // 4. 年產量敏感度
    println!("\n年產量敏感度:");
    let points = SensitivitySweep::parts_per_annum(&mut manufacture, &[50.0, 100.0, 250.0, 500.0, 1000.0])?;
    for point in &points {
        println!(
            "  ppa {:>6.0}: 製造成本 {:>12.2}，產線 {}",
            point.parts_per_annum,
            point.totals.manufacturing,
            point.lines.total_lines()
        );
    }

    // 5. 匯出摘要
    let summary = manufacture.summary()?;
    println!("\n摘要:\n{}", summary.to_json()?);

    Ok(())
}
