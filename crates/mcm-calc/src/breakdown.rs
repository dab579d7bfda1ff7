//! 成本彙總與分項明細

use chrono::{DateTime, Utc};
use mcm_core::{AnalysisConfig, Catalogue, Component, McmError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::common_equipment::CommonEquipment;

/// 工廠層級設備的分項鍵
pub const FACTORY_KEY: &str = "factory";

/// 耗材在材料類別分項中的鍵
pub const CONSUMABLES_KEY: &str = "consumables";

/// 套用管理費，回傳 (管理費, 含管理費的製造成本)
pub fn apply_overhead(subtotal: f64, rate: f64) -> (f64, f64) {
    let overhead = subtotal * rate;
    (overhead, subtotal + overhead)
}

/// 總成本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTotals {
    /// 材料成本（結構材料 + 耗材，含廢料）
    pub materials: f64,
    /// 其中的耗材成本
    pub consumables: f64,
    pub labour: f64,
    /// 設備成本（專用 + 共用）
    pub equipment: f64,
    /// 其中的共用設備成本
    pub common_equipment: f64,
    /// 電力成本（僅在啟用時計入製造成本）
    pub power: f64,
    pub overhead: f64,
    /// 製造成本（含管理費）
    pub manufacturing: f64,
    /// 結構質量（kg，不含耗材與廢料）
    pub structural_mass: f64,
    /// 每公斤成本；結構質量為零時為 None
    pub unit_cost: Option<f64>,
    /// 設備佔地面積（m²）
    pub floor_area: f64,
}

impl CostTotals {
    /// 每公斤成本，結構質量為零時回傳 `DivisionByZero`
    pub fn unit_cost(&self) -> Result<f64> {
        self.unit_cost
            .ok_or_else(|| McmError::DivisionByZero("結構質量為零".to_string()))
    }

    /// 管理費前的小計
    pub fn subtotal(&self) -> f64 {
        self.manufacturing - self.overhead
    }
}

/// 單一材料（或耗材）名稱的質量/成本
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedCost {
    pub mass: f64,
    pub cost: f64,
    pub scrap_mass: f64,
    pub scrap_cost: f64,
}

impl NamedCost {
    pub fn total_cost(&self) -> f64 {
        self.cost + self.scrap_cost
    }
}

/// 報表用分項明細
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// 材料名稱 → 質量/成本
    pub materials_by_name: BTreeMap<String, NamedCost>,
    /// 耗材名稱 → 質量/成本（目錄中所有耗材皆列出）
    pub consumables_by_name: BTreeMap<String, NamedCost>,
    /// 作業階段 → 人工成本
    pub labour_by_activity: BTreeMap<String, f64>,
    /// 作業階段 → 人工工時
    pub labour_hours_by_activity: BTreeMap<String, f64>,
    /// 零件限定名稱（及 "factory"）→ 設備成本
    pub equipment_by_component: BTreeMap<String, f64>,
    /// 設備名稱 → 成本
    pub equipment_by_item: BTreeMap<String, f64>,
    /// 材料類別（及 "consumables"）→ 成本
    pub material_categories: BTreeMap<String, f64>,
}

/// 成本彙總器
pub struct CostAggregator;

impl CostAggregator {
    /// 彙總所有零件與共用設備的成本
    pub fn aggregate(
        components: &[Component],
        common: &CommonEquipment,
        catalogue: &Catalogue,
        config: &AnalysisConfig,
    ) -> (CostTotals, CostBreakdown) {
        let mut totals = CostTotals::default();
        let mut breakdown = CostBreakdown {
            consumables_by_name: catalogue
                .materials
                .consumables
                .keys()
                .map(|name| (name.clone(), NamedCost::default()))
                .collect(),
            ..CostBreakdown::default()
        };

        for component in components {
            totals.consumables += component.consumables.total_cost;
            totals.materials += component.materials.total_cost + component.consumables.total_cost;
            totals.labour += component.labour.labour_costs.iter().sum::<f64>();
            totals.equipment += component.equipment.cost;
            totals.power += component.equipment.power;
            totals.structural_mass += component.structural_mass();

            Self::add_materials(&mut breakdown, component);

            for (activity, cost) in &component.labour.activity_costs {
                *breakdown.labour_by_activity.entry(activity.clone()).or_default() += cost;
            }
            for (activity, hours) in &component.labour.activity_hours {
                *breakdown.labour_hours_by_activity.entry(activity.clone()).or_default() += hours;
            }

            breakdown
                .equipment_by_component
                .insert(component.qualified_name(), component.equipment.cost);
            for (item, cost) in &component.equipment.equipment_costs {
                *breakdown.equipment_by_item.entry(item.clone()).or_default() += cost;
            }
        }

        totals.common_equipment = common.total_cost();
        totals.equipment += totals.common_equipment;
        totals.power += common.total_power();
        breakdown
            .equipment_by_component
            .insert(FACTORY_KEY.to_string(), totals.common_equipment);
        for (item, cost) in &common.costs {
            *breakdown.equipment_by_item.entry(item.clone()).or_default() += cost;
        }

        if totals.consumables > 0.0 {
            breakdown
                .material_categories
                .insert(CONSUMABLES_KEY.to_string(), totals.consumables);
        }

        let mut subtotal = totals.materials + totals.labour + totals.equipment;
        if config.include_power_costs {
            subtotal += totals.power;
        }
        let (overhead, manufacturing) = apply_overhead(subtotal, config.overhead_rate);
        totals.overhead = overhead;
        totals.manufacturing = manufacturing;

        totals.unit_cost = if totals.structural_mass > 0.0 {
            Some(totals.manufacturing / totals.structural_mass)
        } else {
            tracing::warn!("結構質量為零，無法計算每公斤成本");
            None
        };

        (totals, breakdown)
    }

    fn add_materials(breakdown: &mut CostBreakdown, component: &Component) {
        for (category, name) in &component.material_details {
            let entry = component.materials.entry(category);
            let named = breakdown.materials_by_name.entry(name.clone()).or_default();
            named.mass += entry.mass;
            named.cost += entry.cost;
            named.scrap_mass += entry.scrap_mass;
            named.scrap_cost += entry.scrap_cost;

            *breakdown
                .material_categories
                .entry(category.to_string())
                .or_default() += entry.cost + entry.scrap_cost;
        }

        for name in component.consumables.mass.keys() {
            let entry = component.consumables.entry(name);
            let named = breakdown.consumables_by_name.entry(name.clone()).or_default();
            named.mass += entry.mass;
            named.cost += entry.cost;
            named.scrap_mass += entry.scrap_mass;
            named.scrap_cost += entry.scrap_cost;
        }
    }
}

/// 匯出用成本摘要（金額取至小數兩位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub materials: Decimal,
    pub labour: Decimal,
    pub equipment: Decimal,
    pub power: Decimal,
    pub overhead: Decimal,
    pub manufacturing: Decimal,
    /// 結構質量（kg，小數三位）
    pub structural_mass: Decimal,
    pub unit_cost: Option<Decimal>,
}

impl CostSummary {
    pub fn from_totals(totals: &CostTotals) -> Result<Self> {
        Ok(Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            materials: to_currency(totals.materials)?,
            labour: to_currency(totals.labour)?,
            equipment: to_currency(totals.equipment)?,
            power: to_currency(totals.power)?,
            overhead: to_currency(totals.overhead)?,
            manufacturing: to_currency(totals.manufacturing)?,
            structural_mass: to_decimal(totals.structural_mass)?.round_dp(3),
            unit_cost: totals.unit_cost.map(to_currency).transpose()?,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn to_decimal(value: f64) -> Result<Decimal> {
    Decimal::try_from(value).map_err(|_| McmError::InvalidInput(format!("無法轉換為金額: {}", value)))
}

fn to_currency(value: f64) -> Result<Decimal> {
    Ok(to_decimal(value)?.round_dp(2))
}
