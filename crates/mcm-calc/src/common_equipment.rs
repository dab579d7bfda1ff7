//! 工廠共用設備判定

use mcm_core::{AnalysisConfig, Component};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 工廠層級共用設備與其成本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonEquipment {
    /// 設備 → 使用該設備的零件數
    pub usage: BTreeMap<String, usize>,
    /// 設備 → 每件成本（只計一次）
    pub costs: BTreeMap<String, f64>,
    /// 設備 → 每件電力成本
    pub power: BTreeMap<String, f64>,
}

impl CommonEquipment {
    pub fn contains(&self, equipment: &str) -> bool {
        self.usage.contains_key(equipment)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.usage.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }

    /// 記錄成本（重複記錄覆寫，不累加）
    pub fn record(&mut self, equipment: &str, cost: f64) {
        self.costs.insert(equipment.to_string(), cost);
    }

    pub fn record_power(&mut self, equipment: &str, power: f64) {
        *self.power.entry(equipment.to_string()).or_default() += power;
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.values().sum()
    }

    pub fn total_power(&self) -> f64 {
        self.power.values().sum()
    }
}

/// 共用設備判定器
pub struct CommonEquipmentResolver;

impl CommonEquipmentResolver {
    /// 統計共用設備清單中每項設備被多少零件使用，使用數 > 0 者列為共用
    pub fn resolve(components: &[Component], config: &AnalysisConfig) -> CommonEquipment {
        let mut usage = BTreeMap::new();

        for name in &config.common_equipment {
            let count = components
                .iter()
                .filter(|c| c.production_steps.iter().any(|s| s.equipment().any(|e| e == name.as_str())))
                .count();
            if count > 0 {
                usage.insert(name.clone(), count);
            }
        }

        tracing::debug!("共用設備: {:?}", usage);

        CommonEquipment {
            usage,
            ..CommonEquipment::default()
        }
    }
}
