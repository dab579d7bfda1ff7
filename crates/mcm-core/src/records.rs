//! 成本中心累計記錄（材料、耗材、人工、設備）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalogue::MaterialCategory;

/// 質量/成本累計帳
///
/// 材料（以類別為鍵）與耗材（以名稱為鍵）共用相同結構。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLedger<K: Ord> {
    /// 結構質量（kg）
    pub mass: BTreeMap<K, f64>,
    /// 結構成本
    pub cost: BTreeMap<K, f64>,
    /// 廢料質量（kg）
    pub scrap_mass: BTreeMap<K, f64>,
    /// 廢料成本
    pub scrap_cost: BTreeMap<K, f64>,

    /// 總成本（結構 + 廢料），由 [`CostLedger::finalize`] 計算
    pub total_cost: f64,
    /// 總質量（結構 + 廢料），由 [`CostLedger::finalize`] 計算
    pub total_mass: f64,
}

impl<K: Ord> Default for CostLedger<K> {
    fn default() -> Self {
        Self {
            mass: BTreeMap::new(),
            cost: BTreeMap::new(),
            scrap_mass: BTreeMap::new(),
            scrap_cost: BTreeMap::new(),
            total_cost: 0.0,
            total_mass: 0.0,
        }
    }
}

/// 單筆質量/成本
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub mass: f64,
    pub cost: f64,
    pub scrap_mass: f64,
    pub scrap_cost: f64,
}

impl<K: Ord + Clone> CostLedger<K> {
    /// 以零值初始化指定的鍵
    pub fn with_keys(keys: impl IntoIterator<Item = K>) -> Self {
        let mut ledger = Self::default();
        for key in keys {
            ledger.ensure(&key);
        }
        ledger
    }

    /// 確保鍵存在於四個累計表中
    pub fn ensure(&mut self, key: &K) {
        for map in [
            &mut self.mass,
            &mut self.cost,
            &mut self.scrap_mass,
            &mut self.scrap_cost,
        ] {
            map.entry(key.clone()).or_insert(0.0);
        }
    }

    /// 累加
    pub fn add(&mut self, key: &K, entry: LedgerEntry) {
        self.ensure(key);
        *self.mass.entry(key.clone()).or_default() += entry.mass;
        *self.cost.entry(key.clone()).or_default() += entry.cost;
        *self.scrap_mass.entry(key.clone()).or_default() += entry.scrap_mass;
        *self.scrap_cost.entry(key.clone()).or_default() += entry.scrap_cost;
    }

    /// 覆寫
    pub fn set(&mut self, key: &K, entry: LedgerEntry) {
        self.mass.insert(key.clone(), entry.mass);
        self.cost.insert(key.clone(), entry.cost);
        self.scrap_mass.insert(key.clone(), entry.scrap_mass);
        self.scrap_cost.insert(key.clone(), entry.scrap_cost);
    }

    pub fn entry(&self, key: &K) -> LedgerEntry {
        LedgerEntry {
            mass: self.mass.get(key).copied().unwrap_or(0.0),
            cost: self.cost.get(key).copied().unwrap_or(0.0),
            scrap_mass: self.scrap_mass.get(key).copied().unwrap_or(0.0),
            scrap_cost: self.scrap_cost.get(key).copied().unwrap_or(0.0),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.mass.contains_key(key)
    }

    /// 彙總總成本與總質量
    pub fn finalize(&mut self) {
        self.total_cost = self.cost.values().sum::<f64>() + self.scrap_cost.values().sum::<f64>();
        self.total_mass = self.mass.values().sum::<f64>() + self.scrap_mass.values().sum::<f64>();
    }

    /// 結構質量（不含廢料）
    pub fn structural_mass(&self) -> f64 {
        self.mass.values().sum()
    }

    /// 歸零數值但保留鍵
    pub fn zero(&mut self) {
        for map in [
            &mut self.mass,
            &mut self.cost,
            &mut self.scrap_mass,
            &mut self.scrap_cost,
        ] {
            map.values_mut().for_each(|v| *v = 0.0);
        }
        self.total_cost = 0.0;
        self.total_mass = 0.0;
    }
}

/// 結構材料帳
pub type MaterialCosts = CostLedger<MaterialCategory>;

/// 耗材帳
pub type ConsumableCosts = CostLedger<String>;

/// 人工成本記錄
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabourCosts {
    /// 各工序人工工時（依工序索引）
    pub labour_hours: Vec<f64>,
    /// 各工序製程工時 = 人工工時 / 人數
    pub process_hours: Vec<f64>,
    /// 各工序人工成本
    pub labour_costs: Vec<f64>,

    /// 各作業階段成本
    pub activity_costs: BTreeMap<String, f64>,
    /// 各作業階段人工工時
    pub activity_hours: BTreeMap<String, f64>,

    pub total_process_hours: f64,
    pub total_labour_hours: f64,
    pub total_cost: f64,
}

impl LabourCosts {
    /// 依工序數與作業階段建立空記錄
    pub fn new(num_steps: usize, activities: &[String]) -> Self {
        let zeroed = || activities.iter().map(|a| (a.clone(), 0.0)).collect();
        Self {
            labour_hours: vec![0.0; num_steps],
            process_hours: vec![0.0; num_steps],
            labour_costs: vec![0.0; num_steps],
            activity_costs: zeroed(),
            activity_hours: zeroed(),
            total_process_hours: 0.0,
            total_labour_hours: 0.0,
            total_cost: 0.0,
        }
    }

    /// 記錄單一工序
    pub fn record_step(&mut self, index: usize, labour_hours: f64, process_hours: f64, cost: f64) {
        if index >= self.labour_hours.len() {
            let len = index + 1;
            self.labour_hours.resize(len, 0.0);
            self.process_hours.resize(len, 0.0);
            self.labour_costs.resize(len, 0.0);
        }
        self.labour_hours[index] = labour_hours;
        self.process_hours[index] = process_hours;
        self.labour_costs[index] = cost;
    }

    /// 將工序成本累加到作業階段
    pub fn accumulate_activity(&mut self, activity: &str, cost: f64, labour_hours: f64) {
        *self.activity_costs.entry(activity.to_string()).or_default() += cost;
        *self.activity_hours.entry(activity.to_string()).or_default() += labour_hours;
    }

    pub fn finalize(&mut self) {
        self.total_process_hours = self.process_hours.iter().sum();
        self.total_labour_hours = self.labour_hours.iter().sum();
        self.total_cost = self.labour_costs.iter().sum();
    }
}

/// 設備成本記錄
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCosts {
    /// 作業階段 → 使用的設備名稱
    pub equipment_list: BTreeMap<String, Vec<String>>,

    /// 專用設備 → 每件成本
    pub equipment_costs: BTreeMap<String, f64>,

    /// 設備 → 每件電力成本
    pub power_costs: BTreeMap<String, f64>,

    /// 設備成本總和
    pub cost: f64,
    /// 電力成本總和
    pub power: f64,
}

impl EquipmentCosts {
    pub fn new(activities: &[String]) -> Self {
        Self {
            equipment_list: activities.iter().map(|a| (a.clone(), Vec::new())).collect(),
            ..Self::default()
        }
    }

    /// 登記設備所屬的作業階段（同名設備只記一次）
    pub fn locate(&mut self, activity: &str, equipment: &str) {
        let list = self.equipment_list.entry(activity.to_string()).or_default();
        if !list.iter().any(|e| e == equipment) {
            list.push(equipment.to_string());
        }
    }

    /// 記錄專用設備成本（同名設備覆寫）
    pub fn record(&mut self, equipment: &str, cost: f64) {
        self.equipment_costs.insert(equipment.to_string(), cost);
    }

    /// 累加設備電力成本
    pub fn record_power(&mut self, equipment: &str, power: f64) {
        *self.power_costs.entry(equipment.to_string()).or_default() += power;
    }

    /// 所有登記過的設備名稱（去重、排序）
    pub fn used_equipment(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .equipment_list
            .values()
            .flatten()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn finalize(&mut self) {
        self.cost = self.equipment_costs.values().sum();
        self.power = self.power_costs.values().sum();
    }
}
