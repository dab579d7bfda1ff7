//! 分析配置

use serde::{Deserialize, Serialize};

/// 耗材跨工序的累計方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumablePolicy {
    /// 後面的工序覆寫前面的數值（歷史行為）
    #[default]
    Overwrite,
    /// 各工序數值累加
    Accumulate,
}

/// 成本分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 作業階段（依序）
    pub activity_levels: Vec<String>,

    /// 工廠共用設備清單
    pub common_equipment: Vec<String>,

    /// 管理費率（製造成本的比例）
    pub overhead_rate: f64,

    pub consumable_policy: ConsumablePolicy,

    /// 是否將設備電力成本計入製造成本
    pub include_power_costs: bool,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置作業階段
    pub fn with_activity_levels(mut self, levels: &[&str]) -> Self {
        self.activity_levels = levels.iter().map(|l| l.to_string()).collect();
        self
    }

    /// 建構器模式：設置共用設備清單
    pub fn with_common_equipment(mut self, names: &[&str]) -> Self {
        self.common_equipment = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// 建構器模式：設置管理費率
    pub fn with_overhead_rate(mut self, rate: f64) -> Self {
        self.overhead_rate = rate;
        self
    }

    /// 建構器模式：設置耗材累計方式
    pub fn with_consumable_policy(mut self, policy: ConsumablePolicy) -> Self {
        self.consumable_policy = policy;
        self
    }

    /// 建構器模式：是否計入電力成本
    pub fn with_power_costs(mut self, include: bool) -> Self {
        self.include_power_costs = include;
        self
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            activity_levels: ["preform", "cure", "assembly", "finishing"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            common_equipment: ["Freezer", "NDT equipment", "Ply cutter", "Oven", "Autoclave"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            overhead_rate: 0.05,
            consumable_policy: ConsumablePolicy::Overwrite,
            include_power_costs: false,
        }
    }
}
