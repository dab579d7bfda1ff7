//! # MCM Calculation Engine
//!
//! 製造成本計算引擎：工序展開、材料/人工/設備成本、產線數量與成本彙總

pub mod breakdown;
pub mod common_equipment;
pub mod consistency;
pub mod equipment;
pub mod expansion;
pub mod labour;
pub mod manufacture;
pub mod materials;
pub mod production_lines;
pub mod sensitivity;

// Re-export 主要類型
pub use breakdown::{apply_overhead, CostAggregator, CostBreakdown, CostSummary, CostTotals};
pub use common_equipment::{CommonEquipment, CommonEquipmentResolver};
pub use consistency::{ConsistencyChecker, ConsistencyIssue, ConsistencyReport};
pub use equipment::EquipmentCalculator;
pub use expansion::StepExpansion;
pub use labour::LabourCalculator;
pub use manufacture::Manufacture;
pub use materials::{MaterialContribution, MaterialsCalculator};
pub use production_lines::{LineCounts, ProductionLineCalculator, ProductionLines};
pub use sensitivity::{SensitivityPoint, SensitivitySweep};
