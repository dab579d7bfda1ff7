//! # MCM
//!
//! 複合材料航太結構件的參數化製造成本模型
//!
//! - [`mcm_core`]：目錄、零件、工序與成本記錄
//! - [`mcm_calc`]：成本計算器與 [`Manufacture`] 主流程

pub use mcm_calc;
pub use mcm_core;

pub use mcm_calc::{CostBreakdown, CostSummary, CostTotals, Manufacture, SensitivitySweep};
pub use mcm_core::{AnalysisConfig, Catalogue, ManufacturingInput, McmError, Result};
