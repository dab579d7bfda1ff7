//! 產線數量計算

use mcm_core::{checked_div, Brand, Component, GeneralVariables, McmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 零件限定名稱（`{product}/{name}`）→ 產線數
pub type LineCounts = BTreeMap<String, u32>;

/// 兩類品牌各自的產線數
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionLines {
    pub product_lines: LineCounts,
    pub assembly_lines: LineCounts,
}

impl ProductionLines {
    /// 在人工分析完成後依品牌計算產線數
    pub fn size(components: &[Component], general: &GeneralVariables) -> Result<Self> {
        Ok(Self {
            product_lines: ProductionLineCalculator::size(components, Brand::Preform, general)?,
            assembly_lines: ProductionLineCalculator::size(components, Brand::Assembly, general)?,
        })
    }

    /// 零件對應的產線數，尚未計算時回傳 `ProductionLinesNotSized`
    pub fn lines_for(&self, component: &Component) -> Result<u32> {
        let map = match component.brand {
            Brand::Preform => &self.product_lines,
            Brand::Assembly => &self.assembly_lines,
        };
        let key = component.qualified_name();
        map.get(&key)
            .copied()
            .ok_or(McmError::ProductionLinesNotSized(key))
    }

    pub fn total_lines(&self) -> u32 {
        self.product_lines.values().chain(self.assembly_lines.values()).sum()
    }
}

/// 產線數量計算器
pub struct ProductionLineCalculator;

impl ProductionLineCalculator {
    /// 產線數 = ceil(製程工時 × 年產量 / (每日工時 × 年生產天數))
    pub fn line_count(process_hours: f64, general: &GeneralVariables) -> Result<u32> {
        let required = process_hours * general.parts_per_annum;
        let lines = checked_div(required, general.annual_hours(), "每條產線年可用工時")?.ceil();
        if !lines.is_finite() || lines < 0.0 {
            return Err(McmError::InvalidInput(format!("產線數無效: {}", lines)));
        }
        Ok(lines as u32)
    }

    /// 計算指定品牌所有零件的產線數
    pub fn size(components: &[Component], brand: Brand, general: &GeneralVariables) -> Result<LineCounts> {
        components
            .iter()
            .filter(|c| c.brand == brand)
            .map(|c| {
                let lines = Self::line_count(c.labour.total_process_hours, general)?;
                tracing::debug!("零件 {} 需要 {} 條產線", c.qualified_name(), lines);
                Ok((c.qualified_name(), lines))
            })
            .collect()
    }
}
