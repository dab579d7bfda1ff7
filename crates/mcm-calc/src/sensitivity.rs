//! 年產量敏感度分析

use mcm_core::Result;
use serde::{Deserialize, Serialize};

use crate::breakdown::CostTotals;
use crate::manufacture::Manufacture;
use crate::production_lines::ProductionLines;

/// 單一年產量下的分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub parts_per_annum: f64,
    pub totals: CostTotals,
    pub lines: ProductionLines,
}

/// 敏感度分析
pub struct SensitivitySweep;

impl SensitivitySweep {
    /// 依序以每個年產量重新分析，結束後還原原本的年產量並重新分析
    pub fn parts_per_annum(manufacture: &mut Manufacture, values: &[f64]) -> Result<Vec<SensitivityPoint>> {
        let original = manufacture.general().parts_per_annum;
        tracing::info!("年產量敏感度分析：{} 個點", values.len());

        let mut points = Vec::with_capacity(values.len());
        let mut outcome = Ok(());
        for &parts_per_annum in values {
            manufacture.set_parts_per_annum(parts_per_annum);
            let totals = match manufacture.analyse() {
                Ok(totals) => totals.clone(),
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            };
            points.push(SensitivityPoint {
                parts_per_annum,
                totals,
                lines: manufacture.production_lines().clone(),
            });
        }

        manufacture.set_parts_per_annum(original);
        outcome?;
        manufacture.analyse()?;

        Ok(points)
    }
}
