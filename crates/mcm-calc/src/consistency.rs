//! 目錄一致性預檢
//!
//! 分析前檢查製造輸入引用的材料、生產方法、速率參數、設備與耗材是否存在於目錄中。
//! 計算器本身對缺漏的處理較寬鬆（例如略過缺少的生產方法），需要嚴格檢查時使用本模組。

use mcm_core::{Catalogue, EquipmentCatalogue, ManufacturingInput, ProductionPhase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// 一致性問題
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConsistencyIssue {
    MissingMaterial {
        part: String,
        category: String,
        material: String,
    },
    MissingMethod {
        part: String,
        phase: String,
        method: String,
    },
    MissingRateTable {
        method: String,
    },
    MissingRateParameter {
        method: String,
        step: String,
        parameter: String,
    },
    MissingEquipment {
        method: String,
        step: String,
        equipment: String,
    },
    MissingConsumable {
        method: String,
        step: String,
        consumable: String,
    },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::MissingMaterial { part, category, material } => {
                write!(f, "零件 {}: {} 材料 {} 不在材料目錄中", part, category, material)
            }
            ConsistencyIssue::MissingMethod { part, phase, method } => {
                write!(f, "零件 {}: {} 階段的生產方法 {} 不在方法目錄中", part, phase, method)
            }
            ConsistencyIssue::MissingRateTable { method } => {
                write!(f, "生產方法 {} 不在生產速率表中", method)
            }
            ConsistencyIssue::MissingRateParameter { method, step, parameter } => {
                write!(f, "生產方法 {} {}: 速率參數 {} 不存在", method, step, parameter)
            }
            ConsistencyIssue::MissingEquipment { method, step, equipment } => {
                write!(f, "生產方法 {} {}: 設備 {} 不在設備目錄中", method, step, equipment)
            }
            ConsistencyIssue::MissingConsumable { method, step, consumable } => {
                write!(f, "生產方法 {} {}: 耗材 {} 不在材料目錄中", method, step, consumable)
            }
        }
    }
}

/// 一致性檢查報告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub issues: Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "一致性檢查通過");
        }
        writeln!(f, "一致性檢查發現 {} 個問題:", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  - {}", issue)?;
        }
        Ok(())
    }
}

/// 一致性檢查器
pub struct ConsistencyChecker;

impl ConsistencyChecker {
    pub fn check(input: &ManufacturingInput, catalogue: &Catalogue) -> ConsistencyReport {
        let mut issues = BTreeSet::new();
        let mut methods_used = BTreeSet::new();

        for product in &input.products {
            for part in &product.parts {
                let part_name = format!("{}/{}", product.name, part.key);

                for (category, material) in part.material_details() {
                    if catalogue.materials.material(category, &material).is_err() {
                        issues.insert(ConsistencyIssue::MissingMaterial {
                            part: part_name.clone(),
                            category: category.to_string(),
                            material,
                        });
                    }
                }

                for phase in ProductionPhase::ALL {
                    let Some(method) = part.method_for(phase) else {
                        continue;
                    };
                    if catalogue.methods.contains_key(method) {
                        methods_used.insert(method.to_string());
                    } else {
                        issues.insert(ConsistencyIssue::MissingMethod {
                            part: part_name.clone(),
                            phase: phase.to_string(),
                            method: method.to_string(),
                        });
                    }
                }
            }
        }

        for method_name in &methods_used {
            Self::check_method(method_name, catalogue, &mut issues);
        }

        let report = ConsistencyReport {
            issues: issues.into_iter().collect(),
        };
        tracing::debug!("一致性檢查完成: {} 個問題", report.len());
        report
    }

    fn check_method(method_name: &str, catalogue: &Catalogue, issues: &mut BTreeSet<ConsistencyIssue>) {
        let Ok(method) = catalogue.method(method_name) else {
            return;
        };
        let rates = catalogue.rates.methods.get(method_name);
        let needs_rates = method.steps.iter().any(|s| s.labour_scaling.is_some());
        if rates.is_none() && needs_rates {
            issues.insert(ConsistencyIssue::MissingRateTable {
                method: method_name.to_string(),
            });
        }

        for step in &method.steps {
            if let (Some(scaling), Some(rates)) = (&step.labour_scaling, rates) {
                if !rates.contains_key(&scaling.rate) {
                    issues.insert(ConsistencyIssue::MissingRateParameter {
                        method: method_name.to_string(),
                        step: step.label.clone(),
                        parameter: scaling.rate.clone(),
                    });
                }
            }

            for equipment in step.equipment() {
                let exists = if EquipmentCatalogue::is_mould(equipment) {
                    catalogue.equipment.moulds.contains_key(equipment)
                } else {
                    catalogue.equipment.capital.contains_key(equipment)
                };
                if !exists {
                    issues.insert(ConsistencyIssue::MissingEquipment {
                        method: method_name.to_string(),
                        step: step.label.clone(),
                        equipment: equipment.to_string(),
                    });
                }
            }

            for consumable in step.consumable_names() {
                if !catalogue.materials.consumables.contains_key(consumable) {
                    issues.insert(ConsistencyIssue::MissingConsumable {
                        method: method_name.to_string(),
                        step: step.label.clone(),
                        consumable: consumable.to_string(),
                    });
                }
            }
        }
    }
}
