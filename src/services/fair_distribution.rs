//! 公平分配计算器 - 业务能力层
//!
//! 把监考单位贪心地分给若干名教师，使工作量尽量平均。
//! 同步、纯函数，与排班任务完全独立。

use crate::error::ValidationError;
use crate::models::{Catalog, GenerationSettings, HallTier};
use std::collections::BTreeMap;
use tracing::debug;

/// 一组工作量相同的教师
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPlan {
    pub large_duties: u32,
    pub other_duties: u32,
    /// 属于该组的教师人数
    pub count: u32,
    pub workload: f64,
}

/// 计算器输入
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionInput {
    pub total_workers: u32,
    pub large_units: u32,
    pub other_units: u32,
    pub large_weight: f64,
}

#[derive(Debug, Clone, Default)]
struct Worker {
    large_duties: u32,
    other_duties: u32,
    workload: f64,
}

/// 严格最小、并列取最小编号
fn least_loaded(workers: &[Worker]) -> usize {
    let mut best = 0;
    for (id, worker) in workers.iter().enumerate().skip(1) {
        if worker.workload < workers[best].workload {
            best = id;
        }
    }
    best
}

/// 计算分配方案
///
/// # 参数
/// - `input`: 教师人数、大考场单位数、其它单位数、大考场权重
///
/// # 返回
/// 按工作量降序排列的分组；人数为 0 或权重非正时返回校验错误
pub fn distribute(input: &DistributionInput) -> Result<Vec<DistributionPlan>, ValidationError> {
    if input.total_workers == 0 {
        return Err(ValidationError::NoWorkers);
    }
    if !input.large_weight.is_finite() || input.large_weight <= 0.0 {
        return Err(ValidationError::BadWeight(input.large_weight));
    }

    let mut workers = vec![Worker::default(); input.total_workers as usize];

    for _ in 0..input.large_units {
        let id = least_loaded(&workers);
        let worker = &mut workers[id];
        worker.large_duties += 1;
        worker.workload += input.large_weight;
    }
    for _ in 0..input.other_units {
        let id = least_loaded(&workers);
        let worker = &mut workers[id];
        worker.other_duties += 1;
        worker.workload += 1.0;
    }

    let mut groups: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    for worker in &workers {
        *groups
            .entry((worker.large_duties, worker.other_duties))
            .or_insert(0) += 1;
    }

    let mut plans: Vec<DistributionPlan> = groups
        .into_iter()
        .map(|((large_duties, other_duties), count)| DistributionPlan {
            large_duties,
            other_duties,
            count,
            workload: large_duties as f64 * input.large_weight + other_duties as f64,
        })
        .collect();

    plans.sort_by(|a, b| {
        b.workload
            .total_cmp(&a.workload)
            .then(b.large_duties.cmp(&a.large_duties))
            .then(b.other_duties.cmp(&a.other_duties))
    });

    debug!(
        "分配完成: {} 名教师, {} 个分组",
        input.total_workers,
        plans.len()
    );
    Ok(plans)
}

/// 根据实体目录和年级-考场分配推算计算器输入
///
/// 每个科目按其年级分到的考场累加：大考场计入大考场单位，
/// 中、小考场计入其它单位。目录中找不到的考场跳过。
///
/// # 返回
/// 单位数或教师人数超出 `u32` 时返回校验错误
pub fn autofill(
    catalog: &Catalog,
    settings: &GenerationSettings,
) -> Result<DistributionInput, ValidationError> {
    let mut large_units = 0u32;
    let mut other_units = 0u32;

    for subject in &catalog.subjects {
        let Some(hall_names) = settings.level_hall_assignments.get(&subject.level) else {
            continue;
        };
        for name in hall_names {
            let (units, guards) = match catalog.find_hall(name).and_then(|h| h.tier()) {
                Some(HallTier::Large) => (&mut large_units, settings.guards_large_hall),
                Some(HallTier::Medium) => (&mut other_units, settings.guards_medium_hall),
                Some(HallTier::Small) => (&mut other_units, settings.guards_small_hall),
                None => {
                    debug!("跳过未知考场: {}", name);
                    continue;
                }
            };
            *units = units
                .checked_add(guards)
                .ok_or(ValidationError::TooManyUnits)?;
        }
    }

    let total_workers =
        u32::try_from(catalog.professors.len()).map_err(|_| ValidationError::TooManyUnits)?;

    Ok(DistributionInput {
        total_workers,
        large_units,
        other_units,
        large_weight: settings.large_hall_weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HallRecord, ProfessorRecord, SubjectRecord};

    fn input(total_workers: u32, large_units: u32, other_units: u32, large_weight: f64) -> DistributionInput {
        DistributionInput {
            total_workers,
            large_units,
            other_units,
            large_weight,
        }
    }

    #[test]
    fn test_even_split() {
        let plans = distribute(&input(3, 2, 1, 1.0)).unwrap();
        assert!(plans.iter().all(|p| p.workload == 1.0));
        assert_eq!(plans.iter().map(|p| p.count).sum::<u32>(), 3);
    }

    #[test]
    fn test_single_worker_takes_everything() {
        let plans = distribute(&input(1, 5, 5, 2.0)).unwrap();
        assert_eq!(
            plans,
            vec![DistributionPlan {
                large_duties: 5,
                other_duties: 5,
                count: 1,
                workload: 15.0,
            }]
        );
    }

    #[test]
    fn test_ties_go_to_lowest_id() {
        // 2 名教师、1 个大考场单位、1 个其它单位：编号 0 拿大考场，编号 1 拿其它
        let plans = distribute(&input(2, 1, 1, 3.0)).unwrap();
        assert_eq!(plans[0].large_duties, 1);
        assert_eq!(plans[0].other_duties, 0);
        assert_eq!(plans[1].other_duties, 1);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(distribute(&input(0, 1, 1, 1.0)), Err(ValidationError::NoWorkers));
        assert!(matches!(
            distribute(&input(2, 1, 1, 0.0)),
            Err(ValidationError::BadWeight(_))
        ));
        assert!(matches!(
            distribute(&input(2, 1, 1, f64::NAN)),
            Err(ValidationError::BadWeight(_))
        ));
    }

    #[test]
    fn test_autofill_sums_units_per_subject() {
        let catalog = Catalog {
            professors: (0..5)
                .map(|i| ProfessorRecord {
                    name: format!("P{}", i),
                })
                .collect(),
            halls: vec![
                HallRecord {
                    name: "A".to_string(),
                    hall_type: "كبيرة".to_string(),
                },
                HallRecord {
                    name: "B".to_string(),
                    hall_type: "متوسطة".to_string(),
                },
                HallRecord {
                    name: "C".to_string(),
                    hall_type: "صغيرة".to_string(),
                },
            ],
            subjects: vec![
                SubjectRecord {
                    name: "Math".to_string(),
                    level: "L1".to_string(),
                },
                SubjectRecord {
                    name: "Physics".to_string(),
                    level: "L1".to_string(),
                },
                SubjectRecord {
                    name: "History".to_string(),
                    level: "L2".to_string(),
                },
            ],
        };

        let mut settings = GenerationSettings::default();
        settings.level_hall_assignments.insert(
            "L1".to_string(),
            vec!["A".to_string(), "B".to_string(), "Ghost".to_string()],
        );
        settings
            .level_hall_assignments
            .insert("L2".to_string(), vec!["C".to_string()]);

        let derived = autofill(&catalog, &settings).unwrap();
        assert_eq!(derived.total_workers, 5);
        // L1 两个科目各 4 (大) + 2 (中)；L2 一个科目 1 (小)
        assert_eq!(derived.large_units, 8);
        assert_eq!(derived.other_units, 5);
        assert_eq!(derived.large_weight, settings.large_hall_weight);
    }

    #[test]
    fn test_autofill_rejects_unit_overflow() {
        let catalog = Catalog {
            professors: vec![ProfessorRecord {
                name: "P0".to_string(),
            }],
            halls: vec![HallRecord {
                name: "A".to_string(),
                hall_type: "كبيرة".to_string(),
            }],
            subjects: ["Math", "Physics"]
                .iter()
                .map(|name| SubjectRecord {
                    name: name.to_string(),
                    level: "L1".to_string(),
                })
                .collect(),
        };

        let mut settings = GenerationSettings::default();
        settings.guards_large_hall = 3_000_000_000;
        settings
            .level_hall_assignments
            .insert("L1".to_string(), vec!["A".to_string()]);
        assert_eq!(settings.validate(), Ok(()));

        assert_eq!(
            autofill(&catalog, &settings),
            Err(ValidationError::TooManyUnits)
        );
    }
}
