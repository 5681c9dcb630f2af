use guard_schedule_client::services::{distribute, DistributionInput, DistributionPlan};

fn run(total_workers: u32, large_units: u32, other_units: u32, large_weight: f64) -> Vec<DistributionPlan> {
    distribute(&DistributionInput {
        total_workers,
        large_units,
        other_units,
        large_weight,
    })
    .expect("输入合法，应能计算")
}

const WEIGHTS: [f64; 5] = [0.5, 1.0, 1.5, 2.0, 3.0];

#[test]
fn test_conservation() {
    for weight in WEIGHTS {
        for workers in 1..8 {
            for large in 0..12 {
                for other in 0..12 {
                    let plans = run(workers, large, other, weight);
                    let sum = |f: fn(&DistributionPlan) -> u32| -> u32 {
                        plans.iter().map(|p| f(p) * p.count).sum()
                    };
                    assert_eq!(sum(|p| p.large_duties), large);
                    assert_eq!(sum(|p| p.other_duties), other);
                    assert_eq!(plans.iter().map(|p| p.count).sum::<u32>(), workers);
                }
            }
        }
    }
}

#[test]
fn test_balance_bound() {
    for weight in WEIGHTS {
        for workers in 1..8 {
            for large in 0..12 {
                for other in 0..12 {
                    let plans = run(workers, large, other, weight);
                    let max = plans.first().map(|p| p.workload).unwrap_or(0.0);
                    let min = plans.last().map(|p| p.workload).unwrap_or(0.0);
                    assert!(
                        max - min <= weight.max(1.0) + 1e-9,
                        "workers={} large={} other={} weight={}: {} - {}",
                        workers,
                        large,
                        other,
                        weight,
                        max,
                        min
                    );
                }
            }
        }
    }
}

#[test]
fn test_sorted_by_workload_descending() {
    let plans = run(7, 9, 11, 2.5);
    assert!(plans.windows(2).all(|w| w[0].workload >= w[1].workload));
}

/// 把分组展开为每位教师的工作量（降序）
fn ranked_workloads(plans: &[DistributionPlan]) -> Vec<f64> {
    let mut loads: Vec<f64> = plans
        .iter()
        .flat_map(|p| std::iter::repeat(p.workload).take(p.count as usize))
        .collect();
    loads.sort_by(|a, b| b.total_cmp(a));
    loads
}

#[test]
fn test_more_workers_never_raise_any_ranked_workload() {
    for weight in WEIGHTS {
        for large in 0..12 {
            for other in 0..12 {
                for workers in 1..10 {
                    let fewer = ranked_workloads(&run(workers, large, other, weight));
                    let more = ranked_workloads(&run(workers + 1, large, other, weight));
                    // 第 k 忙的教师在人数增加后工作量不会变多
                    for (k, (before, after)) in fewer.iter().zip(&more).enumerate() {
                        assert!(
                            *after <= before + 1e-9,
                            "workers={} large={} other={} weight={} rank={}: {} > {}",
                            workers, large, other, weight, k, after, before
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_deterministic_including_order() {
    let first = run(13, 17, 29, 3.0);
    for _ in 0..5 {
        assert_eq!(run(13, 17, 29, 3.0), first);
    }
}

#[test]
fn test_zero_units_yields_single_idle_group() {
    assert_eq!(
        run(4, 0, 0, 3.0),
        vec![DistributionPlan {
            large_duties: 0,
            other_duties: 0,
            count: 4,
            workload: 0.0,
        }]
    );
}
