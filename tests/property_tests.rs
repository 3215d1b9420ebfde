//! Property-based tests for vigia
//!
//! - Test mathematical invariants
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use vigia::analysis::{aggregate, correlation_matrix, flag_pairs, MetricStatistics, NumericColumn, NumericColumns};
use vigia::monitor::{TrialMonitor, TrialObserver};
use vigia::pipeline::SearchPipeline;
use vigia::trial::{TrialResult, TrialSettings};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Optional resource reading
fn arb_peak() -> impl Strategy<Value = Option<f64>> {
    proptest::option::of(0.0f64..4096.0)
}

/// Slot name drawn from a small feature vocabulary so groups collide
fn arb_slots() -> impl Strategy<Value = Vec<(String, MetricStatistics)>> {
    proptest::collection::btree_map(
        ("[a-d]", proptest::option::of(0u8..5)).prop_map(|(f, i)| match i {
            Some(i) => format!("{f}.{i}"),
            None => f,
        }),
        (-1.0f64..1.0, 0.0f64..0.1).prop_map(|(m, s)| MetricStatistics::new(m, s)),
        0..20,
    )
    .prop_map(|m| m.into_iter().collect())
}

/// Row-aligned columns
fn arb_columns() -> impl Strategy<Value = NumericColumns> {
    (2usize..6, 3usize..30).prop_flat_map(|(cols, rows)| {
        proptest::collection::vec(proptest::collection::vec(-100.0f64..100.0, rows), cols).prop_map(
            |data| {
                NumericColumns::new(
                    data.into_iter()
                        .enumerate()
                        .map(|(i, values)| NumericColumn::new(format!("c{i}"), values))
                        .collect(),
                )
            },
        )
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: peaks equal the max over reported values
    #[test]
    fn prop_peaks_are_running_maxima(readings in proptest::collection::vec((arb_peak(), arb_peak()), 0..30)) {
        let pipeline = SearchPipeline::new().stage("e0", "FastTreeBinary");
        let mut monitor = TrialMonitor::new(&pipeline).unwrap();

        for (id, (cpu, mem)) in readings.iter().enumerate() {
            let settings = TrialSettings::builder(id as u64).pipeline_schema("e0").build();
            let mut builder = TrialResult::builder(settings, 0.5, 0.5, 1.0);
            if let Some(cpu) = cpu {
                builder = builder.peak_cpu(*cpu);
            }
            if let Some(mem) = mem {
                builder = builder.peak_memory_mb(*mem);
            }
            monitor.on_trial_completed(builder.build());
        }

        let max = |values: Vec<f64>| values.into_iter().reduce(f64::max);
        prop_assert_eq!(monitor.peaks().cpu, max(readings.iter().filter_map(|r| r.0).collect()));
        prop_assert_eq!(monitor.peaks().memory_mb, max(readings.iter().filter_map(|r| r.1).collect()));
        prop_assert_eq!(monitor.completed_trials().len(), readings.len());
    }

    /// Property: aggregation is sorted ascending and conserves the total mean
    #[test]
    fn prop_aggregate_sorted_and_conserving(slots in arb_slots(), threshold in 0.0f64..0.5) {
        let total: f64 = slots.iter().map(|(_, s)| s.mean).sum();
        let slot_count = slots.len();
        let ranked = aggregate(slots, threshold).unwrap();

        for pair in ranked.windows(2) {
            prop_assert!(pair[0].mean <= pair[1].mean);
        }
        let merged_total: f64 = ranked.iter().map(|f| f.mean).sum();
        prop_assert!((merged_total - total).abs() < 1e-9);
        prop_assert_eq!(ranked.iter().map(|f| f.slots).sum::<usize>(), slot_count);
        for f in &ranked {
            prop_assert_eq!(f.is_deletion_candidate, f.mean.abs() < threshold);
            prop_assert!(!f.feature.contains('.'));
        }
    }

    /// Property: matrix is symmetric, unit diagonal, bounded
    #[test]
    fn prop_correlation_matrix_shape(columns in arb_columns()) {
        let m = correlation_matrix(&columns).unwrap();
        let n = m.size();
        prop_assert_eq!(n, columns.len());
        for i in 0..n {
            prop_assert_eq!(m.get(i, i), 1.0);
            for j in 0..n {
                let r = m.get(i, j);
                prop_assert!(r.is_nan() || (-1.0..=1.0).contains(&r));
                prop_assert!(r.to_bits() == m.get(j, i).to_bits());
            }
        }
        prop_assert!(flag_pairs(&m, 1.0).is_empty());
    }
}
