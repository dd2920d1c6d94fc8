// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::thread;

  use crate::config::{DiagnosticsMode, ProbeConfig, StrategyChoice};
  use crate::diagnostics::{CountingObserver, ProbeObserver, ProbeReport};
  use crate::dispatch::{
    default_prober, get_hw_capabilities, has_hw_support, probe_equality_match_pairs,
    probe_equality_matches, probe_equality_matches_scalar, select_prober, VectorizedProbe,
  };
  use crate::test_utils::{config_test_logger, reference_indices};
  use crate::types::{MatchPair, ProbeError, Strategy};

  #[test]
  fn test_auto_selects_best_available() {
    config_test_logger();
    let caps = get_hw_capabilities();
    let prober = select_prober(StrategyChoice::Auto).unwrap();
    assert_eq!(prober.strategy(), caps.best_strategy());
    assert_eq!(default_prober().strategy(), caps.best_strategy());
  }

  #[test]
  fn test_scalar_always_selectable() {
    let prober = select_prober(StrategyChoice::Scalar).unwrap();
    assert_eq!(prober.strategy(), Strategy::Scalar);
    assert_eq!(prober.lanes(), 1);
    assert!(has_hw_support("scalar"));
    assert!(!has_hw_support("sse9"));
  }

  #[test]
  fn test_explicit_simd_choice_matches_capabilities() {
    let caps = get_hw_capabilities();

    match select_prober(StrategyChoice::Avx2) {
      Ok(prober) => {
        assert!(caps.has_avx2);
        assert_eq!(prober.lanes(), 8);
      }
      Err(err) => {
        assert!(!caps.has_avx2);
        assert!(matches!(err, ProbeError::Unsupported(_)));
      }
    }

    match select_prober(StrategyChoice::Neon) {
      Ok(prober) => {
        assert!(caps.has_neon);
        assert_eq!(prober.lanes(), 4);
      }
      Err(err) => {
        assert!(!caps.has_neon);
        assert!(matches!(err, ProbeError::Unsupported(_)));
      }
    }
  }

  #[cfg(feature = "disable-simd")]
  #[test]
  fn test_disable_simd_forces_scalar() {
    let caps = get_hw_capabilities();
    assert!(!caps.has_avx2 && !caps.has_neon);
    assert_eq!(default_prober().strategy(), Strategy::Scalar);
  }

  // =============================================================================
  //  COUNT-BASED ENTRY POINTS
  // =============================================================================

  #[test]
  fn test_probe_equality_matches_concrete() {
    let mut matched = Vec::new();
    probe_equality_matches(&[5, 9], 2, &[1, 5, 5, 9, 2], 5, &mut matched).unwrap();
    assert_eq!(matched, vec![1, 2, 3]);

    let mut scalar = Vec::new();
    probe_equality_matches_scalar(&[5, 9], 2, &[1, 5, 5, 9, 2], 5, &mut scalar).unwrap();
    assert_eq!(scalar, matched);

    let mut none = Vec::new();
    probe_equality_matches(&[42], 1, &[1, 2, 3], 3, &mut none).unwrap();
    assert!(none.is_empty());
  }

  #[test]
  fn test_counts_limit_the_scan() {
    let probe = [5, 9];
    let build = [5, 5, 9, 9, 5];

    let mut matched = Vec::new();
    probe_equality_matches(&probe, 1, &build, 2, &mut matched).unwrap();
    assert_eq!(matched, vec![0, 1]);

    let mut none = Vec::new();
    probe_equality_matches(&probe, 0, &build, 5, &mut none).unwrap();
    probe_equality_matches(&probe, 2, &build, 0, &mut none).unwrap();
    assert!(none.is_empty());
  }

  #[test]
  fn test_count_exceeding_slice_is_an_error() {
    let mut matched = vec![3];
    let err = probe_equality_matches(&[1], 2, &[1, 1], 2, &mut matched).unwrap_err();
    assert_eq!(
      err,
      ProbeError::LengthMismatch {
        what: "probe",
        count: 2,
        len: 1
      }
    );

    let err = probe_equality_matches(&[1], 1, &[1, 1], 3, &mut matched).unwrap_err();
    assert!(matches!(err, ProbeError::LengthMismatch { what: "table", .. }));

    // nothing appended on error
    assert_eq!(matched, vec![3]);
  }

  #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
  #[test]
  fn test_avx2_entry_point() {
    let mut matched = Vec::new();
    let result =
      crate::dispatch::probe_equality_matches_avx2(&[5, 9], 2, &[1, 5, 5, 9, 2], 5, &mut matched);
    if get_hw_capabilities().has_avx2 {
      result.unwrap();
      assert_eq!(matched, vec![1, 2, 3]);
    } else {
      assert!(matches!(result, Err(ProbeError::Unsupported(_))));
      assert!(matched.is_empty());
    }
  }

  #[cfg(target_arch = "aarch64")]
  #[test]
  fn test_neon_entry_point() {
    let mut matched = Vec::new();
    let result =
      crate::dispatch::probe_equality_matches_neon(&[5, 9], 2, &[1, 5, 5, 9, 2], 5, &mut matched);
    if get_hw_capabilities().has_neon {
      result.unwrap();
      assert_eq!(matched, vec![1, 2, 3]);
    } else {
      assert!(matches!(result, Err(ProbeError::Unsupported(_))));
    }
  }

  #[test]
  fn test_match_pairs_entry_point() {
    let mut pairs = Vec::new();
    probe_equality_match_pairs(&[5, 9, 5], 3, &[1, 5, 9], 3, &mut pairs).unwrap();
    assert_eq!(
      pairs,
      vec![MatchPair::new(0, 1), MatchPair::new(1, 2), MatchPair::new(2, 1)]
    );
  }

  #[test]
  fn test_match_pairs_counts_follow_index_entry_points() {
    let probe = [5, 9];
    let build = [5, 5, 9, 9, 5];

    let mut pairs = Vec::new();
    probe_equality_match_pairs(&probe, 1, &build, 2, &mut pairs).unwrap();
    assert_eq!(pairs, vec![MatchPair::new(0, 0), MatchPair::new(0, 1)]);

    let mut pairs = vec![MatchPair::new(7, 7)];
    let err = probe_equality_match_pairs(&probe, 3, &build, 5, &mut pairs).unwrap_err();
    assert_eq!(
      err,
      ProbeError::LengthMismatch {
        what: "probe",
        count: 3,
        len: 2
      }
    );

    let err = probe_equality_match_pairs(&probe, 2, &build, 6, &mut pairs).unwrap_err();
    assert_eq!(
      err,
      ProbeError::LengthMismatch {
        what: "table",
        count: 6,
        len: 5
      }
    );

    // nothing appended on error
    assert_eq!(pairs, vec![MatchPair::new(7, 7)]);
  }

  // =============================================================================
  //  ENGINE
  // =============================================================================

  #[test]
  fn test_engine_reports_after_completion() {
    let observer = Arc::new(CountingObserver::new());
    let sink = Arc::clone(&observer);
    let engine = VectorizedProbe::new(StrategyChoice::Auto)
      .unwrap()
      .with_observer(move |r: &ProbeReport| sink.on_complete(r));

    let probe = [5, 9];
    let build: Vec<i32> = (0..40).map(|i| if i % 3 == 0 { 5 } else { 9 }).collect();
    let mut matched = Vec::new();
    let count = engine.probe(&probe, &build, &mut matched);

    assert_eq!(count, build.len());
    assert_eq!(matched, reference_indices(&probe, &build));

    let reports = observer.reports();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.strategy, engine.strategy());
    assert_eq!(report.matches, count);
    assert_eq!(report.probe_count, 2);
    assert_eq!(report.table_count, 40);
    assert_eq!(report.elapsed.is_some(), engine.strategy().is_accelerated());
  }

  #[test]
  fn test_engine_from_config() {
    let config = ProbeConfig::new(StrategyChoice::Scalar, DiagnosticsMode::Off);
    let engine = VectorizedProbe::from_config(&config).unwrap();
    assert_eq!(engine.strategy(), Strategy::Scalar);

    let mut pairs = Vec::new();
    engine.probe_pairs(&[1], &[1, 0, 1], &mut pairs);
    assert_eq!(pairs, vec![MatchPair::new(0, 0), MatchPair::new(0, 2)]);
  }

  #[test]
  fn test_observer_does_not_change_results() {
    let probe: Vec<i32> = (0..10).collect();
    let build: Vec<i32> = (0..77).map(|i| i % 13).collect();

    let quiet = VectorizedProbe::new(StrategyChoice::Auto).unwrap();
    let noisy = VectorizedProbe::new(StrategyChoice::Auto)
      .unwrap()
      .with_observer(CountingObserver::new());

    let mut a = Vec::new();
    let mut b = Vec::new();
    quiet.probe(&probe, &build, &mut a);
    noisy.probe(&probe, &build, &mut b);
    assert_eq!(a, b);
  }

  #[test]
  fn test_shared_inputs_across_threads() {
    let probe: Arc<Vec<i32>> = Arc::new((0..16).collect());
    let build: Arc<Vec<i32>> = Arc::new((0..203).map(|i| i % 17).collect());
    let expected = reference_indices(&probe, &build);

    let handles: Vec<_> = (0..4)
      .map(|_| {
        let probe = Arc::clone(&probe);
        let build = Arc::clone(&build);
        thread::spawn(move || {
          let mut matched = Vec::new();
          probe_equality_matches(&probe, probe.len(), &build, build.len(), &mut matched)
            .unwrap();
          matched
        })
      })
      .collect();

    for handle in handles {
      assert_eq!(handle.join().unwrap(), expected);
    }
  }
}
