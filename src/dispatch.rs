// SPDX-License-Identifier: Apache-2.0

//! # hwprobe dispatch framework
//!
//! This module chooses which probe kernel runs. Selection is a capability
//! decision only: every tier appends the same matches in the same order, so
//! choosing a tier never changes results, only throughput.
//!
//! Two ways in:
//! - free functions (`probe_equality_matches*`) that use a process-wide
//!   prober picked once on first use and report through the `log` facade
//! - [`VectorizedProbe`], a configured engine with an explicit strategy and
//!   an injected [`ProbeObserver`]
//!
//! The count-based entry points mirror a pointer + length calling convention.
//! A count larger than its slice is reported as [`ProbeError::LengthMismatch`];
//! a smaller count scans only the leading elements.

use std::sync::OnceLock;
use std::time::Instant;

use log::{debug, trace};

#[cfg(all(target_arch = "aarch64", not(feature = "disable-simd")))]
use std::arch::is_aarch64_feature_detected;

use crate::config::{ProbeConfig, StrategyChoice};
use crate::diagnostics::{LogObserver, NoopObserver, ProbeObserver, ProbeReport};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::prober::Avx2Prober;
#[cfg(target_arch = "aarch64")]
use crate::prober::NeonProber;
use crate::prober::{EqualityProber, ScalarProber};
use crate::types::{MatchPair, ProbeError, Result, Strategy};

// =============================================================================
//  HARDWARE DETECTION & SIMD CAPABILITIES
// =============================================================================

/// Hardware capability detection used by the dispatch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareCapabilities {
    pub has_avx2: bool,
    pub has_neon: bool,
}

/// Detect SIMD capabilities at runtime.
///
/// With the `disable-simd` feature every capability reports `false`, which
/// turns the crate into its scalar-only build.
impl HardwareCapabilities {
    #[inline]
    pub fn detect() -> Self {
        HardwareCapabilities {
            has_avx2: Self::detect_avx2(),
            has_neon: Self::detect_neon(),
        }
    }

    fn detect_avx2() -> bool {
        #[allow(unused_mut)]
        let mut detected_avx2 = false;

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        #[cfg(not(feature = "disable-simd"))]
        if is_x86_feature_detected!("avx2") {
            detected_avx2 = true;
        }

        detected_avx2
    }

    fn detect_neon() -> bool {
        #[allow(unused_mut)]
        let mut detected_neon = false;

        #[cfg(target_arch = "aarch64")]
        #[cfg(not(feature = "disable-simd"))]
        if is_aarch64_feature_detected!("neon") {
            detected_neon = true;
        }

        detected_neon
    }

    /// Widest tier available on this CPU.
    pub fn best_strategy(&self) -> Strategy {
        if self.has_avx2 {
            Strategy::Avx2
        } else if self.has_neon {
            Strategy::Neon
        } else {
            Strategy::Scalar
        }
    }
}

/// Get information about available SIMD capabilities
#[inline]
pub fn get_hw_capabilities() -> HardwareCapabilities {
    HardwareCapabilities::detect()
}

/// Check if a specific SIMD instruction set is available
#[inline]
pub fn has_hw_support(instruction_set: &str) -> bool {
    let caps = get_hw_capabilities();
    match instruction_set {
        "avx2" => caps.has_avx2,
        "neon" => caps.has_neon,
        "scalar" => true,
        _ => false,
    }
}

// =============================================================================
//  PROBER SELECTION
// =============================================================================

/// Build the prober for `choice`.
///
/// `Auto` never fails. An explicit SIMD choice fails with
/// [`ProbeError::Unsupported`] when the CPU (or the target architecture)
/// lacks it.
pub fn select_prober(choice: StrategyChoice) -> Result<Box<dyn EqualityProber>> {
    let strategy = match choice {
        StrategyChoice::Auto => get_hw_capabilities().best_strategy(),
        StrategyChoice::Scalar => Strategy::Scalar,
        StrategyChoice::Avx2 => Strategy::Avx2,
        StrategyChoice::Neon => Strategy::Neon,
    };

    let prober = prober_for(strategy)?;
    debug!(
        "Selected {} prober ({} lanes) for {:?}",
        prober.strategy().label(),
        prober.lanes(),
        choice
    );
    Ok(prober)
}

fn prober_for(strategy: Strategy) -> Result<Box<dyn EqualityProber>> {
    match strategy {
        Strategy::Scalar => Ok(Box::new(ScalarProber)),
        Strategy::Avx2 => {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            return Ok(Box::new(Avx2Prober::try_new()?));
            #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
            return Err(ProbeError::Unsupported(
                "AVX2 is only available on x86/x86_64 targets".to_string(),
            ));
        }
        Strategy::Neon => {
            #[cfg(target_arch = "aarch64")]
            return Ok(Box::new(NeonProber::try_new()?));
            #[cfg(not(target_arch = "aarch64"))]
            return Err(ProbeError::Unsupported(
                "NEON is only available on aarch64 targets".to_string(),
            ));
        }
    }
}

/// Process-wide prober, chosen once on first use with [`StrategyChoice::Auto`].
pub fn default_prober() -> &'static dyn EqualityProber {
    static DEFAULT_PROBER: OnceLock<Box<dyn EqualityProber>> = OnceLock::new();
    &**DEFAULT_PROBER.get_or_init(|| {
        let strategy = get_hw_capabilities().best_strategy();
        prober_for(strategy).unwrap_or_else(|_| Box::new(ScalarProber))
    })
}

// =============================================================================
//  REPORTING
// =============================================================================

fn run_reported<F>(
    strategy: Strategy,
    observer: &dyn ProbeObserver,
    probe_count: usize,
    table_count: usize,
    scan: F,
) -> usize
where
    F: FnOnce() -> usize,
{
    if !observer.enabled() {
        return scan();
    }

    let start = Instant::now();
    let matches = scan();
    let elapsed = start.elapsed();

    observer.on_complete(&ProbeReport {
        strategy,
        probe_count,
        table_count,
        matches,
        elapsed: strategy.is_accelerated().then_some(elapsed),
    });
    matches
}

// =============================================================================
//  CONFIGURED ENGINE
// =============================================================================

/// A prober plus the observer its completion reports go to.
pub struct VectorizedProbe {
    prober: Box<dyn EqualityProber>,
    observer: Box<dyn ProbeObserver>,
}

impl std::fmt::Debug for VectorizedProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorizedProbe")
            .field("prober", &self.prober)
            .field("observer_enabled", &self.observer.enabled())
            .finish()
    }
}

impl VectorizedProbe {
    /// Engine for `choice` with reports disabled.
    pub fn new(choice: StrategyChoice) -> Result<Self> {
        Ok(Self {
            prober: select_prober(choice)?,
            observer: Box::new(NoopObserver),
        })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Ok(Self {
            prober: select_prober(config.strategy)?,
            observer: config.diagnostics.observer(),
        })
    }

    pub fn from_prober(prober: Box<dyn EqualityProber>) -> Self {
        Self {
            prober,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: ProbeObserver + 'static,
    {
        self.observer = Box::new(observer);
        self
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.prober.strategy()
    }

    #[inline]
    pub fn prober(&self) -> &dyn EqualityProber {
        &*self.prober
    }

    /// Append the build index of every match; returns how many were appended.
    pub fn probe(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<usize>,
    ) -> usize {
        trace!(
            "VectorizedProbe::probe: strategy={}, probe.len()={}, build.len()={}",
            self.strategy().label(),
            probe_keys.len(),
            build_keys.len()
        );
        run_reported(
            self.strategy(),
            &*self.observer,
            probe_keys.len(),
            build_keys.len(),
            || self.prober.probe_into(probe_keys, build_keys, matched),
        )
    }

    /// Append a [`MatchPair`] for every match; returns how many were appended.
    pub fn probe_pairs(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<MatchPair>,
    ) -> usize {
        trace!(
            "VectorizedProbe::probe_pairs: strategy={}, probe.len()={}, build.len()={}",
            self.strategy().label(),
            probe_keys.len(),
            build_keys.len()
        );
        run_reported(
            self.strategy(),
            &*self.observer,
            probe_keys.len(),
            build_keys.len(),
            || self.prober.probe_pairs_into(probe_keys, build_keys, matched),
        )
    }
}

// =============================================================================
//  COUNT-BASED ENTRY POINTS
// =============================================================================

#[inline]
fn checked_prefix<'a>(
    what: &'static str,
    keys: &'a [i32],
    count: usize,
) -> Result<&'a [i32]> {
    keys.get(..count).ok_or(ProbeError::LengthMismatch {
        what,
        count,
        len: keys.len(),
    })
}

/// Shared body of the count-based entry points: validates both prefixes,
/// then runs `scan` under the debug-level report.
fn probe_counted_with<F>(
    prober: &dyn EqualityProber,
    probe_keys: &[i32],
    probe_count: usize,
    build_keys: &[i32],
    table_count: usize,
    scan: F,
) -> Result<()>
where
    F: FnOnce(&dyn EqualityProber, &[i32], &[i32]) -> usize,
{
    trace!(
        "PROBE_EQUALITY DISPATCH: strategy={}, probe_count={}, table_count={}",
        prober.strategy().label(),
        probe_count,
        table_count
    );
    let probe = checked_prefix("probe", probe_keys, probe_count)?;
    let build = checked_prefix("table", build_keys, table_count)?;

    run_reported(
        prober.strategy(),
        &LogObserver,
        probe_count,
        table_count,
        || scan(prober, probe, build),
    );
    Ok(())
}

/// For each of the first `probe_count` probe keys, append the index of every
/// equal key among the first `table_count` build keys.
///
/// Runs on the widest tier available. Appends to `matched_indices` without
/// clearing it.
///
/// # Errors
/// * [`ProbeError::LengthMismatch`] if a count exceeds its slice
///
/// # Examples
/// ```rust
/// let probe = [5, 9];
/// let build = [1, 5, 5, 9, 2];
/// let mut matched = Vec::new();
/// hwprobe::probe_equality_matches(&probe, probe.len(), &build, build.len(), &mut matched)?;
/// assert_eq!(matched, vec![1, 2, 3]);
/// # Ok::<(), hwprobe::types::ProbeError>(())
/// ```
pub fn probe_equality_matches(
    probe_keys: &[i32],
    probe_count: usize,
    build_keys: &[i32],
    table_count: usize,
    matched_indices: &mut Vec<usize>,
) -> Result<()> {
    probe_counted_with(
        default_prober(),
        probe_keys,
        probe_count,
        build_keys,
        table_count,
        |prober, probe, build| prober.probe_into(probe, build, matched_indices),
    )
}

/// Scalar-only entry point; available on every target.
pub fn probe_equality_matches_scalar(
    probe_keys: &[i32],
    probe_count: usize,
    build_keys: &[i32],
    table_count: usize,
    matched_indices: &mut Vec<usize>,
) -> Result<()> {
    probe_counted_with(
        &ScalarProber,
        probe_keys,
        probe_count,
        build_keys,
        table_count,
        |prober, probe, build| prober.probe_into(probe, build, matched_indices),
    )
}

/// AVX2 entry point.
///
/// # Errors
/// * [`ProbeError::Unsupported`] if the CPU lacks AVX2
/// * [`ProbeError::LengthMismatch`] if a count exceeds its slice
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn probe_equality_matches_avx2(
    probe_keys: &[i32],
    probe_count: usize,
    build_keys: &[i32],
    table_count: usize,
    matched_indices: &mut Vec<usize>,
) -> Result<()> {
    let prober = Avx2Prober::try_new()?;
    probe_counted_with(
        &prober,
        probe_keys,
        probe_count,
        build_keys,
        table_count,
        |prober, probe, build| prober.probe_into(probe, build, matched_indices),
    )
}

/// NEON entry point.
///
/// # Errors
/// * [`ProbeError::Unsupported`] if the CPU lacks NEON
/// * [`ProbeError::LengthMismatch`] if a count exceeds its slice
#[cfg(target_arch = "aarch64")]
pub fn probe_equality_matches_neon(
    probe_keys: &[i32],
    probe_count: usize,
    build_keys: &[i32],
    table_count: usize,
    matched_indices: &mut Vec<usize>,
) -> Result<()> {
    let prober = NeonProber::try_new()?;
    probe_counted_with(
        &prober,
        probe_keys,
        probe_count,
        build_keys,
        table_count,
        |prober, probe, build| prober.probe_into(probe, build, matched_indices),
    )
}

/// Like [`probe_equality_matches`], but every entry also records which probe
/// key produced it.
pub fn probe_equality_match_pairs(
    probe_keys: &[i32],
    probe_count: usize,
    build_keys: &[i32],
    table_count: usize,
    matched: &mut Vec<MatchPair>,
) -> Result<()> {
    probe_counted_with(
        default_prober(),
        probe_keys,
        probe_count,
        build_keys,
        table_count,
        |prober, probe, build| prober.probe_pairs_into(probe, build, matched),
    )
}
