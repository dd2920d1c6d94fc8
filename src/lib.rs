// SPDX-License-Identifier: Apache-2.0

//! hwprobe library
//!
//! The innermost loop of an equi-join probe phase: for each probe key, find
//! every build-side position holding an equal key. The scan is a blocked
//! nested loop (`probe_count * table_count` comparisons), vectorized with SIMD
//! equality compares where the CPU supports it.
//!
//! - Probe kernels (SIMD blocks + scalar tail, scalar fallback)
//! - Strategy objects selected by hardware capability
//! - Optional completion reports through an injected observer
//!
//! ## Hardware support
//! - **AVX2** on x86/x86_64 (8 x i32 per compare)
//! - **NEON** on aarch64 (4 x i32 per compare)
//! - **Scalar** everywhere, and exclusively with the `disable-simd` feature
//!
//! Every tier appends identical results in identical order.
//!
//! ## Usage
//!
//! ```rust
//! use hwprobe::{StrategyChoice, VectorizedProbe};
//!
//! let probe_keys = [5, 9];
//! let build_keys = [1, 5, 5, 9, 2];
//!
//! // Free function on the widest available tier
//! let mut matched = Vec::new();
//! hwprobe::probe_equality_matches(&probe_keys, 2, &build_keys, 5, &mut matched).unwrap();
//! assert_eq!(matched, vec![1, 2, 3]);
//!
//! // Explicit engine
//! let engine = VectorizedProbe::new(StrategyChoice::Scalar).unwrap();
//! let mut again = Vec::new();
//! engine.probe(&probe_keys, &build_keys, &mut again);
//! assert_eq!(again, matched);
//!
//! // Check available SIMD capabilities
//! let caps = hwprobe::get_hw_capabilities();
//! println!("Has AVX2: {}", caps.has_avx2);
//! ```

pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod dispatch;
pub mod mask;
pub mod probe;
pub mod prober;
pub mod types;

pub use types::*;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
#[path = "tests/mask_tests.rs"]
mod mask_tests;
#[cfg(test)]
#[path = "tests/probe_tests.rs"]
mod probe_tests;
#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod dispatch_tests;
#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod diagnostics_tests;
#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;

// Re-export the main API
pub use config::{DiagnosticsMode, ProbeConfig, StrategyChoice};
pub use diagnostics::{
    CountingObserver, LogObserver, NoopObserver, ProbeObserver, ProbeReport, StdoutObserver,
};
pub use dispatch::*;
pub use probe::MatchSink;
pub use prober::{EqualityProber, ScalarProber};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use prober::Avx2Prober;
#[cfg(target_arch = "aarch64")]
pub use prober::NeonProber;
