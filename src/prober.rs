// SPDX-License-Identifier: Apache-2.0

//! Strategy objects over the probe kernels
//!
//! Each hardware tier is an [`EqualityProber`]. The SIMD probers can only be
//! obtained through `try_new`, which checks the CPU feature at runtime; holding
//! one is the proof that its `unsafe` kernel may run on this machine.

use std::fmt;

use crate::probe;
use crate::types::{MatchPair, Strategy};
#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
use crate::types::{ProbeError, Result};

/// One implementation of the equality probe contract.
///
/// Every implementation appends the same entries in the same order for the
/// same inputs; only throughput differs.
pub trait EqualityProber: Send + Sync + fmt::Debug {
    fn strategy(&self) -> Strategy;

    #[inline]
    fn lanes(&self) -> usize {
        self.strategy().lanes()
    }

    /// Append the build index of every match, returning how many were appended.
    fn probe_into(&self, probe_keys: &[i32], build_keys: &[i32], matched: &mut Vec<usize>)
        -> usize;

    /// Append `(probe_index, build_index)` for every match.
    fn probe_pairs_into(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<MatchPair>,
    ) -> usize;
}

// =============================================================================
// SCALAR
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarProber;

impl EqualityProber for ScalarProber {
    #[inline]
    fn strategy(&self) -> Strategy {
        Strategy::Scalar
    }

    #[inline]
    fn probe_into(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<usize>,
    ) -> usize {
        probe::probe_scalar(probe_keys, build_keys, matched)
    }

    #[inline]
    fn probe_pairs_into(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<MatchPair>,
    ) -> usize {
        probe::probe_scalar(probe_keys, build_keys, matched)
    }
}

// =============================================================================
// AVX2
// =============================================================================

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Debug, Clone, Copy)]
pub struct Avx2Prober {
    _detected: (),
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl Avx2Prober {
    pub fn try_new() -> Result<Self> {
        if crate::dispatch::get_hw_capabilities().has_avx2 {
            Ok(Self { _detected: () })
        } else {
            Err(ProbeError::Unsupported(
                "AVX2 is not available on this CPU".to_string(),
            ))
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl EqualityProber for Avx2Prober {
    #[inline]
    fn strategy(&self) -> Strategy {
        Strategy::Avx2
    }

    #[inline]
    fn probe_into(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<usize>,
    ) -> usize {
        // SAFETY: constructed only after AVX2 was detected.
        unsafe { probe::probe_avx2(probe_keys, build_keys, matched) }
    }

    #[inline]
    fn probe_pairs_into(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<MatchPair>,
    ) -> usize {
        // SAFETY: constructed only after AVX2 was detected.
        unsafe { probe::probe_avx2(probe_keys, build_keys, matched) }
    }
}

// =============================================================================
// NEON
// =============================================================================

#[cfg(target_arch = "aarch64")]
#[derive(Debug, Clone, Copy)]
pub struct NeonProber {
    _detected: (),
}

#[cfg(target_arch = "aarch64")]
impl NeonProber {
    pub fn try_new() -> Result<Self> {
        if crate::dispatch::get_hw_capabilities().has_neon {
            Ok(Self { _detected: () })
        } else {
            Err(ProbeError::Unsupported(
                "NEON is not available on this CPU".to_string(),
            ))
        }
    }
}

#[cfg(target_arch = "aarch64")]
impl EqualityProber for NeonProber {
    #[inline]
    fn strategy(&self) -> Strategy {
        Strategy::Neon
    }

    #[inline]
    fn probe_into(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<usize>,
    ) -> usize {
        // SAFETY: constructed only after NEON was detected.
        unsafe { probe::probe_neon(probe_keys, build_keys, matched) }
    }

    #[inline]
    fn probe_pairs_into(
        &self,
        probe_keys: &[i32],
        build_keys: &[i32],
        matched: &mut Vec<MatchPair>,
    ) -> usize {
        // SAFETY: constructed only after NEON was detected.
        unsafe { probe::probe_neon(probe_keys, build_keys, matched) }
    }
}
