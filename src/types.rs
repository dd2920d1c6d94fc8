// SPDX-License-Identifier: Apache-2.0

// types.rs for hwprobe
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{what} count {count} exceeds slice length {len}")]
    LengthMismatch {
        what: &'static str,
        count: usize,
        len: usize,
    },
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;

/// A match attributed to the probe key that produced it.
///
/// The plain index output of the probe kernels only records the build-side
/// position, which is ambiguous once several probe keys are processed. Callers
/// that need to know which probe key matched use the `*_pairs` variants, which
/// append one of these per match in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchPair {
    pub probe_index: usize,
    pub build_index: usize,
}

impl MatchPair {
    #[inline]
    pub fn new(probe_index: usize, build_index: usize) -> Self {
        Self {
            probe_index,
            build_index,
        }
    }
}

/// Hardware tier a prober runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Scalar,
    Avx2,
    Neon,
}

impl Strategy {
    /// Label used in completion notices.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Scalar => "Scalar",
            Strategy::Avx2 => "SIMD-AVX2",
            Strategy::Neon => "NEON",
        }
    }

    #[inline]
    pub fn is_accelerated(self) -> bool {
        !matches!(self, Strategy::Scalar)
    }

    /// Number of build keys compared per instruction.
    #[inline]
    pub fn lanes(self) -> usize {
        match self {
            Strategy::Scalar => crate::constants::LANES_SCALAR,
            Strategy::Avx2 => crate::constants::LANES_AVX2_I32,
            Strategy::Neon => crate::constants::LANES_NEON_I32,
        }
    }
}
