// SPDX-License-Identifier: Apache-2.0

//! Equality probe kernels
//!
//! For each probe key, every build-side position holding an equal key is
//! appended to a caller-owned sink. The scan is a blocked nested loop, not a
//! hashed lookup: `O(probe_count * table_count)` comparisons, one vector
//! block of build keys per instruction on the SIMD paths.
//!
//! All kernels produce identical output:
//! - probe-major order (every match of probe key `i` before probe key `i + 1`)
//! - build indices strictly increasing within one probe key
//! - one entry per matching build position, duplicates included
//! - the sink is only appended to, never cleared
//!
//! ## Performance notes
//! The block loop stops once fewer than one full vector of build keys
//! remains (`j + LANES <= table_count`). That bound is the only thing that
//! keeps the unaligned loads inside the build slice; the leftover elements
//! go through [`scan_tail`].

// Some clippy lints are noisy for low-level SIMD code; we opt out at the module level.
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]

#[cfg(target_arch = "x86")]
use std::arch::x86::{
    __m256i, _mm256_cmpeq_epi32, _mm256_loadu_si256, _mm256_movemask_epi8, _mm256_set1_epi32,
};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    __m256i, _mm256_cmpeq_epi32, _mm256_loadu_si256, _mm256_movemask_epi8, _mm256_set1_epi32,
};

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::{int32x4_t, vceqq_s32, vdupq_n_s32, vld1q_s32, vst1q_u32};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::constants::LANES_AVX2_I32;
#[cfg(target_arch = "aarch64")]
use crate::constants::LANES_NEON_I32;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::mask::avx2_lanes_from_byte_mask;
#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
use crate::mask::lanes;
#[cfg(target_arch = "aarch64")]
use crate::mask::neon_lanes_from_words;
use crate::types::MatchPair;

// =============================================================================
// MATCH SINKS
// =============================================================================

/// Append-only destination for discovered matches.
///
/// Kernels call [`MatchSink::push_match`] once per match in output order.
pub trait MatchSink {
    fn push_match(&mut self, probe_index: usize, build_index: usize);
}

/// Build-index only output.
impl MatchSink for Vec<usize> {
    #[inline(always)]
    fn push_match(&mut self, _probe_index: usize, build_index: usize) {
        self.push(build_index);
    }
}

/// Output attributed to the probe key.
impl MatchSink for Vec<MatchPair> {
    #[inline(always)]
    fn push_match(&mut self, probe_index: usize, build_index: usize) {
        self.push(MatchPair::new(probe_index, build_index));
    }
}

// =============================================================================
// TAIL SCANNER
// =============================================================================

/// Scalar equality scan of `build_keys[start..]` for one probe key.
///
/// Covers the elements that do not fill a complete vector block, or the whole
/// build slice when `start == 0`. Returns the number of matches appended.
#[inline(always)]
pub fn scan_tail<S: MatchSink + ?Sized>(
    probe_index: usize,
    probe_key: i32,
    build_keys: &[i32],
    start: usize,
    out: &mut S,
) -> usize {
    let mut matches = 0;
    for (j, &key) in build_keys.iter().enumerate().skip(start) {
        if key == probe_key {
            out.push_match(probe_index, j);
            matches += 1;
        }
    }
    matches
}

// =============================================================================
// SCALAR FALLBACK
// =============================================================================

/// Full probe x build double scan. Reference semantics for the SIMD kernels.
#[inline]
pub fn probe_scalar<S: MatchSink + ?Sized>(
    probe_keys: &[i32],
    build_keys: &[i32],
    out: &mut S,
) -> usize {
    let mut total = 0;
    for (i, &probe_key) in probe_keys.iter().enumerate() {
        total += scan_tail(i, probe_key, build_keys, 0, out);
    }
    total
}

// =============================================================================
// AVX2 (8 x i32)
// =============================================================================

/// Compare one broadcast probe key against the 8 build keys at `block_start`.
///
/// Caller guarantees `block_start + 8 <= build_keys.len()`.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
#[inline]
pub(crate) unsafe fn compare_block_avx2<S: MatchSink + ?Sized>(
    probe_vec: __m256i,
    probe_index: usize,
    build_keys: &[i32],
    block_start: usize,
    out: &mut S,
) -> usize {
    debug_assert!(block_start + LANES_AVX2_I32 <= build_keys.len());

    let table_vec = _mm256_loadu_si256(build_keys.as_ptr().add(block_start) as *const __m256i);
    let cmp = _mm256_cmpeq_epi32(probe_vec, table_vec);
    let byte_mask = _mm256_movemask_epi8(cmp);
    if byte_mask == 0 {
        return 0;
    }

    let lane_mask = avx2_lanes_from_byte_mask(byte_mask);
    for lane in lanes(lane_mask) {
        out.push_match(probe_index, block_start + lane);
    }
    lane_mask.count_ones() as usize
}

/// AVX2 probe: full 8-wide blocks, then the scalar tail.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn probe_avx2<S: MatchSink + ?Sized>(
    probe_keys: &[i32],
    build_keys: &[i32],
    out: &mut S,
) -> usize {
    const LANES: usize = LANES_AVX2_I32; // AVX2 processes 8 i32 values at once

    let table_count = build_keys.len();
    let mut total = 0;

    for (i, &probe_key) in probe_keys.iter().enumerate() {
        let probe_vec = _mm256_set1_epi32(probe_key);

        let mut j = 0;
        while j + LANES <= table_count {
            total += compare_block_avx2(probe_vec, i, build_keys, j, out);
            j += LANES;
        }

        total += scan_tail(i, probe_key, build_keys, j, out);
    }

    total
}

// =============================================================================
// NEON (4 x i32)
// =============================================================================

/// Compare one broadcast probe key against the 4 build keys at `block_start`.
///
/// Caller guarantees `block_start + 4 <= build_keys.len()`.
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
pub(crate) unsafe fn compare_block_neon<S: MatchSink + ?Sized>(
    probe_vec: int32x4_t,
    probe_index: usize,
    build_keys: &[i32],
    block_start: usize,
    out: &mut S,
) -> usize {
    debug_assert!(block_start + LANES_NEON_I32 <= build_keys.len());

    let table_vec = vld1q_s32(build_keys.as_ptr().add(block_start));
    let cmp = vceqq_s32(probe_vec, table_vec);

    // vceqq_s32 returns 0xFFFFFFFF for equal lanes, 0x00000000 otherwise
    let mut words = [0u32; LANES_NEON_I32];
    vst1q_u32(words.as_mut_ptr(), cmp);

    let lane_mask = neon_lanes_from_words(words);
    for lane in lanes(lane_mask) {
        out.push_match(probe_index, block_start + lane);
    }
    lane_mask.count_ones() as usize
}

/// NEON probe: full 4-wide blocks, then the scalar tail.
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
pub(crate) unsafe fn probe_neon<S: MatchSink + ?Sized>(
    probe_keys: &[i32],
    build_keys: &[i32],
    out: &mut S,
) -> usize {
    const LANES: usize = LANES_NEON_I32; // NEON processes 4 i32 values at once

    let table_count = build_keys.len();
    let mut total = 0;

    for (i, &probe_key) in probe_keys.iter().enumerate() {
        let probe_vec = vdupq_n_s32(probe_key);

        let mut j = 0;
        while j + LANES <= table_count {
            total += compare_block_neon(probe_vec, i, build_keys, j, out);
            j += LANES;
        }

        total += scan_tail(i, probe_key, build_keys, j, out);
    }

    total
}
