// SPDX-License-Identifier: Apache-2.0

//! Comparison mask decoding
//!
//! The two SIMD families report equality differently. AVX2 has no 32-bit
//! lane movemask for integers, so the kernel goes through
//! `_mm256_movemask_epi8`, which produces one bit per *byte*: a matching lane
//! shows up as a group of four set bits. NEON's `vceqq_s32` instead produces
//! a full word per lane, all-ones on match.
//!
//! Both decoders normalize to a lane mask (bit `k` set means lane `k`
//! matched) so the kernels share one emit loop. They are plain integer
//! functions with no target requirements and are compiled on every target.

use crate::constants::{
    AVX2_BYTES_PER_LANE, AVX2_LANE_BYTE_GROUP, LANES_AVX2_I32, LANES_NEON_I32, NEON_LANE_MATCH,
};

/// Collapse a `_mm256_movemask_epi8` result into an 8-bit lane mask.
///
/// Lane `k` is reported only when its whole byte group (bits `4k..4k+3`) is
/// set. A partial group is not a lane match.
#[inline(always)]
pub fn avx2_lanes_from_byte_mask(byte_mask: i32) -> u8 {
    let bits = byte_mask as u32;
    if bits == 0 {
        return 0;
    }

    let mut lanes = 0u8;
    for lane in 0..LANES_AVX2_I32 {
        let group = (bits >> (lane * AVX2_BYTES_PER_LANE)) & AVX2_LANE_BYTE_GROUP;
        if group == AVX2_LANE_BYTE_GROUP {
            lanes |= 1 << lane;
        }
    }
    lanes
}

/// Collapse the four words of a `vceqq_s32` result into a 4-bit lane mask.
#[inline(always)]
pub fn neon_lanes_from_words(words: [u32; LANES_NEON_I32]) -> u8 {
    let mut lanes = 0u8;
    for (lane, &word) in words.iter().enumerate() {
        if word == NEON_LANE_MATCH {
            lanes |= 1 << lane;
        }
    }
    lanes
}

/// Iterate the set lanes of a lane mask in increasing order.
#[inline(always)]
pub fn lanes(mask: u8) -> LaneIter {
    LaneIter { remaining: mask }
}

#[derive(Debug, Clone, Copy)]
pub struct LaneIter {
    remaining: u8,
}

impl Iterator for LaneIter {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let lane = self.remaining.trailing_zeros() as usize;
        // clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(lane)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for LaneIter {}
