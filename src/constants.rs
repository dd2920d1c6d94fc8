// SPDX-License-Identifier: Apache-2.0

//! Common constants used across probe implementations
//!
//! This module centralizes lane counts and mask layout constants used by the
//! scalar and SIMD paths. Lane counts are defined on every target because the
//! mask decoders in [`crate::mask`] are portable and tested everywhere.

// =============================================================================
// SIMD Lane Counts by Architecture
// =============================================================================

/// The scalar kernel compares one build key per step.
pub const LANES_SCALAR: usize = 1;

// AVX2 (256-bit registers)
pub const LANES_AVX2_I32: usize = 8; // 256/32 = 8 i32 elements
pub const LANES_AVX2_BYTES: usize = 32; // 256/8 = 32 byte elements

// NEON (128-bit registers)
pub const LANES_NEON_I32: usize = 4; // 128/32 = 4 i32 elements

// =============================================================================
// Comparison Mask Layout
// =============================================================================

// `_mm256_movemask_epi8` yields one bit per byte, so each 32-bit lane owns a
// group of four consecutive mask bits.
pub const AVX2_BYTES_PER_LANE: usize = LANES_AVX2_BYTES / LANES_AVX2_I32;
pub const AVX2_LANE_BYTE_GROUP: u32 = 0xF;

// `vceqq_s32` yields an all-ones word for every matching lane.
pub const NEON_LANE_MATCH: u32 = 0xFFFF_FFFF;

// =============================================================================
// Configuration
// =============================================================================

pub const ENV_STRATEGY: &str = "HWPROBE_STRATEGY";
pub const ENV_DIAGNOSTICS: &str = "HWPROBE_DIAGNOSTICS";
