// SPDX-License-Identifier: Apache-2.0

//! Test-only helpers.

use crate::prober::{EqualityProber, ScalarProber};

/// Route `log` output to the test harness. Safe to call from every test.
pub fn config_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every prober the running CPU supports, scalar first.
pub fn available_probers() -> Vec<Box<dyn EqualityProber>> {
    #[allow(unused_mut)]
    let mut probers: Vec<Box<dyn EqualityProber>> = vec![Box::new(ScalarProber)];

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    if let Ok(prober) = crate::prober::Avx2Prober::try_new() {
        probers.push(Box::new(prober));
    }

    #[cfg(target_arch = "aarch64")]
    if let Ok(prober) = crate::prober::NeonProber::try_new() {
        probers.push(Box::new(prober));
    }

    probers
}

/// Naive reference: every `(i, j)` with `probe[i] == build[j]`, probe-major.
pub fn reference_pairs(probe_keys: &[i32], build_keys: &[i32]) -> Vec<(usize, usize)> {
    probe_keys
        .iter()
        .enumerate()
        .flat_map(|(i, &p)| {
            build_keys
                .iter()
                .enumerate()
                .filter(move |&(_, &b)| b == p)
                .map(move |(j, _)| (i, j))
        })
        .collect()
}

/// Build-index projection of [`reference_pairs`].
pub fn reference_indices(probe_keys: &[i32], build_keys: &[i32]) -> Vec<usize> {
    reference_pairs(probe_keys, build_keys)
        .into_iter()
        .map(|(_, j)| j)
        .collect()
}
