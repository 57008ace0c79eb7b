// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Random number generation for the embedding engine.

A fixed seed makes initial positions and negative sampling reproducible;
without one the generator is seeded from OS entropy.
*/

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded generator when `seed` is given, entropy-seeded otherwise
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
