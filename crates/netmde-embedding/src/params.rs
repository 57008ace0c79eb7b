// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Parameters of one `step` call

use netmde_config::EmbeddingConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, EmbeddingResult};

/// Iteration budget and step sizes for [`MdeEngine::step`](crate::MdeEngine::step)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    /// Rounds to run
    pub n_iterations: usize,
    /// Scale of the neighbour attraction update
    pub attraction_step: f64,
    /// Scale of the global repulsion update (divided by `N`)
    pub repulsion_step: f64,
    /// Rounds of this call that include repulsion, counted from the first round
    pub max_repulsion_iterations: usize,
    /// Negative sampling step; 0 disables negative sampling
    pub negative_step: f64,
    /// Non-neighbours sampled per node and round, as a fraction of `N`
    pub negative_fraction: f64,
}

impl Default for StepParams {
    fn default() -> Self {
        Self::from(&EmbeddingConfig::default())
    }
}

impl From<&EmbeddingConfig> for StepParams {
    fn from(config: &EmbeddingConfig) -> Self {
        Self {
            n_iterations: config.n_iterations,
            attraction_step: config.attraction_step,
            repulsion_step: config.repulsion_step,
            max_repulsion_iterations: config.max_repulsion_iterations,
            negative_step: config.negative_step,
            negative_fraction: config.negative_fraction,
        }
    }
}

impl StepParams {
    /// Attraction only, no repulsion or negative sampling
    pub fn attraction_only(n_iterations: usize, attraction_step: f64) -> Self {
        Self {
            n_iterations,
            attraction_step,
            repulsion_step: 0.0,
            max_repulsion_iterations: 0,
            negative_step: 0.0,
            negative_fraction: 0.0,
        }
    }

    /// # Errors
    /// `InvalidParameter` for negative or non-finite steps, or a fraction outside `[0, 1]`.
    pub fn validate(&self) -> EmbeddingResult<()> {
        for (name, value) in [
            ("attraction_step", self.attraction_step),
            ("repulsion_step", self.repulsion_step),
            ("negative_step", self.negative_step),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EmbeddingError::InvalidParameter(format!(
                    "{} = {} must be finite and non-negative",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.negative_fraction) {
            return Err(EmbeddingError::InvalidParameter(format!(
                "negative_fraction = {} must be between 0 and 1",
                self.negative_fraction
            )));
        }
        Ok(())
    }
}
