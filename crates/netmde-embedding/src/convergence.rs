// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Caller-side stopping rule on top of fixed-budget steps.

use netmde_graph::Network;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{MdeEngine, StepReport};
use crate::error::EmbeddingResult;
use crate::kernel::EmbeddingKernel;
use crate::params::StepParams;

/// Stop once distortion changes by less than `tolerance` for `patience`
/// consecutive observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceCriterion {
    pub tolerance: f64,
    pub patience: usize,
    #[serde(skip)]
    previous: Option<f64>,
    #[serde(skip)]
    quiet: usize,
}

impl ConvergenceCriterion {
    pub fn new(tolerance: f64, patience: usize) -> Self {
        Self {
            tolerance,
            patience: patience.max(1),
            previous: None,
            quiet: 0,
        }
    }

    /// Record a distortion value; true once the criterion is met
    pub fn observe(&mut self, distortion: f64) -> bool {
        if let Some(previous) = self.previous {
            if (previous - distortion).abs() < self.tolerance {
                self.quiet += 1;
            } else {
                self.quiet = 0;
            }
        }
        self.previous = Some(distortion);
        self.quiet >= self.patience
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.quiet = 0;
    }
}

impl Default for ConvergenceCriterion {
    fn default() -> Self {
        Self::new(1e-9, 3)
    }
}

/// Step until `criterion` is met or `max_steps` calls have run
///
/// Settles the engine when the criterion is met. Returns the report of the
/// last step and whether the criterion was met.
pub fn step_until<K: EmbeddingKernel>(
    engine: &mut MdeEngine<K>,
    network: &mut Network,
    params: &StepParams,
    criterion: &mut ConvergenceCriterion,
    max_steps: usize,
) -> EmbeddingResult<(Option<StepReport>, bool)> {
    let mut last = None;
    for call in 0..max_steps {
        let report = engine.step(network, params)?;
        last = Some(report);
        if criterion.observe(report.distortion) {
            engine.settle()?;
            info!(
                "distortion settled at {:.3e} after {} steps",
                report.distortion,
                call + 1
            );
            return Ok((last, true));
        }
    }
    Ok((last, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patience() {
        let mut criterion = ConvergenceCriterion::new(0.01, 2);
        assert!(!criterion.observe(1.0));
        assert!(!criterion.observe(0.5));
        assert!(!criterion.observe(0.499));
        assert!(criterion.observe(0.498));

        criterion.reset();
        assert!(!criterion.observe(0.498));
    }

    #[test]
    fn test_jump_resets_count() {
        let mut criterion = ConvergenceCriterion::new(0.01, 2);
        criterion.observe(1.0);
        criterion.observe(1.0);
        criterion.observe(2.0);
        assert!(!criterion.observe(2.0));
        assert!(criterion.observe(2.0));
    }
}
