// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end embedding tests on small canonical topologies.
//!
//! All runs are seeded, so every assertion is deterministic.

use ndarray::{arr2, Array2};
use netmde_embedding::{
    distance_matrix, distortion, link_activation, step_until, update_activations,
    ConvergenceCriterion, EmbeddingError, EngineState, MdeEngine, StepParams,
};
use netmde_graph::{LinkKind, Network, NodeId};
use proptest::prelude::*;

fn spread_then_refine(net: &mut Network, engine: &mut MdeEngine, repulsion_step: f64) -> f64 {
    let spread = StepParams {
        n_iterations: 3000,
        attraction_step: 0.1,
        repulsion_step,
        max_repulsion_iterations: 3000,
        negative_step: 0.0,
        negative_fraction: 0.0,
    };
    engine.step(net, &spread).unwrap();
    engine
        .step(net, &StepParams::attraction_only(3000, 0.1))
        .unwrap()
        .distortion
}

#[test]
fn test_square_cycle_converges() {
    let mut net = Network::ring(LinkKind::Undirected, 4, 0.8).unwrap();
    let mut engine = MdeEngine::new(Some(2024));
    engine.initialize(&mut net, 2).unwrap();

    let final_distortion = spread_then_refine(&mut net, &mut engine, 0.01);
    assert!(final_distortion < 1e-4, "distortion = {}", final_distortion);

    let distances = distance_matrix(&net).unwrap();
    let diagonal = 0.8 * 2f64.sqrt();
    for (a, b) in [(0, 2), (1, 3)] {
        assert!(
            (distances[[a, b]] - diagonal).abs() < 0.05,
            "diagonal ({}, {}) = {}",
            a,
            b,
            distances[[a, b]]
        );
    }
}

#[test]
fn test_unit_triangle_becomes_equilateral() {
    let mut net = Network::complete(LinkKind::Undirected, 3, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(3));
    engine.initialize(&mut net, 2).unwrap();

    let final_distortion = spread_then_refine(&mut net, &mut engine, 0.05);
    assert!(final_distortion < 1e-8);

    let distances = distance_matrix(&net).unwrap();
    for (a, b) in [(0, 1), (1, 2), (0, 2)] {
        assert!((distances[[a, b]] - 1.0).abs() < 1e-3);
    }
}

#[test]
fn test_triangle_in_three_dimensions() {
    let mut net = Network::complete(LinkKind::Undirected, 3, 0.5).unwrap();
    let mut engine = MdeEngine::new(Some(5));
    engine.initialize(&mut net, 3).unwrap();

    let final_distortion = spread_then_refine(&mut net, &mut engine, 0.05);
    assert!(final_distortion < 1e-8);
    assert_eq!(net.positions().unwrap().dim(), (3, 3));
}

#[test]
fn test_star_leaves_do_not_collapse() {
    let mut net = Network::star(LinkKind::Undirected, 5, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(17));
    engine.initialize(&mut net, 2).unwrap();

    let params = StepParams {
        n_iterations: 1000,
        attraction_step: 0.1,
        repulsion_step: 0.05,
        max_repulsion_iterations: 1000,
        negative_step: 0.0,
        negative_fraction: 0.0,
    };
    let report = engine.step(&mut net, &params).unwrap();
    assert_eq!(report.repulsion_rounds, 1000);

    let distances = distance_matrix(&net).unwrap();
    let closest_leaves = (1..=5)
        .flat_map(|a| ((a + 1)..=5).map(move |b| (a, b)))
        .map(|(a, b)| distances[[a, b]])
        .fold(f64::INFINITY, f64::min);
    assert!(closest_leaves > 0.3, "closest leaves = {}", closest_leaves);
}

#[test]
fn test_embedding_is_recentred() {
    let mut net = Network::ring(LinkKind::Undirected, 6, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(8));
    engine.initialize(&mut net, 2).unwrap();
    engine.step(&mut net, &StepParams::default()).unwrap();

    let positions = net.positions().unwrap();
    let centroid = positions.mean_axis(ndarray::Axis(0)).unwrap();
    assert!(centroid.iter().all(|c| c.abs() < 1e-9));
}

#[test]
fn test_negative_sampling_keeps_embedding_finite() {
    let mut net = Network::ring(LinkKind::Undirected, 10, 0.5).unwrap();
    let mut engine = MdeEngine::new(Some(21));
    engine.initialize(&mut net, 2).unwrap();

    let params = StepParams {
        negative_step: 0.001,
        negative_fraction: 0.3,
        ..StepParams::default()
    };
    let report = engine.step(&mut net, &params).unwrap();

    assert!(report.distortion.is_finite());
    assert!(net.positions().unwrap().iter().all(|x| x.is_finite()));
}

#[test]
fn test_set_target_hot_swaps_lengths() {
    let mut net = Network::complete(LinkKind::Undirected, 3, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(4));
    engine.initialize(&mut net, 2).unwrap();
    spread_then_refine(&mut net, &mut engine, 0.05);

    for (a, b) in [(0, 1), (1, 2), (0, 2)] {
        net.set_link_length(NodeId(a), NodeId(b), 2.0).unwrap();
    }
    engine.set_target(&net).unwrap();
    let report = engine
        .step(&mut net, &StepParams::attraction_only(3000, 0.1))
        .unwrap();

    assert!(report.distortion < 1e-8);
    assert!((distance_matrix(&net).unwrap()[[0, 2]] - 2.0).abs() < 1e-3);
}

#[test]
fn test_set_target_rejects_new_links() {
    let mut net = Network::ring(LinkKind::Undirected, 4, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(4));
    engine.initialize(&mut net, 2).unwrap();

    net.connect(NodeId(0), NodeId(2), 1.0).unwrap();
    assert_eq!(
        engine.set_target(&net),
        Err(EmbeddingError::UnknownLink { i: 0, j: 2 })
    );
}

#[test]
fn test_step_rejects_links_added_after_initialize() {
    let mut net = Network::ring(LinkKind::Undirected, 4, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(4));
    engine.initialize(&mut net, 2).unwrap();

    net.connect(NodeId(0), NodeId(2), 0.2).unwrap();
    assert_eq!(
        engine.step(&mut net, &StepParams::attraction_only(10, 0.1)),
        Err(EmbeddingError::LinksChanged {
            expected: 4,
            actual: 5
        })
    );

    // Re-initializing picks the new link up
    engine.initialize(&mut net, 2).unwrap();
    assert!(engine
        .step(&mut net, &StepParams::attraction_only(10, 0.1))
        .is_ok());
}

#[test]
fn test_step_until_settles() {
    let mut net = Network::complete(LinkKind::Undirected, 3, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(6));
    engine.initialize(&mut net, 2).unwrap();

    let mut criterion = ConvergenceCriterion::new(1e-12, 2);
    let (last, converged) = step_until(
        &mut engine,
        &mut net,
        &StepParams::attraction_only(500, 0.1),
        &mut criterion,
        50,
    )
    .unwrap();

    assert!(converged);
    assert!(last.unwrap().distortion < 1e-10);
    assert_eq!(engine.state(), EngineState::Stable);
}

#[test]
fn test_activations_after_embedding() {
    let mut net = Network::complete(LinkKind::Undirected, 3, 1.0).unwrap();
    let mut engine = MdeEngine::new(Some(9));
    engine.initialize(&mut net, 2).unwrap();
    spread_then_refine(&mut net, &mut engine, 0.05);

    update_activations(&mut net).unwrap();
    assert!(net.activations().iter().all(|a| a.abs() < 1e-3));
}

fn placed_network(n: usize, edges: &[(u32, u32, f64)], positions: &Array2<f64>) -> Network {
    let mut net = Network::undirected();
    net.add_nodes(n);
    for &(a, b, d) in edges {
        net.connect(NodeId(a), NodeId(b), d).unwrap();
    }
    net.write_positions(positions).unwrap();
    net
}

#[test]
fn test_distortion_is_zero_only_when_exact() {
    let square = arr2(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    let edges = [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)];
    assert_eq!(distortion(&placed_network(4, &edges, &square)).unwrap(), 0.0);

    let stretched = [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 0.5)];
    assert!(distortion(&placed_network(4, &stretched, &square)).unwrap() > 0.0);
}

proptest! {
    #[test]
    fn prop_distortion_non_negative(
        coords in prop::collection::vec(-10.0f64..10.0, 8),
        lengths in prop::collection::vec(0.01f64..5.0, 3),
    ) {
        let positions = Array2::from_shape_vec((4, 2), coords).unwrap();
        let edges = [(0, 1, lengths[0]), (1, 2, lengths[1]), (2, 3, lengths[2])];
        let net = placed_network(4, &edges, &positions);
        prop_assert!(distortion(&net).unwrap() >= 0.0);
    }

    #[test]
    fn prop_activation_bounded_with_matching_sign(
        actual in 0.0f64..100.0,
        target in 0.01f64..100.0,
    ) {
        let activation = link_activation(actual, target);
        prop_assert!((-1.0..=1.0).contains(&activation));
        if actual > target {
            prop_assert!(activation >= 0.0);
        } else if actual < target {
            prop_assert!(activation <= 0.0);
        } else {
            prop_assert_eq!(activation, 0.0);
        }
    }
}
