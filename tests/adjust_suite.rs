use lineid_rs::{AdjustConfig, DecayTrigger, LineIdError, adjust_boxes};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn budget(max_iter: usize) -> AdjustConfig {
    AdjustConfig {
        max_iter,
        ..AdjustConfig::default()
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

const WAVES: [f64; 7] = [1242.80, 1260.42, 1264.74, 1265.00, 1265.2, 1265.3, 1265.35];

#[test]
fn settled_layout_is_a_fixpoint() {
    let widths = [0.6; 7];
    let first = adjust_boxes(&WAVES, &widths, 1240.9, 1269.6, &budget(10_000)).unwrap();
    assert!(!first.changed);
    assert_eq!(first.has_residual_overlap(&widths), Ok(false));

    let second =
        adjust_boxes(&first.positions, &widths, 1240.9, 1269.6, &budget(10_000)).unwrap();
    assert!(!second.changed);
    assert_eq!(second.positions, first.positions);
    // A single clean pass.
    assert_eq!(second.iterations, WAVES.len());
}

#[test]
fn isolated_lines_keep_their_wave() {
    let widths = [0.6; 7];
    let out = adjust_boxes(&WAVES, &widths, 1240.9, 1269.6, &budget(10_000)).unwrap();
    assert_eq!(out.positions[0], 1242.80);
    assert_eq!(out.positions[1], 1260.42);
    // The blend is spread out in order.
    assert!(out.positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn two_overlapping_labels_with_room() {
    let out = adjust_boxes(&[10.0, 10.5], &[1.0, 1.0], 0.0, 20.0, &budget(1000)).unwrap();
    assert!(out.positions[1] - out.positions[0] >= 1.0);
    assert!(out.positions[0] < 10.0);
    assert!(out.positions[1] > 10.5);
    assert!(out.iterations > 0);
    // The run moved labels but finished on a clean pass.
    assert!(!out.changed);
}

#[test]
fn only_index_neighbours_are_compared() {
    // Labels 0 and 2 sit on top of each other but are not index neighbours;
    // label 0 has room on both sides, so the first pass leaves it alone.
    let out =
        adjust_boxes(&[5.0, 10.0, 5.5], &[1.0, 1.0, 1.0], 0.0, 20.0, &budget(3)).unwrap();
    assert_eq!(out.positions[0], 5.0);
    assert!(approx(out.positions[1], 9.65));
    assert!(approx(out.positions[2], 5.85));
    assert!(out.changed);
    assert_eq!(out.iterations, 3);
}

#[test]
fn exhausted_budget_is_reported_not_raised() {
    let widths = [10.0; 4];
    let out = adjust_boxes(&[2.5; 4], &widths, 0.0, 5.0, &budget(8)).unwrap();
    assert_eq!(out.iterations, 8);
    assert!(out.changed);
    assert_eq!(out.has_residual_overlap(&widths), Ok(true));
    assert!(out.positions.iter().all(|x| (0.0..=5.0).contains(x)));
}

#[test]
fn tiny_budget_stops_after_one_pass() {
    let out = adjust_boxes(&[2.5, 2.5], &[10.0, 10.0], 0.0, 5.0, &budget(2)).unwrap();
    assert_eq!(out.iterations, 2);
    assert!(out.changed);

    // Passes are never cut short, so five labels overshoot a budget of two.
    let out = adjust_boxes(&[2.5; 5], &[10.0; 5], 0.0, 5.0, &budget(2)).unwrap();
    assert_eq!(out.iterations, 5);
}

#[test]
fn exact_threshold_decays_step_size() {
    // Threshold 4 * 0.5 = 2 falls right after the first pass over two labels.
    let decayed = AdjustConfig {
        max_iter: 4,
        fd_p: 0.5,
        ..AdjustConfig::default()
    };
    let out = adjust_boxes(&[50.0, 50.0], &[10.0, 10.0], 0.0, 100.0, &decayed).unwrap();
    // First pass: -3.5 / +3.5. Second pass steps are a third of that.
    assert!(approx(out.positions[0], 46.5 - 3.5 / 3.0));
    assert!(approx(out.positions[1], 53.5 + 3.5 / 3.0));
    assert!(out.changed);
}

#[test]
fn exact_threshold_is_skipped_off_stride() {
    // Threshold 2.5 is never hit by a stride of two, so no decay happens.
    let skipped = AdjustConfig {
        max_iter: 4,
        fd_p: 0.625,
        ..AdjustConfig::default()
    };
    let out = adjust_boxes(&[50.0, 50.0], &[10.0, 10.0], 0.0, 100.0, &skipped).unwrap();
    assert!(approx(out.positions[0], 43.0));
    assert!(approx(out.positions[1], 53.5));
}

#[test]
fn crossing_trigger_fires_off_stride() {
    let exact = AdjustConfig {
        max_iter: 4,
        fd_p: 0.45,
        ..AdjustConfig::default()
    };
    let crossing = AdjustConfig {
        decay: DecayTrigger::Crossing,
        ..exact.clone()
    };
    let anchors = [50.0, 50.0];
    let widths = [10.0, 10.0];

    let plain = adjust_boxes(&anchors, &widths, 0.0, 100.0, &exact).unwrap();
    assert!(approx(plain.positions[0], 43.0));

    let out = adjust_boxes(&anchors, &widths, 0.0, 100.0, &crossing).unwrap();
    assert!(approx(out.positions[0], 46.5 - 3.5 / 3.0));
    assert!(approx(out.positions[1], 53.5 + 3.5 / 3.0));
}

#[test]
fn input_errors_surface_before_relaxation() {
    assert_eq!(
        adjust_boxes(&[1.0, 2.0, 3.0], &[1.0, 1.0], 0.0, 5.0, &budget(10)).unwrap_err(),
        LineIdError::LengthMismatch {
            name: "widths",
            expected: 3,
            found: 2
        }
    );
    assert_eq!(
        adjust_boxes(&[1.0], &[1.0], 5.0, 0.0, &budget(10)).unwrap_err(),
        LineIdError::DegenerateBoundary {
            left: 5.0,
            right: 0.0
        }
    );
    assert!(matches!(
        adjust_boxes(&[1.0], &[1.0], 0.0, 5.0, &budget(0)),
        Err(LineIdError::InvalidParameter { name: "max_iter", .. })
    ));
}

proptest! {
    #[test]
    fn positions_stay_within_edges(
        anchors in proptest::collection::vec(-10.0f64..30.0, 1..12),
        width in 0.0f64..5.0,
        max_iter in 1usize..300,
    ) {
        let widths = vec![width; anchors.len()];
        let out = adjust_boxes(&anchors, &widths, 0.0, 20.0, &budget(max_iter)).unwrap();
        prop_assert_eq!(out.positions.len(), anchors.len());
        for x in &out.positions {
            prop_assert!((0.0..=20.0).contains(x), "position {} escaped the edges", x);
        }
    }

    #[test]
    fn iteration_count_is_bounded_by_whole_passes(
        anchors in proptest::collection::vec(0.0f64..20.0, 1..12),
        widths_seed in proptest::collection::vec(0.0f64..4.0, 12),
        max_iter in 1usize..300,
    ) {
        let widths = &widths_seed[..anchors.len()];
        let out = adjust_boxes(&anchors, widths, 0.0, 20.0, &budget(max_iter)).unwrap();
        let count = anchors.len();
        prop_assert_eq!(out.iterations % count, 0);
        prop_assert!(out.iterations < max_iter + count);
        if out.changed {
            prop_assert!(out.iterations >= max_iter);
        }
    }
}
