//! Label placement behavior: scaling, colors and collision handling.

use vellum_core::font::{Helvetica, TextMeasure};
use vellum_core::placement::{LabelKind, LabelPlacer, MARKER_TEXT, PlacementState};
use vellum_core::text::WordDiff;
use vellum_core::utils::{BLACK, GREEN, RED};

/// Eight units per character at every font size.
struct Mono;

impl TextMeasure for Mono {
    fn measure_text_width(&self, text: &str, _font_size: f64) -> f64 {
        text.chars().count() as f64 * 8.0
    }
}

// ============================================================================
// Collisions
// ============================================================================

#[test]
fn test_overlapping_labels_get_marker() {
    let placer = LabelPlacer::new(&Mono, 8.0, 1.0);
    let labels = placer.place(&[
        WordDiff::added("hello", (50.0, 100.0, 80.0, 110.0)),
        WordDiff::removed("world", (60.0, 100.0, 90.0, 110.0)),
    ]);

    assert_eq!(labels.len(), 3);

    assert_eq!(labels[0].text, "hello");
    assert_eq!(labels[0].rect, (50.0, 92.0, 90.0, 116.0));

    assert_eq!(labels[1].text, MARKER_TEXT);
    assert_eq!(labels[1].kind, LabelKind::Marker);
    assert_eq!(labels[1].color, BLACK);
    assert_eq!(labels[1].rect, (90.0, 92.0, 106.0, 116.0));

    // 90 + marker (16) + space (8)
    assert_eq!(labels[2].text, "world");
    assert_eq!(labels[2].rect.0, 114.0);
    assert_eq!(labels[2].rect.2, 154.0);
}

#[test]
fn test_chain_of_collisions_keeps_moving_right() {
    let placer = LabelPlacer::new(&Mono, 8.0, 1.0);
    let diffs: Vec<WordDiff> = ["aa", "bb", "cc"]
        .iter()
        .map(|t| WordDiff::added(*t, (10.0, 40.0, 20.0, 50.0)))
        .collect();
    let labels = placer.place(&diffs);

    let words: Vec<_> = labels
        .iter()
        .filter(|l| l.kind != LabelKind::Marker)
        .map(|l| l.rect.0)
        .collect();
    // aa: 10..26, bb: 26+16+8 = 50..66, cc: 66+16+8 = 90
    assert_eq!(words, vec![10.0, 50.0, 90.0]);
    assert_eq!(labels.iter().filter(|l| l.kind == LabelKind::Marker).count(), 2);
}

#[test]
fn test_different_lines_never_collide() {
    let placer = LabelPlacer::new(&Mono, 8.0, 1.0);
    let labels = placer.place(&[
        WordDiff::added("first", (10.0, 100.0, 50.0, 110.0)),
        WordDiff::added("second", (10.0, 100.5, 50.0, 110.5)),
    ]);
    assert_eq!(labels.len(), 2);
    assert!(labels.iter().all(|l| l.rect.0 == 10.0));
}

#[test]
fn test_state_is_shared_across_calls() {
    let placer = LabelPlacer::new(&Mono, 8.0, 1.0);
    let mut state = PlacementState::new();
    placer.place_with_state(&[WordDiff::added("abc", (0.0, 10.0, 1.0, 11.0))], &mut state);
    assert_eq!(state.last_x(10.0), Some(24.0));

    let labels =
        placer.place_with_state(&[WordDiff::added("d", (5.0, 10.0, 6.0, 11.0))], &mut state);
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[1].rect.0, 24.0 + 16.0 + 8.0);
}

// ============================================================================
// Colors and scaling
// ============================================================================

#[test]
fn test_color_follows_change_type() {
    let placer = LabelPlacer::new(&Mono, 8.0, 1.0);
    let labels = placer.place(&[
        WordDiff::added("new", (0.0, 0.0, 1.0, 1.0)),
        WordDiff::removed("old", (0.0, 50.0, 1.0, 51.0)),
    ]);
    assert_eq!(labels[0].color, GREEN);
    assert_eq!(labels[0].kind, LabelKind::Added);
    assert_eq!(labels[1].color, RED);
    assert_eq!(labels[1].kind, LabelKind::Removed);
}

#[test]
fn test_scaling_is_linear_in_quality() {
    let (bx, by) = (37.5, 412.25);
    for quality in [0.5, 1.0, 2.0, 3.0] {
        let placer = LabelPlacer::new(&Mono, 8.0, quality);
        let labels = placer.place(&[WordDiff::removed("word", (bx, by, bx + 20.0, by + 9.0))]);
        assert_eq!(labels.len(), 1);
        let rect = labels[0].rect;
        assert_eq!(rect.0, bx * quality);
        assert_eq!(rect.1, by * quality - 8.0 * quality);
        assert_eq!(labels[0].font_size, 8.0 * quality);
    }
}

#[test]
fn test_helvetica_measure_drives_width() {
    let placer = LabelPlacer::new(&Helvetica, 8.0, 2.0);
    let labels = placer.place(&[WordDiff::added("Total", (10.0, 10.0, 30.0, 18.0))]);
    let expected = Helvetica.measure_text_width("Total", 16.0);
    assert!((labels[0].rect.2 - labels[0].rect.0 - expected).abs() < 1e-9);
}

// ============================================================================
// Degenerate input and determinism
// ============================================================================

#[test]
fn test_empty_word_is_dropped_without_committing() {
    let placer = LabelPlacer::new(&Mono, 8.0, 1.0);
    let mut state = PlacementState::new();
    let labels = placer.place_with_state(
        &[
            WordDiff::added("", (10.0, 20.0, 10.0, 30.0)),
            WordDiff::added("next", (10.0, 20.0, 40.0, 30.0)),
        ],
        &mut state,
    );
    // The dropped label leaves no trace, so "next" is not pushed right.
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "next");
    assert_eq!(labels[0].rect.0, 10.0);
}

#[test]
fn test_infinite_position_is_dropped() {
    let placer = LabelPlacer::new(&Mono, 8.0, 1.0);
    let labels = placer.place(&[
        WordDiff::added("inf", (f64::INFINITY, 20.0, 10.0, 30.0)),
        WordDiff::added("ok", (0.0, 20.0, 10.0, 30.0)),
    ]);
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "ok");
}

#[test]
fn test_placement_is_deterministic() {
    let diffs = vec![
        WordDiff::added("alpha", (10.0, 10.0, 40.0, 20.0)),
        WordDiff::removed("beta", (12.0, 10.0, 40.0, 20.0)),
        WordDiff::added("gamma", (300.0, 60.0, 340.0, 70.0)),
    ];
    let placer = LabelPlacer::new(&Helvetica, 8.0, 2.0);
    assert_eq!(placer.place(&diffs), placer.place(&diffs));
}
