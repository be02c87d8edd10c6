//! Label placement for word-level changes.
//!
//! Each changed word becomes a colored label at its scaled on-page position.
//! Labels that would run into the previous label on the same line are pushed
//! right, behind a black `" >"` marker, so every label stays readable.
//!
//! Lines are identified by the exact scaled y-coordinate of the word. Words
//! whose y differs by a fraction of a unit are treated as different lines and
//! are never collision-checked against each other.

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::font::TextMeasure;
use crate::text::{ChangeType, WordDiff};
use crate::utils::{BLACK, Color, GREEN, RED, Rect, rect_is_drawable};

/// Text of the marker inserted between colliding labels.
pub const MARKER_TEXT: &str = " >";

/// What a label stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Added,
    Removed,
    /// Overlap marker preceding a label that was pushed right.
    Marker,
}

impl LabelKind {
    pub fn color(self) -> Color {
        match self {
            LabelKind::Added => GREEN,
            LabelKind::Removed => RED,
            LabelKind::Marker => BLACK,
        }
    }
}

impl From<ChangeType> for LabelKind {
    fn from(change: ChangeType) -> Self {
        match change {
            ChangeType::Added => LabelKind::Added,
            ChangeType::Removed => LabelKind::Removed,
        }
    }
}

/// A resolved label, in scaled page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCommand {
    pub text: String,
    pub kind: LabelKind,
    pub color: Color,
    pub rect: Rect,
    pub font_size: f64,
}

/// Rightmost occupied x-extent per line for one page's label pass.
#[derive(Debug, Clone, Default)]
pub struct PlacementState {
    lines: FxHashMap<OrderedFloat<f64>, f64>,
}

impl PlacementState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rightmost committed x on the line at `y`, if any label was placed there.
    pub fn last_x(&self, y: f64) -> Option<f64> {
        self.lines.get(&OrderedFloat(y)).copied()
    }

    /// Records that a label on line `y` now ends at `right`.
    ///
    /// The stored extent never moves left.
    pub fn commit(&mut self, y: f64, right: f64) {
        self.lines
            .entry(OrderedFloat(y))
            .and_modify(|x| *x = x.max(right))
            .or_insert(right);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Turns a page's word diffs into non-overlapping label commands.
pub struct LabelPlacer<'a, M: TextMeasure + ?Sized> {
    measure: &'a M,
    quality: f64,
    font_size: f64,
    space_width: f64,
    marker_width: f64,
}

impl<'a, M: TextMeasure + ?Sized> LabelPlacer<'a, M> {
    /// Creates a placer for labels of `font_size` (in unscaled units) on a
    /// page rendered at `quality`.
    pub fn new(measure: &'a M, font_size: f64, quality: f64) -> Self {
        let font_size = font_size * quality;
        Self {
            measure,
            quality,
            font_size,
            space_width: measure.measure_text_width(" ", font_size),
            marker_width: measure.measure_text_width(MARKER_TEXT, font_size),
        }
    }

    /// Scaled font size used for measurement and drawing.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Places every diff with a fresh placement state.
    pub fn place(&self, diffs: &[WordDiff]) -> Vec<LabelCommand> {
        let mut state = PlacementState::new();
        self.place_with_state(diffs, &mut state)
    }

    /// Places diffs in input order against an explicit placement state.
    ///
    /// Order matters: the first label on a line keeps its position and later
    /// colliding labels are pushed right.
    pub fn place_with_state(
        &self,
        diffs: &[WordDiff],
        state: &mut PlacementState,
    ) -> Vec<LabelCommand> {
        let mut commands = Vec::with_capacity(diffs.len());
        for diff in diffs {
            self.place_one(diff, state, &mut commands);
        }
        commands
    }

    fn place_one(
        &self,
        diff: &WordDiff,
        state: &mut PlacementState,
        out: &mut Vec<LabelCommand>,
    ) {
        let fs = self.font_size;
        let kind = LabelKind::from(diff.change);
        let text_width = self.measure.measure_text_width(&diff.text, fs);

        let mut x = diff.bbox.0 * self.quality;
        let y = diff.bbox.1 * self.quality;

        if let Some(last_x) = state.last_x(y)
            && last_x + self.space_width > x
        {
            let marker_rect = (last_x, y - fs, last_x + self.marker_width, y + fs * 2.0);
            if rect_is_drawable(marker_rect) {
                out.push(self.command(MARKER_TEXT, LabelKind::Marker, marker_rect));
            }
            x = last_x + self.marker_width + self.space_width;
        }

        let rect = (x, y - fs, x + text_width, y + fs * 2.0);
        if !rect_is_drawable(rect) {
            return;
        }
        out.push(self.command(&diff.text, kind, rect));
        state.commit(y, x + text_width);
    }

    fn command(&self, text: &str, kind: LabelKind, rect: Rect) -> LabelCommand {
        LabelCommand {
            text: text.to_string(),
            kind,
            color: kind.color(),
            rect,
            font_size: self.font_size,
        }
    }
}
