use crate::animation::{Animatable, FrameTime};
use crate::parameter::TableShapeParameter;
use crate::render::{effective_style, ResolvedCellStyle, TableFrame};
use crate::types::TableCell;

/// Table-wide scalars of one frame.
pub type ScalarSnapshot = TableFrame;

/// Boundaries, texts and cell contents of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSnapshot {
    pub row_boundaries: Vec<f64>,
    pub column_boundaries: Vec<f64>,
    /// Row-major cell texts.
    pub texts: Vec<String>,
    pub cells: Vec<Vec<TableCell>>,
    /// Row-major effective styles resolved at the frame.
    pub styles: Vec<ResolvedCellStyle>,
    pub generation: u64,
}

impl SequenceSnapshot {
    pub fn capture(param: &TableShapeParameter, time: &FrameTime) -> Self {
        let model = &param.table_model;
        Self {
            row_boundaries: model.row_boundaries().iter().map(|b| b.value_at(time)).collect(),
            column_boundaries: model
                .column_boundaries()
                .iter()
                .map(|b| b.value_at(time))
                .collect(),
            texts: model.iter().map(|c| c.text.clone()).collect(),
            cells: model.grid().to_vec(),
            styles: model
                .iter()
                .map(|c| effective_style(c, &param.cell_style).resolve(time))
                .collect(),
            generation: model.generation(),
        }
    }
}

/// Everything that decides the pixels of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub scalar: ScalarSnapshot,
    pub sequence: SequenceSnapshot,
}

impl RenderSnapshot {
    pub fn capture(param: &TableShapeParameter, time: &FrameTime) -> Self {
        Self {
            scalar: TableFrame::resolve(param, time),
            sequence: SequenceSnapshot::capture(param, time),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use crate::color::Rgba;

    #[test]
    fn test_equal_inputs_equal_snapshots() {
        let param = TableShapeParameter::with_grid(2, 3);
        let time = FrameTime::new(0, 10, 30);
        assert_eq!(
            RenderSnapshot::capture(&param, &time),
            RenderSnapshot::capture(&param, &time)
        );
    }

    #[test]
    fn test_text_change_changes_sequence() {
        let mut param = TableShapeParameter::with_grid(2, 2);
        let time = FrameTime::default();
        let before = RenderSnapshot::capture(&param, &time);
        param.table_model.set_text(1, 1, "new");
        let after = RenderSnapshot::capture(&param, &time);
        assert_eq!(before.scalar, after.scalar);
        assert_ne!(before.sequence, after.sequence);
        assert_eq!(after.sequence.texts[3], "new");
    }

    #[test]
    fn test_colour_change_changes_scalar() {
        let mut param = TableShapeParameter::default();
        let time = FrameTime::default();
        let before = RenderSnapshot::capture(&param, &time);
        param.border_color = Rgba::rgb(1, 2, 3);
        assert_ne!(before.scalar, RenderSnapshot::capture(&param, &time).scalar);
    }

    #[test]
    fn test_animated_default_style_changes_per_frame() {
        let mut param = TableShapeParameter::default();
        param.cell_style.font_size = Animation::keyframes(vec![10.0, 40.0], 1.0, 1000.0);
        let a = SequenceSnapshot::capture(&param, &FrameTime::new(0, 10, 30));
        let b = SequenceSnapshot::capture(&param, &FrameTime::new(9, 10, 30));
        assert_ne!(a.styles, b.styles);
    }
}
