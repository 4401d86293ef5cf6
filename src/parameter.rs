//! Table-wide settings of one table shape.
//!
//! `TableShapeParameter` carries the animatable scalars (size, counts, border
//! widths), the colours, header mode, the table-wide cell style and the cell
//! model. It round-trips through camelCase JSON; any field left out takes
//! its default.

use serde::{Deserialize, Serialize};

use crate::animation::{Animatable, Animation, FrameTime};
use crate::color::Rgba;
use crate::error::{Result, TableError};
use crate::types::{CellStyle, ShowHeader, TableModel};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TableShapeParameter {
    pub width: Animation,
    pub height: Animation,
    pub row_count: Animation,
    pub column_count: Animation,
    pub border_width: Animation,
    /// 0 hides the outer border.
    pub outer_border_width: Animation,
    pub border_color: Rgba,
    pub outer_border_color: Rgba,
    pub background_color: Rgba,
    pub header_display: ShowHeader,
    pub header_row_background_color: Rgba,
    pub header_column_background_color: Rgba,
    /// Style used by every cell whose priority is `Inherit`.
    pub cell_style: CellStyle,
    pub table_model: TableModel,
}

impl Default for TableShapeParameter {
    fn default() -> Self {
        Self {
            width: Animation::new(500.0, 0.0, 10_000.0),
            height: Animation::new(300.0, 0.0, 10_000.0),
            row_count: Animation::new(1.0, 1.0, 100.0),
            column_count: Animation::new(1.0, 1.0, 100.0),
            border_width: Animation::new(1.0, 1.0, 100_000.0),
            outer_border_width: Animation::new(0.0, 0.0, 100_000.0),
            border_color: Rgba::BLACK,
            outer_border_color: Rgba::WHITE,
            background_color: Rgba::WHITE_SMOKE,
            header_display: ShowHeader::None,
            header_row_background_color: Rgba::LIGHT_GRAY,
            header_column_background_color: Rgba::LIGHT_GRAY,
            cell_style: CellStyle::default(),
            table_model: TableModel::new(1, 1),
        }
    }
}

/// Convert a resolved count to a grid dimension (at least 1).
pub fn count_from(value: f64) -> usize {
    if value.is_finite() && value >= 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = value as usize;
        count
    } else {
        1
    }
}

impl TableShapeParameter {
    /// Default parameters with a `rows` x `cols` grid.
    pub fn with_grid(rows: usize, cols: usize) -> Self {
        let mut param = Self::default();
        param.set_grid(rows, cols);
        param
    }

    /// Set constant row/column counts and resize the model to match.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_grid(&mut self, rows: usize, cols: usize) -> bool {
        self.row_count.set_value(rows as f64);
        self.column_count.set_value(cols as f64);
        let rows = count_from(self.row_count.value());
        let cols = count_from(self.column_count.value());
        self.table_model.resize(rows, cols)
    }

    /// Row and column counts at `time`, clamped to at least 1.
    pub fn grid_at(&self, time: &FrameTime) -> (usize, usize) {
        (
            count_from(self.row_count.value_at(time)),
            count_from(self.column_count.value_at(time)),
        )
    }

    /// Parse a JSON document and repair it into a consistent state.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut param: Self = serde_json::from_str(json)?;
        param.table_model.normalize();
        param.validate()?;
        let (rows, cols) = param.grid_at(&FrameTime::default());
        param.table_model.resize(rows, cols);
        Ok(param)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject inverted ranges and clamp stored keyframes into range.
    fn validate(&mut self) -> Result<()> {
        let fields: [(&str, &mut Animation); 6] = [
            ("width", &mut self.width),
            ("height", &mut self.height),
            ("rowCount", &mut self.row_count),
            ("columnCount", &mut self.column_count),
            ("borderWidth", &mut self.border_width),
            ("outerBorderWidth", &mut self.outer_border_width),
        ];
        for (name, anim) in fields {
            sanitize(name, anim)?;
        }
        sanitize_style("cellStyle", &mut self.cell_style)?;

        for (pos, cell) in self.table_model.cells_mut() {
            sanitize_style(&format!("cells[{}][{}]", pos.row, pos.col), &mut cell.style)?;
        }
        for (i, boundary) in self.table_model.boundaries_mut().enumerate() {
            sanitize(&format!("boundaries[{i}]"), boundary)?;
        }
        Ok(())
    }
}

fn sanitize(name: &str, anim: &mut Animation) -> Result<()> {
    if anim.min().is_nan() || anim.max().is_nan() || anim.min() > anim.max() {
        return Err(TableError::Config(format!(
            "{name}: min {} is greater than max {}",
            anim.min(),
            anim.max()
        )));
    }
    if anim.values().iter().any(|v| !v.is_finite()) {
        return Err(TableError::Config(format!("{name}: non-finite keyframe")));
    }
    let values = anim.values().to_vec();
    anim.set_keyframes(values);
    Ok(())
}

fn sanitize_style(name: &str, style: &mut CellStyle) -> Result<()> {
    sanitize(&format!("{name}.fontSize"), &mut style.font_size)?;
    sanitize(&format!("{name}.padding"), &mut style.padding)?;
    sanitize(&format!("{name}.lineHeightRate"), &mut style.line_height_rate)?;
    sanitize(&format!("{name}.outlineWidth"), &mut style.outline_width)
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

    #[test]
    fn test_defaults() {
        let p = TableShapeParameter::default();
        assert_eq!(p.width.value(), 500.0);
        assert_eq!(p.height.value(), 300.0);
        assert_eq!(p.border_width.value(), 1.0);
        assert_eq!(p.border_width.min(), 1.0);
        assert_eq!(p.outer_border_width.value(), 0.0);
        assert_eq!(p.background_color, Rgba::WHITE_SMOKE);
        assert_eq!(p.header_row_background_color, Rgba::LIGHT_GRAY);
        assert_eq!(p.table_model.rows(), 1);
    }

    #[test]
    fn test_count_from() {
        assert_eq!(count_from(2.9), 2);
        assert_eq!(count_from(0.0), 1);
        assert_eq!(count_from(-3.0), 1);
        assert_eq!(count_from(f64::NAN), 1);
    }

    #[test]
    fn test_partial_json_resizes_model() {
        let json = r##"{"rowCount":{"values":[3.0],"min":1.0,"max":100.0},"borderColor":"#FF0000"}"##;
        let p = TableShapeParameter::from_json_str(json).unwrap();
        assert_eq!(p.table_model.rows(), 3);
        assert_eq!(p.table_model.cols(), 1);
        assert_eq!(p.border_color, Rgba::rgb(255, 0, 0));
        assert_eq!(p.width.value(), 500.0);
    }

    #[test]
    fn test_out_of_range_keyframes_clamped() {
        let json = r#"{"borderWidth":{"values":[0.0, 5.0],"min":1.0,"max":100000.0}}"#;
        let p = TableShapeParameter::from_json_str(json).unwrap();
        assert_eq!(p.border_width.values(), &[1.0, 5.0]);
    }

    #[test]
    fn test_inverted_range_is_config_error() {
        let json = r#"{"width":{"values":[1.0],"min":10.0,"max":0.0}}"#;
        let err = TableShapeParameter::from_json_str(json).unwrap_err();
        assert!(matches!(err, TableError::Config(_)));
    }

    #[test]
    fn test_bad_json_is_json_error() {
        let err = TableShapeParameter::from_json_str("{").unwrap_err();
        assert!(matches!(err, TableError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut p = TableShapeParameter::with_grid(2, 2);
        p.table_model.set_text(1, 0, "hello");
        let json = p.to_json_string().unwrap();
        let back = TableShapeParameter::from_json_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
