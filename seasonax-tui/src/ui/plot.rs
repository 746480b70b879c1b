//! Mapping between terminal cells and plotted points, and text bar glyphs.

use ratatui::layout::{Position, Rect};

use seasonax_core::derive::{LabeledPoint, RiseDropBar};

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    area.contains(Position::new(column, row))
}

/// Index of the plotted point nearest to terminal column `column` when
/// `count` points span `[0, count - 1]` across the width of `plot`.
pub fn index_at_column(count: usize, plot: Rect, column: u16) -> Option<usize> {
    if count == 0 || plot.width == 0 {
        return None;
    }
    if count == 1 || plot.width == 1 {
        return Some(0);
    }
    let offset = column.clamp(plot.left(), plot.right() - 1) - plot.left();
    let frac = f64::from(offset) / f64::from(plot.width - 1);
    let idx = (frac * (count - 1) as f64).round() as usize;
    Some(idx.min(count - 1))
}

/// Calendar label under `column`.
pub fn label_at_column(points: &[LabeledPoint], plot: Rect, column: u16) -> Option<&str> {
    index_at_column(points.len(), plot, column).map(|i| points[i].label.as_str())
}

/// Min and max of `values` padded by 5%, never a zero-height span.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((hi - lo).abs() * 0.05).max(0.5);
    [lo - pad, hi + pad]
}

/// Left and right halves of a bar centred on zero, `half_width` cells each.
/// Negative values grow leftwards.
pub fn signed_bar(value: f64, max_abs: f64, half_width: usize) -> (String, String) {
    let cells = if max_abs > 0.0 && value.is_finite() {
        ((value.abs() / max_abs) * half_width as f64).round() as usize
    } else {
        0
    }
    .min(half_width);
    let blank = " ".repeat(half_width - cells);
    let fill = "█".repeat(cells);
    if value < 0.0 {
        (format!("{blank}{fill}"), " ".repeat(half_width))
    } else {
        (" ".repeat(half_width), format!("{fill}{blank}"))
    }
}

/// Cell counts for a stacked rise/drop bar centred on zero. `loss` and
/// `drop` sit left of the axis (body nearest), `gain` and `rise` right of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackedCells {
    pub drop: usize,
    pub loss: usize,
    pub gain: usize,
    pub rise: usize,
}

pub fn stacked_cells(bar: &RiseDropBar, max_abs: f64, half_width: usize) -> StackedCells {
    let scale = |v: f64| -> usize {
        let cells = if max_abs > 0.0 && v.is_finite() {
            ((v.abs() / max_abs) * half_width as f64).round() as usize
        } else {
            0
        };
        cells.min(half_width)
    };
    // scale the outer edges, then carve the body out of them
    let left = scale(bar.bottom());
    let right = scale(bar.top());
    let loss = scale(bar.body.min(0.0)).min(left);
    let gain = scale(bar.body.max(0.0)).min(right);
    StackedCells {
        drop: left - loss,
        loss,
        gain,
        rise: right - gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<LabeledPoint> {
        (0..n)
            .map(|i| LabeledPoint {
                label: format!("p{i}"),
                value: i as f64,
            })
            .collect()
    }

    #[test]
    fn edges_map_to_first_and_last_point() {
        let plot = Rect::new(10, 5, 101, 10);
        assert_eq!(index_at_column(366, plot, 10), Some(0));
        assert_eq!(index_at_column(366, plot, 110), Some(365));
        assert_eq!(index_at_column(366, plot, 60), Some(183));
    }

    #[test]
    fn columns_outside_are_clamped() {
        let plot = Rect::new(10, 5, 50, 10);
        assert_eq!(index_at_column(20, plot, 0), Some(0));
        assert_eq!(index_at_column(20, plot, 200), Some(19));
    }

    #[test]
    fn nothing_to_pick_from_empty_series() {
        assert_eq!(index_at_column(0, Rect::new(0, 0, 10, 10), 3), None);
        assert_eq!(label_at_column(&[], Rect::new(0, 0, 10, 10), 3), None);
    }

    #[test]
    fn label_lookup_uses_point_order() {
        let pts = points(3);
        let plot = Rect::new(0, 0, 21, 5);
        assert_eq!(label_at_column(&pts, plot, 0), Some("p0"));
        assert_eq!(label_at_column(&pts, plot, 10), Some("p1"));
        assert_eq!(label_at_column(&pts, plot, 20), Some("p2"));
    }

    #[test]
    fn contains_excludes_right_and_bottom_edges() {
        let r = Rect::new(2, 2, 4, 4);
        assert!(contains(r, 2, 2));
        assert!(contains(r, 5, 5));
        assert!(!contains(r, 6, 3));
        assert!(!contains(r, 3, 6));
    }

    #[test]
    fn bounds_of_flat_or_empty_series() {
        assert_eq!(padded_bounds([]), [0.0, 1.0]);
        assert_eq!(padded_bounds([2.0, 2.0]), [1.5, 2.5]);
        assert_eq!(padded_bounds([f64::NAN]), [0.0, 1.0]);
    }

    #[test]
    fn bars_grow_away_from_zero() {
        assert_eq!(signed_bar(5.0, 10.0, 4), ("    ".into(), "██  ".into()));
        assert_eq!(signed_bar(-10.0, 10.0, 4), ("████".into(), "    ".into()));
        assert_eq!(signed_bar(0.0, 0.0, 2), ("  ".into(), "  ".into()));
        assert_eq!(signed_bar(f64::NAN, 1.0, 2), ("  ".into(), "  ".into()));
    }

    #[test]
    fn stacked_bar_puts_extensions_outside_the_body() {
        use seasonax_core::derive::decompose_rise_drop;

        // winning year: body right, rise beyond it, drop from zero leftwards
        let win = decompose_rise_drop(5.0, 8.0, -3.0);
        assert_eq!(
            stacked_cells(&win, 8.0, 8),
            StackedCells { drop: 3, loss: 0, gain: 5, rise: 3 }
        );

        // losing year: body left, drop beyond it, rise from zero rightwards
        let loss = decompose_rise_drop(-4.0, 2.0, -6.0);
        assert_eq!(
            stacked_cells(&loss, 6.0, 6),
            StackedCells { drop: 2, loss: 4, gain: 0, rise: 2 }
        );

        // never wider than the half it lives in
        let c = stacked_cells(&win, 1.0, 4);
        assert!(c.gain + c.rise <= 4 && c.loss + c.drop <= 4);
        assert_eq!(stacked_cells(&win, 0.0, 4), StackedCells::default());
    }
}
