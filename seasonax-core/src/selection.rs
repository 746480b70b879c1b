//! Pointer-drag selection of a pattern window on the seasonality chart.
//!
//! The chart reports the x-axis label under the pointer. A drag from one
//! label to another becomes a normalized `DateRange` that is committed to a
//! [`RangeSink`] when the pointer is released or leaves the chart.

use crate::domain::{normalize_label, DateRange, MonthDay};
use crate::state::RangeSink;

/// In-progress drag. Labels are kept as reported by the chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionGesture {
    pub active: bool,
    pub anchor: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    Down(String),
    Move(String),
    Up,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// No gesture was active; the event was ignored.
    Ignored,
    /// Gesture started or extended; nothing committed yet.
    Tracking,
    Committed(DateRange),
    /// Released without dragging.
    Cancelled,
    /// A label could not be read as a calendar day. The previous range stays.
    Aborted { label: String },
}

#[derive(Debug, Default)]
pub struct DateRangeSelector {
    gesture: SelectionGesture,
}

impl DateRangeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &SelectionGesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture.active
    }

    /// Starts a new gesture, replacing any unfinished one.
    pub fn pointer_down(&mut self, label: &str) -> SelectionOutcome {
        self.gesture = SelectionGesture {
            active: true,
            anchor: Some(label.to_string()),
            cursor: None,
        };
        SelectionOutcome::Tracking
    }

    pub fn pointer_move(&mut self, label: &str) -> SelectionOutcome {
        if !self.gesture.active {
            return SelectionOutcome::Ignored;
        }
        self.gesture.cursor = Some(label.to_string());
        SelectionOutcome::Tracking
    }

    pub fn pointer_up<S: RangeSink + ?Sized>(&mut self, sink: &mut S) -> SelectionOutcome {
        self.finish(sink)
    }

    /// Leaving the chart mid-drag commits like a release.
    pub fn pointer_leave<S: RangeSink + ?Sized>(&mut self, sink: &mut S) -> SelectionOutcome {
        self.finish(sink)
    }

    pub fn handle<S: RangeSink + ?Sized>(
        &mut self,
        event: PointerEvent,
        sink: &mut S,
    ) -> SelectionOutcome {
        match event {
            PointerEvent::Down(label) => self.pointer_down(&label),
            PointerEvent::Move(label) => self.pointer_move(&label),
            PointerEvent::Up => self.pointer_up(sink),
            PointerEvent::Leave => self.pointer_leave(sink),
        }
    }

    /// Ordered `(start, end)` labels of the band to shade while dragging.
    /// Unparseable labels are returned as-is, unordered.
    pub fn preview(&self) -> Option<(String, String)> {
        if !self.gesture.active {
            return None;
        }
        let anchor = self.gesture.anchor.as_deref()?;
        let cursor = self.gesture.cursor.as_deref()?;
        match resolve_range(anchor, cursor) {
            Ok(range) => Some((range.start.to_string(), range.end.to_string())),
            Err(_) => Some((normalize_label(anchor), normalize_label(cursor))),
        }
    }

    fn finish<S: RangeSink + ?Sized>(&mut self, sink: &mut S) -> SelectionOutcome {
        let gesture = std::mem::take(&mut self.gesture);
        if !gesture.active {
            return SelectionOutcome::Ignored;
        }

        let (Some(anchor), Some(cursor)) = (gesture.anchor, gesture.cursor) else {
            return SelectionOutcome::Cancelled;
        };

        match resolve_range(&anchor, &cursor) {
            Ok(range) => {
                sink.set_date_range(range.start, range.end);
                tracing::info!(range = %range, "date range selected");
                SelectionOutcome::Committed(range)
            }
            Err(label) => {
                tracing::warn!(%label, "selection aborted: unreadable chart label");
                SelectionOutcome::Aborted { label }
            }
        }
    }
}

/// Normalize both labels and order them by day of year. On failure returns
/// the offending label.
pub fn resolve_range(anchor: &str, cursor: &str) -> Result<DateRange, String> {
    let parse = |label: &str| MonthDay::parse(&normalize_label(label)).map_err(|_| label.to_string());
    let start = parse(anchor)?;
    let end = parse(cursor)?;
    Ok(DateRange::new(start, end).normalized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(MonthDay, MonthDay)>);

    impl RangeSink for Recorder {
        fn set_date_range(&mut self, start: MonthDay, end: MonthDay) {
            self.0.push((start, end));
        }
    }

    fn labels(r: &Recorder) -> Vec<(String, String)> {
        r.0.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn backwards_drag_commits_ordered_range() {
        let mut sel = DateRangeSelector::new();
        let mut sink = Recorder::default();
        sel.pointer_down("07-15");
        sel.pointer_move("05-01");
        sel.pointer_move("03-02");
        let out = sel.pointer_up(&mut sink);
        assert!(matches!(out, SelectionOutcome::Committed(_)));
        assert_eq!(labels(&sink), vec![("03-02".into(), "07-15".into())]);
        assert!(!sel.is_active());
        assert_eq!(sel.gesture(), &SelectionGesture::default());
    }

    #[test]
    fn same_label_commits_single_day() {
        let mut sel = DateRangeSelector::new();
        let mut sink = Recorder::default();
        sel.pointer_down("06-01");
        sel.pointer_move("06-01");
        sel.pointer_up(&mut sink);
        assert_eq!(labels(&sink), vec![("06-01".into(), "06-01".into())]);
    }

    #[test]
    fn click_without_drag_commits_nothing() {
        let mut sel = DateRangeSelector::new();
        let mut sink = Recorder::default();
        sel.pointer_down("06-01");
        assert_eq!(sel.pointer_up(&mut sink), SelectionOutcome::Cancelled);
        assert!(sink.0.is_empty());
        assert!(!sel.is_active());
    }

    #[test]
    fn events_without_gesture_are_ignored() {
        let mut sel = DateRangeSelector::new();
        let mut sink = Recorder::default();
        assert_eq!(sel.pointer_move("01-10"), SelectionOutcome::Ignored);
        assert_eq!(sel.pointer_leave(&mut sink), SelectionOutcome::Ignored);
        assert_eq!(sel.pointer_up(&mut sink), SelectionOutcome::Ignored);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn unpadded_and_dated_labels_are_normalized() {
        let mut sel = DateRangeSelector::new();
        let mut sink = Recorder::default();
        sel.pointer_down("2024-9-3");
        sel.pointer_move("8-7");
        // "2024-9-3" is neither MM-DD nor YYYY-MM-DD
        assert!(matches!(sel.pointer_up(&mut sink), SelectionOutcome::Aborted { .. }));

        sel.pointer_down("2023-09-03");
        sel.pointer_move("8-7");
        sel.pointer_up(&mut sink);
        assert_eq!(labels(&sink), vec![("08-07".into(), "09-03".into())]);
    }

    #[test]
    fn malformed_label_aborts_without_commit() {
        let mut sel = DateRangeSelector::new();
        let mut sink = Recorder::default();
        sel.pointer_down("Mar 2");
        sel.pointer_move("07-15");
        assert_eq!(
            sel.pointer_leave(&mut sink),
            SelectionOutcome::Aborted {
                label: "Mar 2".into()
            }
        );
        assert!(sink.0.is_empty());
        assert!(!sel.is_active());
    }

    #[test]
    fn preview_is_ordered_and_does_not_commit() {
        let mut sel = DateRangeSelector::new();
        assert_eq!(sel.preview(), None);
        sel.pointer_down("10-05");
        assert_eq!(sel.preview(), None);
        sel.pointer_move("9-1");
        assert_eq!(sel.preview(), Some(("09-01".into(), "10-05".into())));
    }

    #[test]
    fn handle_dispatches_events() {
        let mut sel = DateRangeSelector::new();
        let mut sink = Recorder::default();
        for ev in [
            PointerEvent::Down("01-05".into()),
            PointerEvent::Move("02-29".into()),
        ] {
            assert_eq!(sel.handle(ev, &mut sink), SelectionOutcome::Tracking);
        }
        let out = sel.handle(PointerEvent::Up, &mut sink);
        let expected = DateRange::new(
            MonthDay::new(1, 5).unwrap(),
            MonthDay::new(2, 29).unwrap(),
        );
        assert_eq!(out, SelectionOutcome::Committed(expected));
    }
}
