//! Application state: panels, shared analysis state, the refresh coordinator,
//! and cross-cutting status and error history.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SendError, Sender};
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime};
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

use seasonax_core::data::{
    export_file_name, sort_patterns, ApiError, ScreenerPattern, ScreenerQuery, SortState,
};
use seasonax_core::refresh::{Clock, DerivedView, RefreshCoordinator, ViewKind};
use seasonax_core::selection::DateRangeSelector;
use seasonax_core::state::AnalysisState;
use seasonax_core::DashboardConfig;

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Panel {
    #[default]
    Dashboard,
    Statistics,
    Screener,
    Help,
}

impl Panel {
    pub const ALL: [Panel; 4] = [
        Panel::Dashboard,
        Panel::Statistics,
        Panel::Screener,
        Panel::Help,
    ];

    pub fn index(self) -> usize {
        match self {
            Panel::Dashboard => 0,
            Panel::Statistics => 1,
            Panel::Screener => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::Statistics => "Statistics",
            Panel::Screener => "Screener",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Export,
    Selection,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Export => "EXPORT",
            ErrorCategory::Selection => "SELECT",
            ErrorCategory::Other => "OTHER",
        }
    }

    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::Decode(_) => ErrorCategory::Data,
            ApiError::InvalidRequest(_) => ErrorCategory::Other,
            ApiError::Network(_) | ApiError::Status { .. } | ApiError::CircuitOpen { .. } => {
                ErrorCategory::Network
            }
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    AssetPrompt,
    ErrorHistory,
}

/// Screener panel: filters, latest results, cursor.
pub struct ScreenerPanelState {
    pub query: ScreenerQuery,
    pub sort: SortState,
    pub rows: Vec<ScreenerPattern>,
    pub cursor: usize,
    pub scroll_offset: usize,
    /// Id of the request whose results the panel is waiting for.
    pub pending: Option<u64>,
    next_request: u64,
}

impl ScreenerPanelState {
    pub fn new(query: ScreenerQuery, sort: SortState) -> Self {
        Self {
            query,
            sort,
            rows: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            pending: None,
            next_request: 0,
        }
    }

    /// Allocate an id for a new request; any earlier one becomes stale.
    pub fn begin_request(&mut self) -> u64 {
        self.next_request += 1;
        self.pending = Some(self.next_request);
        self.next_request
    }

    /// Accept results for `id` if it is still the pending request.
    pub fn accept(&mut self, id: u64, mut rows: Vec<ScreenerPattern>) -> bool {
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        sort_patterns(&mut rows, self.sort);
        self.rows = rows;
        self.cursor = 0;
        self.scroll_offset = 0;
        true
    }

    pub fn resort(&mut self) {
        sort_patterns(&mut self.rows, self.sort);
    }

    pub fn selected(&self) -> Option<&ScreenerPattern> {
        self.rows.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize, visible_rows: usize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        let visible = visible_rows.max(1);
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible {
            self.scroll_offset = self.cursor + 1 - visible;
        }
    }
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,

    pub analysis: AnalysisState,
    pub selector: DateRangeSelector,
    pub coordinator: RefreshCoordinator,
    pub screener: ScreenerPanelState,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub asset_input: String,

    /// Area of the last drawn frame; mouse hit-testing uses the same layout.
    pub frame_area: Rect,
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        config: &DashboardConfig,
        clock: Arc<dyn Clock>,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        export_dir: PathBuf,
    ) -> Self {
        let year = chrono::Local::now().year();
        let analysis = AnalysisState::new(&config.defaults.asset, config.defaults.lookback, year);
        let coordinator = RefreshCoordinator::new(config.refresh.retry_policy(), clock, year)
            .with_views(&ViewKind::ALL);
        Self {
            active_panel: Panel::Dashboard,
            running: true,
            analysis,
            selector: DateRangeSelector::new(),
            coordinator,
            screener: ScreenerPanelState::new(ScreenerQuery::default(), SortState::default()),
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            asset_input: String::new(),
            frame_area: Rect::default(),
            export_dir,
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        self.error_history.truncate(ERROR_HISTORY_CAP);
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn data(&self, view: ViewKind) -> Option<&DerivedView> {
        self.coordinator.data(view)
    }

    /// Diff the analysis state against every view, promote due retries, and
    /// hand the resulting tickets to the worker.
    pub fn dispatch_refresh(&mut self) {
        let mut tickets = self.coordinator.sync(&self.analysis);
        tickets.extend(self.coordinator.poll());
        const WORKER_GONE: &str = "background worker is not running";
        let mut worker_down = false;
        for ticket in tickets {
            if worker_down {
                self.coordinator.abandon(&ticket, WORKER_GONE);
                continue;
            }
            if let Err(SendError(WorkerCommand::Fetch(ticket))) =
                self.worker_tx.send(WorkerCommand::Fetch(ticket))
            {
                tracing::error!("worker channel closed");
                worker_down = true;
                self.coordinator.abandon(&ticket, WORKER_GONE);
            }
        }
        for note in self.coordinator.drain_notifications() {
            self.push_error(ErrorCategory::Other, note.message, note.view.label().into());
        }
    }

    pub fn apply_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Fetched { ticket, result } => {
                let category = result.as_ref().err().map(ErrorCategory::from_api);
                self.coordinator.complete(&ticket, result);
                for note in self.coordinator.drain_notifications() {
                    self.push_error(
                        category.unwrap_or(ErrorCategory::Network),
                        note.message,
                        format!("{} / {}", ticket.key.asset, note.view.label()),
                    );
                }
            }
            WorkerResponse::Exported { result } => match result {
                Ok(summary) => self.set_status(format!(
                    "Exported {} rows to {}",
                    summary.rows,
                    summary.path.display()
                )),
                Err(message) => {
                    self.push_error(ErrorCategory::Export, message, self.analysis.asset().into())
                }
            },
            WorkerResponse::Screener { id, result } => match result {
                Ok(rows) => {
                    let count = rows.len();
                    if self.screener.accept(id, rows) {
                        self.set_status(format!("Screener: {count} patterns"));
                    } else {
                        tracing::debug!(id, "discarding superseded screener result");
                    }
                }
                Err(err) => {
                    if self.screener.pending == Some(id) {
                        self.screener.pending = None;
                        self.push_error(
                            ErrorCategory::from_api(&err),
                            format!("Screener failed: {err}"),
                            self.screener.query.market_group.as_param().into(),
                        );
                    }
                }
            },
        }
    }

    pub fn request_export(&mut self) {
        let range = self.analysis.date_range();
        let asset = self.analysis.asset().to_string();
        let path = self.export_dir.join(export_file_name(&asset, range));
        let cmd = WorkerCommand::Export { asset, range, path };
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(
                ErrorCategory::Other,
                "Background worker is not running".into(),
                "export".into(),
            );
        } else {
            self.set_status("Exporting CSV...");
        }
    }

    pub fn request_screener(&mut self) {
        let id = self.screener.begin_request();
        let query = self.screener.query.clone();
        if self.worker_tx.send(WorkerCommand::Screener { id, query }).is_err() {
            self.screener.pending = None;
            self.push_error(
                ErrorCategory::Other,
                "Background worker is not running".into(),
                "screener".into(),
            );
        } else {
            self.set_status("Running screener...");
        }
    }

    /// Load the selected screener pattern into the dashboard.
    pub fn open_selected_pattern(&mut self) {
        let Some(pattern) = self.screener.selected() else {
            return;
        };
        let params = pattern.to_navigation(self.screener.query.lookback);
        let symbol = pattern.symbol.clone();
        if params.date_range.is_none() {
            self.set_warning(format!(
                "{symbol}: pattern dates {}..{} not understood, keeping range",
                pattern.pattern_start, pattern.pattern_end
            ));
        }
        self.analysis.apply_navigation(&params);
        self.active_panel = Panel::Dashboard;
        self.set_status(format!(
            "{} {} ({})",
            self.analysis.asset(),
            self.analysis.date_range(),
            self.analysis.lookback()
        ));
    }
}
