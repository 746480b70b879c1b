//! Render every panel into an in-memory terminal, with and without data.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use ratatui::backend::TestBackend;
use ratatui::Terminal;

use seasonax_core::data::{ApiError, CumulativeProfitItem, Seasonality, YearlyStatistic};
use seasonax_core::refresh::{ManualClock, RawSeries, ViewKind};
use seasonax_core::{DashboardConfig, RetryPolicy};
use seasonax_tui::app::{AppState, Overlay, Panel};
use seasonax_tui::ui;
use seasonax_tui::worker::{WorkerCommand, WorkerResponse};

fn app() -> (AppState, Receiver<WorkerCommand>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let mut config = DashboardConfig::default();
    config.refresh.max_retries = 0;
    let app = AppState::new(
        &config,
        Arc::new(ManualClock::new()),
        cmd_tx,
        resp_rx,
        PathBuf::from("exports"),
    );
    (app, cmd_rx)
}

fn screen(app: &mut AppState) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    let frame = terminal.draw(|f| ui::draw(f, app)).unwrap();
    app.frame_area = frame.area;
    let buffer = terminal.backend().buffer().clone();
    buffer
        .content()
        .chunks(120)
        .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn answer(app: &mut AppState, rx: &Receiver<WorkerCommand>, mut respond: impl FnMut(ViewKind) -> Result<RawSeries, ApiError>) {
    app.dispatch_refresh();
    for cmd in rx.try_iter() {
        if let WorkerCommand::Fetch(ticket) = cmd {
            let result = respond(ticket.view);
            app.apply_response(WorkerResponse::Fetched { ticket, result });
        }
    }
}

fn canned(view: ViewKind) -> Result<RawSeries, ApiError> {
    Ok(match view {
        ViewKind::Seasonality => RawSeries::Seasonality(Seasonality {
            dates: vec!["01-01".into(), "06-01".into(), "12-31".into()],
            values: vec![Some(100.0), Some(104.0), Some(108.0)],
        }),
        ViewKind::CumulativeProfit => RawSeries::CumulativeProfit(
            (2016..=2025)
                .map(|year| CumulativeProfitItem {
                    year,
                    cumulative_profit: Some(1.5),
                })
                .collect(),
        ),
        ViewKind::PatternStatistics => RawSeries::PatternStatistics(vec![YearlyStatistic {
            year: 2024,
            start_date: "2024-05-13".into(),
            end_date: "2024-06-12".into(),
            start_price: Some(100.0),
            end_price: Some(105.0),
            profit: Some(5.0),
            profit_percentage: Some(5.0),
            max_rise: Some(8.0),
            max_drop: Some(-3.0),
        }]),
        other => return Err(ApiError::InvalidRequest(format!("{other} not canned"))),
    })
}

#[test]
fn every_panel_renders_before_any_data() {
    let (mut app, _rx) = app();
    app.dispatch_refresh();
    for panel in Panel::ALL {
        app.active_panel = panel;
        let text = screen(&mut app);
        assert!(text.contains(panel.label()), "{panel:?} title missing");
    }
    app.active_panel = Panel::Dashboard;
    assert!(screen(&mut app).contains("Loading..."));
}

#[test]
fn dashboard_shows_loaded_views_and_failed_placeholder() {
    let (mut app, rx) = app();
    answer(&mut app, &rx, canned);

    let text = screen(&mut app);
    assert!(text.contains("AAPL"));
    assert!(text.contains("Seasonality"));
    // one stats row drawn as a bar with its extensions
    assert!(text.contains("2024"));
    assert!(text.contains("▲3.00"));
    let bar_row = text
        .lines()
        .find(|l| l.contains("▲3.00"))
        .expect("bar row drawn");
    // drop extension, axis, gain body, rise extension in that order
    let drop = bar_row.find('░').expect("drop extension drawn");
    let axis = bar_row[drop..].find('│').map(|i| i + drop).expect("axis after drop");
    let body = bar_row[axis..].find('█').map(|i| i + axis).expect("body right of axis");
    assert!(bar_row[body..].contains('░'), "rise extension beyond the body");

    app.active_panel = Panel::Statistics;
    let stats = screen(&mut app);
    assert!(stats.contains("No data"), "failed views fall back to a placeholder");
    assert!(stats.contains("2024-05-13"));
}

#[test]
fn failures_reach_the_error_overlay() {
    let (mut app, rx) = app();
    answer(&mut app, &rx, |_| Err(ApiError::Network("connection refused".into())));
    assert_eq!(app.error_history.len(), ViewKind::ALL.len());

    app.overlay = Overlay::ErrorHistory;
    let text = screen(&mut app);
    assert!(text.contains("Error History (9)"));
    assert!(text.contains("connection refused"));
}

#[test]
fn retrying_views_say_so() {
    let (cmd_tx, rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let clock = Arc::new(ManualClock::new());
    let mut app = AppState::new(
        &DashboardConfig::default(),
        clock.clone(),
        cmd_tx,
        resp_rx,
        PathBuf::from("exports"),
    );
    app.coordinator = seasonax_core::RefreshCoordinator::new(
        RetryPolicy {
            max_retries: 2,
            delay: Duration::from_secs(1),
        },
        clock,
        2025,
    )
    .with_views(&[ViewKind::Seasonality]);

    answer(&mut app, &rx, |_| Err(ApiError::Network("slow".into())));
    assert!(screen(&mut app).contains("Retrying (1/2)"));
    assert!(app.error_history.is_empty());
}
