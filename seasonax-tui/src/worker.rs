//! Background worker thread. All network I/O runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Every fetch
//! carries its `FetchTicket` back so the coordinator can drop superseded
//! results.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use seasonax_core::data::{write_export, ApiError, ExportSummary, ScreenerPattern, ScreenerQuery};
use seasonax_core::domain::DateRange;
use seasonax_core::refresh::{fetch_view, FetchTicket, RawSeries};
use seasonax_core::SeasonalityApi;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Fetch(FetchTicket),
    Export {
        asset: String,
        range: DateRange,
        path: PathBuf,
    },
    Screener {
        id: u64,
        query: ScreenerQuery,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Fetched {
        ticket: FetchTicket,
        result: Result<RawSeries, ApiError>,
    },
    Exported {
        result: Result<ExportSummary, String>,
    },
    Screener {
        id: u64,
        result: Result<Vec<ScreenerPattern>, ApiError>,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    api: Arc<dyn SeasonalityApi>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("seasonax-worker".into())
        .spawn(move || worker_loop(api.as_ref(), rx, tx))
}

fn worker_loop(api: &dyn SeasonalityApi, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    tracing::debug!(backend = api.name(), "worker started");
    while let Ok(cmd) = rx.recv() {
        let Some(resp) = handle_command(api, cmd) else {
            break;
        };
        if tx.send(resp).is_err() {
            // UI is gone
            break;
        }
    }
    tracing::debug!("worker stopped");
}

/// Run one command. `None` means shut down.
pub fn handle_command(api: &dyn SeasonalityApi, cmd: WorkerCommand) -> Option<WorkerResponse> {
    let resp = match cmd {
        WorkerCommand::Fetch(ticket) => {
            tracing::debug!(
                view = %ticket.view,
                generation = ticket.generation,
                attempt = ticket.attempt,
                "fetching"
            );
            let result = fetch_view(api, ticket.view, &ticket.key);
            WorkerResponse::Fetched { ticket, result }
        }
        WorkerCommand::Export { asset, range, path } => {
            let result = api
                .export_csv(&asset, range)
                .map_err(|e| format!("Export failed: {e}"))
                .and_then(|body| {
                    write_export(&body, &path).map_err(|e| format!("Export failed: {e}"))
                });
            WorkerResponse::Exported { result }
        }
        WorkerCommand::Screener { id, query } => WorkerResponse::Screener {
            id,
            result: api.screener(&query),
        },
        WorkerCommand::Shutdown => return None,
    };
    Some(resp)
}
