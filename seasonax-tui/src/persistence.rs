//! Session persistence: JSON save/load of what the user was looking at.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use seasonax_core::data::{ScreenerQuery, SortState};
use seasonax_core::domain::{DateRange, Lookback};
use seasonax_core::state::NavigationParams;

use crate::app::{AppState, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub asset: Option<String>,
    pub date_range: Option<DateRange>,
    pub lookback: Option<Lookback>,
    pub active_panel: Panel,
    pub screener_query: ScreenerQuery,
    pub screener_sort: SortState,
}

pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seasonax")
        .join("state.json")
}

/// Load persisted state from disk. Returns defaults if the file is missing or
/// corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session state");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        asset: Some(app.analysis.asset().to_string()),
        date_range: Some(app.analysis.date_range()),
        lookback: Some(app.analysis.lookback()),
        active_panel: app.active_panel,
        screener_query: app.screener.query.clone(),
        screener_sort: app.screener.sort,
    }
}

/// Restore a saved session. Goes through the same navigation path as a
/// screener row so every field is validated.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.analysis.apply_navigation(&NavigationParams {
        asset: state.asset,
        date_range: state.date_range,
        lookback: state.lookback,
    });
    app.active_panel = state.active_panel;
    app.screener.query = state.screener_query;
    app.screener.sort = state.screener_sort;
}

#[cfg(test)]
mod tests {
    use super::*;
    use seasonax_core::data::{MarketGroup, SortColumn, SortOrder};
    use seasonax_core::domain::MonthDay;

    #[test]
    fn roundtrip() {
        let dir = std::env::temp_dir().join("seasonax_persist_test");
        let path = dir.join("state.json");

        let mut state = PersistedState {
            asset: Some("MSFT".into()),
            date_range: Some(DateRange::new(
                MonthDay::new(5, 13).unwrap(),
                MonthDay::new(6, 12).unwrap(),
            )),
            lookback: Some(Lookback::Max),
            active_panel: Panel::Screener,
            ..Default::default()
        };
        state.screener_query.market_group = MarketGroup::Crypto;
        state.screener_sort = SortState {
            column: SortColumn::WinRatio,
            order: SortOrder::Descending,
        };

        save(&path, &state).unwrap();
        assert_eq!(load(&path), state);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_returns_defaults() {
        let loaded = load(Path::new("/nonexistent/path/state.json"));
        assert_eq!(loaded, PersistedState::default());
    }

    #[test]
    fn corrupt_file_returns_defaults() {
        let dir = std::env::temp_dir().join("seasonax_persist_corrupt");
        let path = dir.join("state.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "not valid json {{{").unwrap();

        assert_eq!(load(&path), PersistedState::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = std::env::temp_dir().join("seasonax_persist_partial");
        let path = dir.join("state.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, r#"{"asset":"TSLA","lookback":"max"}"#).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.asset.as_deref(), Some("TSLA"));
        assert_eq!(loaded.lookback, Some(Lookback::Max));
        assert_eq!(loaded.active_panel, Panel::Dashboard);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
