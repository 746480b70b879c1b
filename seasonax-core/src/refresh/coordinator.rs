//! Refresh coordinator.
//!
//! Owns one slot per registered view. `sync` compares each view's dependency
//! key with the one it last fetched for and hands out a [`FetchTicket`] for
//! every view whose key moved. The caller performs the fetch however it likes
//! (worker thread, inline) and reports back through `complete`. A result is
//! applied only if its ticket still matches the slot's current generation and
//! attempt, so a slow response for an old key can never overwrite newer data.
//!
//! Failures are retried after a fixed delay measured on an injected
//! [`Clock`]; `poll` releases retries that have come due. When the last retry
//! fails the view is marked failed and exactly one notification is queued.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::clock::Clock;
use super::view::{DependencyKey, DerivedView, RawSeries, ViewKind};
use crate::data::provider::ApiError;
use crate::domain::Lookback;
use crate::state::AnalysisState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(1),
        }
    }
}

/// `attempt` counts from 0 for the first try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading { attempt: u32 },
    Retrying { attempt: u32, due: Duration },
    Success,
    Failed,
}

impl ViewPhase {
    pub fn is_pending(&self) -> bool {
        matches!(self, ViewPhase::Loading { .. } | ViewPhase::Retrying { .. })
    }
}

/// One in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub view: ViewKind,
    pub generation: u64,
    pub attempt: u32,
    pub key: DependencyKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub view: ViewKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Ticket no longer current; nothing changed.
    Discarded,
    RetryScheduled { attempt: u32, due: Duration },
    Failed,
}

#[derive(Debug, Clone)]
pub struct ViewSlot {
    key: Option<DependencyKey>,
    generation: u64,
    phase: ViewPhase,
    data: Option<DerivedView>,
    last_error: Option<String>,
}

impl ViewSlot {
    fn new() -> Self {
        Self {
            key: None,
            generation: 0,
            phase: ViewPhase::Idle,
            data: None,
            last_error: None,
        }
    }

    pub fn key(&self) -> Option<&DependencyKey> {
        self.key.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn data(&self) -> Option<&DerivedView> {
        self.data.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn ticket(&self, view: ViewKind, attempt: u32) -> Option<FetchTicket> {
        Some(FetchTicket {
            view,
            generation: self.generation,
            attempt,
            key: self.key.clone()?,
        })
    }
}

pub struct RefreshCoordinator {
    slots: BTreeMap<ViewKind, ViewSlot>,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
    reference_year: i32,
    next_generation: u64,
    notifications: VecDeque<Notification>,
}

impl RefreshCoordinator {
    /// `reference_year` anchors lookback windows during derivation. A clock
    /// with a calendar moves it forward when the year turns over.
    pub fn new(policy: RetryPolicy, clock: Arc<dyn Clock>, reference_year: i32) -> Self {
        Self {
            slots: BTreeMap::new(),
            policy,
            clock,
            reference_year,
            next_generation: 1,
            notifications: VecDeque::new(),
        }
    }

    pub fn with_views(mut self, views: &[ViewKind]) -> Self {
        for &view in views {
            self.register(view);
        }
        self
    }

    pub fn register(&mut self, view: ViewKind) {
        self.slots.entry(view).or_insert_with(ViewSlot::new);
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn views(&self) -> impl Iterator<Item = ViewKind> + '_ {
        self.slots.keys().copied()
    }

    pub fn view(&self, view: ViewKind) -> Option<&ViewSlot> {
        self.slots.get(&view)
    }

    pub fn data(&self, view: ViewKind) -> Option<&DerivedView> {
        self.slots.get(&view).and_then(ViewSlot::data)
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn is_busy(&self) -> bool {
        self.slots.values().any(|s| s.phase.is_pending())
    }

    /// Start a new generation for every view whose key differs from the one
    /// it last fetched for. Pending retries of those views are dropped.
    ///
    /// A new calendar year on the clock invalidates every view, since each
    /// lookback window shifts with it.
    pub fn sync(&mut self, state: &AnalysisState) -> Vec<FetchTicket> {
        if let Some(year) = self.clock.current_year() {
            if year != self.reference_year {
                info!(from = self.reference_year, to = year, "calendar year changed");
                self.reference_year = year;
                for slot in self.slots.values_mut() {
                    slot.key = None;
                }
            }
        }

        let mut tickets = Vec::new();
        for (&view, slot) in self.slots.iter_mut() {
            let key = state.key_for(view);
            if slot.key.as_ref() == Some(&key) {
                continue;
            }

            let generation = self.next_generation;
            self.next_generation += 1;

            if slot.phase.is_pending() {
                debug!(%view, old = slot.generation, new = generation, "superseding in-flight fetch");
            }
            slot.key = Some(key.clone());
            slot.generation = generation;
            slot.phase = ViewPhase::Loading { attempt: 0 };
            slot.data = None;
            slot.last_error = None;

            debug!(%view, generation, asset = %key.asset, "dependency key changed");
            tickets.push(FetchTicket {
                view,
                generation,
                attempt: 0,
                key,
            });
        }
        tickets
    }

    /// Apply the outcome of `ticket`'s fetch.
    ///
    /// An empty payload is a successful fetch with nothing to show, not a
    /// failure.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<RawSeries, ApiError>,
    ) -> Completion {
        let Some(slot) = self.slots.get_mut(&ticket.view) else {
            return Completion::Discarded;
        };
        let current = slot.generation == ticket.generation
            && slot.phase == ViewPhase::Loading { attempt: ticket.attempt };
        if !current {
            debug!(
                view = %ticket.view,
                generation = ticket.generation,
                current = slot.generation,
                "discarding superseded result"
            );
            return Completion::Discarded;
        }

        match result {
            Ok(raw) => {
                let lookback = ticket.key.lookback.unwrap_or(Lookback::Max);
                slot.data = Some(DerivedView::derive(raw, lookback, self.reference_year));
                slot.phase = ViewPhase::Success;
                slot.last_error = None;
                debug!(view = %ticket.view, attempt = ticket.attempt, "view updated");
                Completion::Applied
            }
            Err(err) if ticket.attempt < self.policy.max_retries => {
                let attempt = ticket.attempt + 1;
                let due = self.clock.now() + self.policy.delay;
                warn!(
                    view = %ticket.view,
                    attempt,
                    max = self.policy.max_retries,
                    error = %err,
                    "fetch failed, retrying"
                );
                slot.phase = ViewPhase::Retrying { attempt, due };
                slot.last_error = Some(err.to_string());
                Completion::RetryScheduled { attempt, due }
            }
            Err(err) => {
                warn!(view = %ticket.view, error = %err, "fetch failed, giving up");
                fail_slot(slot, &mut self.notifications, ticket.view, &err.to_string());
                Completion::Failed
            }
        }
    }

    /// Fail a ticket that could not be handed to a fetcher at all. Skips the
    /// retry budget: there is nothing to retry against.
    pub fn abandon(&mut self, ticket: &FetchTicket, reason: &str) -> Completion {
        let Some(slot) = self.slots.get_mut(&ticket.view) else {
            return Completion::Discarded;
        };
        if slot.generation != ticket.generation || !slot.phase.is_pending() {
            return Completion::Discarded;
        }
        warn!(view = %ticket.view, reason, "fetch abandoned");
        fail_slot(slot, &mut self.notifications, ticket.view, reason);
        Completion::Failed
    }

    /// Tickets for retries whose delay has elapsed.
    pub fn poll(&mut self) -> Vec<FetchTicket> {
        let now = self.clock.now();
        let mut tickets = Vec::new();
        for (&view, slot) in self.slots.iter_mut() {
            let ViewPhase::Retrying { attempt, due } = slot.phase else {
                continue;
            };
            if due > now {
                continue;
            }
            slot.phase = ViewPhase::Loading { attempt };
            if let Some(ticket) = slot.ticket(view, attempt) {
                info!(%view, attempt, "retrying fetch");
                tickets.push(ticket);
            }
        }
        tickets
    }

    /// Earliest pending retry, for sleeping until it is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.slots
            .values()
            .filter_map(|s| match s.phase {
                ViewPhase::Retrying { due, .. } => Some(due),
                _ => None,
            })
            .min()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }
}

fn fail_slot(
    slot: &mut ViewSlot,
    notifications: &mut VecDeque<Notification>,
    view: ViewKind,
    reason: &str,
) {
    slot.phase = ViewPhase::Failed;
    slot.data = None;
    slot.last_error = Some(reason.to_string());
    notifications.push_back(Notification {
        view,
        message: format!("Failed to load {}: {reason}", view.label().to_lowercase()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::ProfitSummary;
    use crate::refresh::clock::ManualClock;

    fn coordinator(clock: Arc<ManualClock>) -> RefreshCoordinator {
        RefreshCoordinator::new(RetryPolicy::default(), clock, 2025)
            .with_views(&[ViewKind::ProfitSummary])
    }

    fn summary() -> RawSeries {
        RawSeries::ProfitSummary(ProfitSummary {
            total_profit: Some(12.5),
            average_profit: Some(1.25),
        })
    }

    fn boom() -> ApiError {
        ApiError::Network("connection reset".into())
    }

    #[test]
    fn first_sync_loads_and_unchanged_state_does_not() {
        let clock = Arc::new(ManualClock::new());
        let mut coord = coordinator(clock);
        let state = AnalysisState::new("AAPL", Lookback::default(), 2025);

        let tickets = coord.sync(&state);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].attempt, 0);
        assert!(coord.is_busy());
        assert!(coord.sync(&state).is_empty());

        assert_eq!(coord.complete(&tickets[0], Ok(summary())), Completion::Applied);
        let slot = coord.view(ViewKind::ProfitSummary).unwrap();
        assert_eq!(slot.phase(), ViewPhase::Success);
        assert!(slot.data().is_some());
        assert!(!coord.is_busy());
    }

    #[test]
    fn retry_waits_for_the_clock() {
        let clock = Arc::new(ManualClock::new());
        let mut coord = coordinator(clock.clone());
        let state = AnalysisState::new("AAPL", Lookback::default(), 2025);
        let t0 = coord.sync(&state).remove(0);

        let out = coord.complete(&t0, Err(boom()));
        assert_eq!(
            out,
            Completion::RetryScheduled {
                attempt: 1,
                due: Duration::from_secs(1)
            }
        );
        assert_eq!(coord.next_due(), Some(Duration::from_secs(1)));

        clock.advance(Duration::from_millis(999));
        assert!(coord.poll().is_empty());
        clock.advance(Duration::from_millis(1));
        let retry = coord.poll();
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].attempt, 1);
        assert_eq!(retry[0].generation, t0.generation);

        // the first attempt's ticket is no longer current
        assert_eq!(coord.complete(&t0, Ok(summary())), Completion::Discarded);
        assert_eq!(coord.complete(&retry[0], Ok(summary())), Completion::Applied);
    }

    #[test]
    fn unknown_view_is_discarded() {
        let clock = Arc::new(ManualClock::new());
        let mut coord = coordinator(clock);
        let ticket = FetchTicket {
            view: ViewKind::TradeStats,
            generation: 1,
            attempt: 0,
            key: AnalysisState::default().key_for(ViewKind::TradeStats),
        };
        assert_eq!(coord.complete(&ticket, Ok(summary())), Completion::Discarded);
    }

    #[test]
    fn abandoned_ticket_fails_without_retrying() {
        let clock = Arc::new(ManualClock::new());
        let mut coord = coordinator(clock);
        let state = AnalysisState::new("AAPL", Lookback::default(), 2025);
        let ticket = coord.sync(&state).remove(0);

        assert_eq!(coord.abandon(&ticket, "worker stopped"), Completion::Failed);
        let slot = coord.view(ViewKind::ProfitSummary).unwrap();
        assert_eq!(slot.phase(), ViewPhase::Failed);
        assert!(!coord.is_busy());
        assert!(coord.poll().is_empty());

        let notes = coord.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("worker stopped"));

        // already settled
        assert_eq!(coord.abandon(&ticket, "again"), Completion::Discarded);
        assert!(coord.drain_notifications().is_empty());
    }

    #[test]
    fn new_calendar_year_refetches_everything() {
        let clock = Arc::new(ManualClock::new());
        clock.set_year(2025);
        let mut coord = coordinator(clock.clone());
        let state = AnalysisState::new("AAPL", Lookback::default(), 2025);

        let old = coord.sync(&state).remove(0);
        assert_eq!(coord.complete(&old, Ok(summary())), Completion::Applied);
        assert!(coord.sync(&state).is_empty());

        clock.set_year(2026);
        let fresh = coord.sync(&state);
        assert_eq!(coord.reference_year(), 2026);
        assert_eq!(fresh.len(), 1);
        assert_ne!(fresh[0].generation, old.generation);
        assert_eq!(coord.complete(&old, Ok(summary())), Completion::Discarded);
        assert!(coord.sync(&state).is_empty());
    }
}
