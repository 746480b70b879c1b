//! Per-view refresh: dependency keys, fetch tickets, retries.

pub mod clock;
pub mod coordinator;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{
    Completion, FetchTicket, Notification, RefreshCoordinator, RetryPolicy, ViewPhase, ViewSlot,
};
pub use view::{fetch_view, DependencyKey, Dependencies, DerivedView, RawSeries, ViewKind};
