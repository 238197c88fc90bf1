//! Order pollers for the staff and guest front ends.
//!
//! Both pollers are split in two: a plain state object that decides what a
//! fetched order list means, and a spawned driver that owns that state,
//! runs the timers and publishes snapshots through a `watch` channel.
//! Dropping a driver handle stops its task.

mod admin_watcher;
mod config;
mod error;
mod notifier;
mod order_tracker;
mod source;

pub use admin_watcher::{spawn_admin_watcher, AdminOrderWatcher, AdminSnapshot, AdminWatchHandle};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use notifier::{Chime, Notifier, TerminalNotifier};
pub use order_tracker::{spawn_order_tracker, OrderTrackHandle, OrderTracker, TrackingSnapshot};
pub use source::{HttpOrderSource, OrderSource};

#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotifier;
#[cfg(any(test, feature = "test-utils"))]
pub use source::MockOrderSource;
