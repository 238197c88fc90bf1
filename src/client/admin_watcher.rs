//! Staff-side poller: chimes when new orders start waiting.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use domain::Order;

use super::{Chime, Notifier, OrderSource};
use crate::config::ADMIN_POLL_LIMIT;

/// Counts shown on the staff dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminSnapshot {
    /// Orders currently pending
    pub pending_order_count: usize,
    /// Pending orders staff have not acknowledged
    pub new_orders_count: usize,
}

/// Seen-set bookkeeping over successive polls of the order list.
///
/// The first poll only establishes a baseline. After that an order is
/// *unseen* while pending and not acknowledged, and *truly new* on the
/// first poll it shows up in.
#[derive(Debug, Default)]
pub struct AdminOrderWatcher {
    seen: HashSet<Uuid>,
    previous_pending: HashSet<Uuid>,
    initialized: bool,
    new_orders_count: usize,
}

impl AdminOrderWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one poll's orders. Returns how many orders are truly new.
    pub fn observe(&mut self, orders: &[Order]) -> usize {
        let pending: HashSet<Uuid> = orders
            .iter()
            .filter(|order| order.is_pending())
            .map(|order| order.id)
            .collect();

        if !self.initialized {
            self.initialized = true;
            self.seen.extend(pending.iter().copied());
            self.new_orders_count = 0;
            self.previous_pending = pending;
            return 0;
        }

        let unseen: HashSet<Uuid> = pending.difference(&self.seen).copied().collect();
        let truly_new = unseen.difference(&self.previous_pending).count();

        // Orders never return to pending, so ids that left can be forgotten.
        self.seen.retain(|id| pending.contains(id));
        self.new_orders_count = unseen.len();
        self.previous_pending = pending;

        truly_new
    }

    /// Acknowledge every order currently pending.
    pub fn mark_orders_seen(&mut self) {
        self.seen.extend(self.previous_pending.iter().copied());
        self.new_orders_count = 0;
    }

    pub fn pending_order_count(&self) -> usize {
        self.previous_pending.len()
    }

    pub fn new_orders_count(&self) -> usize {
        self.new_orders_count
    }

    pub fn snapshot(&self) -> AdminSnapshot {
        AdminSnapshot {
            pending_order_count: self.pending_order_count(),
            new_orders_count: self.new_orders_count(),
        }
    }
}

/// Handle to a running admin watcher. Dropping it stops the poller.
pub struct AdminWatchHandle {
    snapshots: watch::Receiver<AdminSnapshot>,
    mark_seen: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl AdminWatchHandle {
    /// Latest counts
    pub fn snapshot(&self) -> AdminSnapshot {
        *self.snapshots.borrow()
    }

    /// Receiver notified whenever the counts are republished
    pub fn subscribe(&self) -> watch::Receiver<AdminSnapshot> {
        self.snapshots.clone()
    }

    /// Acknowledge every order currently pending
    pub fn mark_orders_seen(&self) {
        if self.mark_seen.send(()).is_err() {
            tracing::debug!("Admin watcher already stopped");
        }
    }
}

impl Drop for AdminWatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll `source` every `period`, alerting through `notifier` on new orders.
pub fn spawn_admin_watcher(
    source: Arc<dyn OrderSource>,
    notifier: Arc<dyn Notifier>,
    period: Duration,
) -> AdminWatchHandle {
    let (snapshot_tx, snapshots) = watch::channel(AdminSnapshot::default());
    let (mark_seen, mut mark_seen_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut watcher = AdminOrderWatcher::new();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let orders = match source.recent_orders(ADMIN_POLL_LIMIT).await {
                        Ok(orders) => orders,
                        Err(e) => {
                            tracing::warn!(error = %e, "Order poll failed, skipping");
                            continue;
                        }
                    };

                    let truly_new = watcher.observe(&orders);
                    if truly_new > 0 {
                        tracing::info!(truly_new, "New orders received");
                        notifier.chime(Chime::NewOrder);
                        notifier.toast(&new_orders_toast(truly_new));
                    }
                }
                Some(()) = mark_seen_rx.recv() => watcher.mark_orders_seen(),
            }

            snapshot_tx.send_replace(watcher.snapshot());
        }
    });

    AdminWatchHandle {
        snapshots,
        mark_seen,
        task,
    }
}

fn new_orders_toast(count: usize) -> String {
    if count == 1 {
        "1 new order received".to_string()
    } else {
        format!("{} new orders received", count)
    }
}
