//! Guest-side poller: follows one order until it is ready.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use domain::{Order, OrderStatus, SECONDS_PER_MINUTE};

use super::{Chime, Notifier, OrderSource};

/// What the tracking page shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingSnapshot {
    /// Last status seen, `None` before the first successful poll
    pub status: Option<OrderStatus>,
    /// Countdown from the preparation time, `None` until seeded
    pub remaining_seconds: Option<u64>,
    pub guest_arrived: bool,
}

/// Countdown and celebration state for the tracked order.
///
/// The countdown is seeded once, from the first poll that shows the order
/// preparing with a readable preparation time. After that only `tick`
/// moves it.
#[derive(Debug, Default)]
pub struct OrderTracker {
    snapshot: TrackingSnapshot,
    countdown_seeded: bool,
    celebrated: HashSet<Uuid>,
}

impl OrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one poll's view of the order. Returns `true` when the order has
    /// just been seen completed for the first time this session.
    pub fn observe(&mut self, order: &Order) -> bool {
        self.snapshot.status = Some(order.status);
        self.snapshot.guest_arrived = order.guest_arrived;

        if !self.countdown_seeded && order.status == OrderStatus::Preparing {
            if let Some(minutes) = order.preparation_minutes() {
                self.snapshot.remaining_seconds = Some(minutes.saturating_mul(SECONDS_PER_MINUTE));
                self.countdown_seeded = true;
            }
        }

        order.status == OrderStatus::Completed && self.celebrated.insert(order.id)
    }

    /// One second of countdown
    pub fn tick(&mut self) {
        if let Some(remaining) = self.snapshot.remaining_seconds.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    pub fn snapshot(&self) -> &TrackingSnapshot {
        &self.snapshot
    }
}

/// Handle to a running order tracker. Dropping it stops both timers.
pub struct OrderTrackHandle {
    snapshots: watch::Receiver<TrackingSnapshot>,
    task: JoinHandle<()>,
}

impl OrderTrackHandle {
    pub fn snapshot(&self) -> TrackingSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every status poll and countdown tick
    pub fn subscribe(&self) -> watch::Receiver<TrackingSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for OrderTrackHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll order `id` every `poll_every` and tick the countdown every `tick_every`.
pub fn spawn_order_tracker(
    source: Arc<dyn OrderSource>,
    notifier: Arc<dyn Notifier>,
    id: Uuid,
    poll_every: Duration,
    tick_every: Duration,
) -> OrderTrackHandle {
    let (snapshot_tx, snapshots) = watch::channel(TrackingSnapshot::default());

    let task = tokio::spawn(async move {
        let mut tracker = OrderTracker::new();
        let mut poll = tokio::time::interval(poll_every);
        let mut tick = tokio::time::interval(tick_every);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    let order = match source.order(id).await {
                        Ok(order) => order,
                        Err(e) => {
                            tracing::warn!(order_id = %id, error = %e, "Order poll failed, skipping");
                            continue;
                        }
                    };

                    let previous = tracker.snapshot().status;
                    if tracker.observe(&order) {
                        notifier.chime(Chime::Celebration);
                        notifier.toast("Your order is ready!");
                    }
                    if previous != Some(order.status) {
                        tracing::info!(order_id = %id, status = %order.status, "Order status changed");
                    }
                }
                _ = tick.tick() => tracker.tick(),
            }

            snapshot_tx.send_if_modified(|current| {
                if current != tracker.snapshot() {
                    *current = tracker.snapshot().clone();
                    true
                } else {
                    false
                }
            });
        }
    });

    OrderTrackHandle { snapshots, task }
}
