//! Watch command - Runs an order poller against a live server.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::cli::args::{WatchArgs, WatchTarget};
use crate::client::{
    spawn_admin_watcher, spawn_order_tracker, ClientConfig, HttpOrderSource, OrderSource,
    TerminalNotifier,
};
use crate::config::{
    ADMIN_POLL_INTERVAL_SECONDS, COUNTDOWN_TICK_SECONDS, TRACKING_POLL_INTERVAL_SECONDS,
};
use crate::errors::{AppError, AppResult};

/// Execute the watch command. Runs until Ctrl-C.
pub async fn execute(args: WatchArgs) -> AppResult<()> {
    let config = ClientConfig::new(args.base_url, args.user_id).with_timeout(args.timeout);
    tracing::info!(base_url = %config.base_url, "Watching orders");

    let source: Arc<dyn OrderSource> = Arc::new(
        HttpOrderSource::new(config)
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?,
    );

    match args.target {
        WatchTarget::Admin => watch_admin(source).await,
        WatchTarget::Order { id } => watch_order(source, id).await,
    }
}

async fn watch_admin(source: Arc<dyn OrderSource>) -> AppResult<()> {
    let handle = spawn_admin_watcher(
        source,
        Arc::new(TerminalNotifier),
        Duration::from_secs(ADMIN_POLL_INTERVAL_SECONDS),
    );
    let mut snapshots = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *snapshots.borrow_and_update();
                tracing::info!(
                    pending = snapshot.pending_order_count,
                    new = snapshot.new_orders_count,
                    "Orders"
                );
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => handle.mark_orders_seen(),
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                }
            },
        }
    }

    tracing::info!("Admin watcher stopped");
    Ok(())
}

async fn watch_order(source: Arc<dyn OrderSource>, id: Uuid) -> AppResult<()> {
    let handle = spawn_order_tracker(
        source,
        Arc::new(TerminalNotifier),
        id,
        Duration::from_secs(TRACKING_POLL_INTERVAL_SECONDS),
        Duration::from_secs(COUNTDOWN_TICK_SECONDS),
    );
    let mut snapshots = handle.subscribe();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                match (snapshot.status, snapshot.remaining_seconds) {
                    (Some(status), Some(remaining)) => tracing::info!(
                        order_id = %id,
                        %status,
                        remaining = %format_countdown(remaining),
                        arrived = snapshot.guest_arrived,
                        "Order"
                    ),
                    (Some(status), None) => tracing::info!(
                        order_id = %id,
                        %status,
                        arrived = snapshot.guest_arrived,
                        "Order"
                    ),
                    (None, _) => {}
                }
            }
        }
    }

    tracing::info!("Order tracker stopped");
    Ok(())
}

fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(1800), "30:00");
        assert_eq!(format_countdown(61), "01:01");
    }
}
