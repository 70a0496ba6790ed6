//! Background task loops: expired session pruning.

use std::time::Duration;

use session_store::SessionStore;
use tokio::time::{MissedTickBehavior, interval};

use crate::app::SharedState;

/// How often expired sessions are looked for.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Remove sessions created more than `retention_hours` before `now_ms`.
/// A retention of 0 keeps everything.
pub fn prune_expired_sessions(store: &SessionStore, retention_hours: u32, now_ms: i64) -> usize {
    if retention_hours == 0 {
        return 0;
    }
    let cutoff = now_ms.saturating_sub(i64::from(retention_hours) * HOUR_MS);
    store.prune_older_than(cutoff)
}

/// Periodic session pruning. The first pass runs at startup.
pub async fn session_retention_loop(state: SharedState, period: Duration) {
    let retention_hours = state.config().session_retention_hours;
    if retention_hours == 0 {
        tracing::info!("Session retention disabled");
        return;
    }
    let shutdown_token = state.shutdown_token().clone();

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                tracing::info!("Session retention loop stopped (shutdown)");
                return;
            }
            _ = ticker.tick() => {}
        }

        let store = state.store().clone();
        let now = chrono::Utc::now().timestamp_millis();
        let pass = tokio::task::spawn_blocking(move || {
            prune_expired_sessions(&store, retention_hours, now)
        });
        match pass.await {
            Ok(removed) => tracing::debug!(removed, "Session retention pass finished"),
            Err(e) => tracing::warn!("Session retention pass failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::api::test_support::test_state;
    use session_store::{SessionRecord, TimerSetting};

    fn record(id: &str, created_at: i64) -> SessionRecord {
        SessionRecord {
            id: id.into(),
            layout: "3-grid".into(),
            photos: vec![],
            timer: TimerSetting::Three,
            created_at,
        }
    }

    #[test]
    fn prune_uses_retention_window() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let now = 100 * HOUR_MS;
        assert!(state.store().save(&record("stale", now - 73 * HOUR_MS)));
        assert!(state.store().save(&record("recent", now - 71 * HOUR_MS)));

        assert_eq!(prune_expired_sessions(state.store(), 72, now), 1);
        assert!(state.store().load("stale").is_none());
        assert!(state.store().load("recent").is_some());
    }

    #[test]
    fn zero_retention_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        assert!(state.store().save(&record("ancient", 0)));
        assert_eq!(prune_expired_sessions(state.store(), 0, i64::MAX), 0);
        assert!(state.store().load("ancient").is_some());
    }

    #[tokio::test]
    async fn loop_prunes_at_startup_and_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        assert!(state.store().save(&record("stale", 0)));

        let handle = tokio::spawn(session_retention_loop(
            state.clone(),
            Duration::from_secs(3600),
        ));
        // The first tick fires immediately.
        for _ in 0..100 {
            if state.store().load("stale").is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(state.store().load("stale").is_none());

        state.shutdown_token().cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop did not stop")
            .unwrap();
    }
}
