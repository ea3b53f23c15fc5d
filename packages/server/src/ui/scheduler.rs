//! Archival ticker: runs the inactivity sweep on a fixed period, independent
//! of any connection.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::usecase::SweepInactiveRoomsUseCase;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Spawn the ticker. Abort the returned handle to stop it.
pub fn spawn_archival_ticker(
    usecase: Arc<SweepInactiveRoomsUseCase>,
    period: Duration,
) -> JoinHandle<()> {
    let period = period.max(MIN_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let archived = usecase.execute().await;
            tracing::debug!("Sweep finished, {} room(s) archived", archived.len());
        }
    })
}
