// src/render/mod.rs
//
// Terminal counterpart of the status page: polls `/status/health` on a
// fixed interval and redraws a board of dependency states.

mod board;
mod fetch;
mod terminal;

pub use board::{LastCheck, StatusBoard};
pub use fetch::{fetch_timeout, FetchError, HealthFetcher, FETCH_MARGIN};
pub use terminal::render_board;

use chrono::Local;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Poll once and fold the outcome into `board`.
pub async fn poll_once(fetcher: &HealthFetcher, board: &mut StatusBoard) {
    let fetched = fetcher.fetch().await;
    match &fetched {
        Ok(aggregate) => debug!(check_ms = aggregate.check_ms, "health fetched"),
        Err(e) => warn!(error = %e, "health fetch failed"),
    }
    board.apply(fetched, Local::now());
}

/// Draw the initial `checking` board, then poll every `period` and call
/// `draw` after each poll until `shutdown` resolves.
pub async fn watch<D, S>(
    fetcher: &HealthFetcher,
    board: &mut StatusBoard,
    period: Duration,
    mut draw: D,
    shutdown: S,
) where
    D: FnMut(&StatusBoard),
    S: Future<Output = ()>,
{
    info!("Watching {} every {:?}", fetcher.url(), period);
    draw(board);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poll_once(fetcher, board).await;
                draw(board);
            }
            _ = &mut shutdown => {
                info!("Watch stopped");
                break;
            }
        }
    }
}
