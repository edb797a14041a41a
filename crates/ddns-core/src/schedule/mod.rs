// # Schedules
//
// A schedule decides when the engine runs a cycle. It is exposed as a stream
// of ticks so the engine loop never touches the wall clock itself, and tests
// can drive cycles by hand.
//
// ## Implementations
//
// - `HourlySchedule`: top of every hour (`@hourly`)

use chrono::{DateTime, Timelike, Utc};
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;

/// A single trigger emitted by a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// The moment this tick was scheduled for
    pub scheduled_at: DateTime<Utc>,
}

impl Tick {
    pub fn new(scheduled_at: DateTime<Utc>) -> Self {
        Self { scheduled_at }
    }

    /// A tick scheduled for the current instant
    pub fn now() -> Self {
        Self::new(Utc::now())
    }
}

/// Trait for cycle triggers
///
/// # Behavior
///
/// - `ticks()` must not yield an initial tick; the engine runs its startup
///   cycle on its own
/// - The stream ends only when the schedule has nothing more to emit
/// - Dropping the stream must stop any task backing it
pub trait Schedule: Send + Sync {
    fn ticks(&self) -> Pin<Box<dyn Stream<Item = Tick> + Send + 'static>>;
}

/// Fires at the top of every hour
///
/// Ticks that fall due while the previous one is still being handled are
/// coalesced into the pending one, so cycles never overlap or queue up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HourlySchedule;

impl HourlySchedule {
    pub fn new() -> Self {
        Self
    }
}

impl Schedule for HourlySchedule {
    fn ticks(&self) -> Pin<Box<dyn Stream<Item = Tick> + Send + 'static>> {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(emit_hourly(tx));
        Box::pin(ReceiverStream::new(rx))
    }
}

/// Send a tick into `tx` at every top of the hour until the receiver is gone
///
/// `tx` should have capacity 1. A tick that finds the channel full is
/// dropped, so at most one tick is ever pending.
async fn emit_hourly(tx: mpsc::Sender<Tick>) {
    let mut last: Option<DateTime<Utc>> = None;

    loop {
        let now = Utc::now();
        // The wall clock may lag the timer slightly after a wake-up.
        let next = next_top_of_hour(last.map_or(now, |last| last.max(now)));
        let wait = until(now, next);
        tracing::debug!("Next scheduled check at {} (in {:?})", next, wait);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tx.closed() => break,
        }

        last = Some(next);
        match tx.try_send(Tick::new(next)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Previous check still pending, skipping tick at {}", next);
            }
            Err(TrySendError::Closed(_)) => break,
        }
    }
    tracing::debug!("Hourly schedule stopped");
}

/// The first whole hour strictly after `now`
pub fn next_top_of_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    let start_of_hour = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    start_of_hour + chrono::Duration::hours(1)
}

fn until(now: DateTime<Utc>, next: DateTime<Utc>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio_stream::StreamExt;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn next_tick_is_the_following_whole_hour() {
        assert_eq!(next_top_of_hour(at(12, 34, 56)), at(13, 0, 0));
        assert_eq!(next_top_of_hour(at(12, 0, 1)), at(13, 0, 0));
        assert_eq!(next_top_of_hour(at(12, 59, 59)), at(13, 0, 0));
    }

    #[test]
    fn exact_top_of_hour_schedules_the_next_one() {
        assert_eq!(next_top_of_hour(at(12, 0, 0)), at(13, 0, 0));
    }

    #[test]
    fn next_tick_crosses_midnight() {
        let next = next_top_of_hour(at(23, 15, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn hourly_ticks_land_on_whole_hours_one_hour_apart() {
        let mut ticks = HourlySchedule::new().ticks();

        let first = ticks.next().await.unwrap().scheduled_at;
        let second = ticks.next().await.unwrap().scheduled_at;

        assert_eq!((first.minute(), first.second(), first.nanosecond()), (0, 0, 0));
        assert!(first > Utc::now() - chrono::Duration::hours(1));
        assert_eq!(second - first, chrono::Duration::hours(1));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_due_while_one_is_pending_are_dropped() {
        let mut ticks = HourlySchedule::new().ticks();

        // Nobody reads for a long stretch, as during a hung cycle. Several
        // hourly ticks fall due in that time.
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;

        let pending = ticks.next().await.unwrap().scheduled_at;
        let following = ticks.next().await.unwrap().scheduled_at;

        // Only the oldest tick was kept; the ones right after it are gone.
        assert!(
            following - pending >= chrono::Duration::hours(3),
            "pending={} following={}",
            pending,
            following
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_receiver_stops_the_task() {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(emit_hourly(tx));

        drop(rx);

        let finished = tokio::time::timeout(Duration::from_secs(1), task).await;
        assert!(finished.is_ok(), "task should end once nobody listens");
    }

    #[test]
    fn wait_is_never_negative() {
        assert_eq!(until(at(13, 0, 1), at(13, 0, 0)), Duration::ZERO);
        assert_eq!(until(at(12, 59, 0), at(13, 0, 0)), Duration::from_secs(60));
    }
}
