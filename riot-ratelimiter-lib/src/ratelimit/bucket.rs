use std::pin::pin;
#[cfg(test)]
use std::sync::atomic::AtomicBool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use super::{RateLimitConfig, TierSpec};

/// One window of a rate limit, e.g. "20 requests every second".
///
/// Requests are admitted in FIFO order. A request needs a unit of the
/// reservoir, a free concurrency slot and must keep `min_time` distance to
/// the previous dispatch. The reservoir is refilled to `capacity` once per
/// `window`.
#[derive(Debug)]
pub struct TokenBucket {
    id: String,

    /// Limits and live counters
    state: Mutex<BucketState>,

    /// Only the holder may wait for admission, the others queue behind it.
    /// The tokio mutex is fair, which makes admission FIFO.
    queue: tokio::sync::Mutex<()>,

    /// Controls the maximum number of running requests
    slots: Arc<Semaphore>,

    /// Requests waiting for admission
    queued: AtomicUsize,

    /// Requests admitted but not yet finished
    running: Arc<AtomicUsize>,

    /// Wakes the head of the queue when the limits change
    changed: Notify,

    /// Every compare-and-set races with a concurrent change
    #[cfg(test)]
    contended: AtomicBool,
}

#[derive(Debug)]
struct BucketState {
    capacity: u64,
    window: Duration,
    min_time: Duration,
    reservoir: u64,
    window_start: Instant,
    last_dispatch: Option<Instant>,
    /// Bumped on every change of `reservoir`
    version: u64,
}

impl BucketState {
    fn new(spec: &TierSpec, now: Instant) -> Self {
        Self {
            capacity: spec.capacity,
            window: spec.window,
            min_time: spec.min_time(),
            reservoir: spec.reservoir(),
            window_start: now,
            last_dispatch: None,
            version: 0,
        }
    }

    fn refill(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= self.window {
            self.window_start = now;
            self.reservoir = self.capacity;
            self.version += 1;
        }
    }

    /// Take one unit of the reservoir, or return how long to wait for one
    fn admit(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);

        if self.reservoir == 0 {
            return Err(wait_until(now, self.window_start, self.window));
        }
        if let Some(last) = self.last_dispatch {
            let wait = wait_until(now, last, self.min_time);
            if !wait.is_zero() {
                return Err(wait);
            }
        }

        self.reservoir -= 1;
        self.last_dispatch = Some(now);
        self.version += 1;
        Ok(())
    }
}

/// Time from `now` until `offset` after `start`.
///
/// Windows are advertised by the server and may not fit into an [`Instant`].
/// Such a deadline is treated as `offset` from now, which `tokio::time::sleep`
/// caps at its far future.
fn wait_until(now: Instant, start: Instant, offset: Duration) -> Duration {
    start
        .checked_add(offset)
        .map_or(offset, |deadline| deadline.saturating_duration_since(now))
}

/// A point-in-time view of a [`TokenBucket`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSnapshot {
    /// Requests allowed per window
    pub capacity: u64,
    /// Length of the window
    pub window: Duration,
    /// Minimum spacing between two dispatches
    pub min_time: Duration,
    /// Requests still available in the current window
    pub reservoir: u64,
    /// Requests waiting for admission
    pub queued: usize,
    /// Requests admitted but not finished
    pub running: usize,
    /// Version of the reservoir, for [`TokenBucket::compare_and_set_reservoir`]
    pub version: u64,
}

impl TokenBucket {
    /// Create a bucket from the advertised settings of one window
    #[must_use]
    pub fn new(id: impl Into<String>, spec: &TierSpec, config: &RateLimitConfig) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(BucketState::new(spec, Instant::now())),
            queue: tokio::sync::Mutex::new(()),
            slots: Arc::new(Semaphore::new(config.bucket_concurrency())),
            queued: AtomicUsize::new(0),
            running: Arc::new(AtomicUsize::new(0)),
            changed: Notify::new(),
            #[cfg(test)]
            contended: AtomicBool::new(false),
        }
    }

    /// Identifier of this bucket, e.g. `euw1_SUMMONER.GET_BY_PUUID_0`
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Requests admitted by this bucket that have not finished yet
    #[must_use]
    pub fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    /// Read the current settings and counters, refilling the reservoir if
    /// its window has passed
    #[must_use]
    pub fn snapshot(&self) -> BucketSnapshot {
        let mut state = self.lock();
        state.refill(Instant::now());
        BucketSnapshot {
            capacity: state.capacity,
            window: state.window,
            min_time: state.min_time,
            reservoir: state.reservoir,
            queued: self.queued.load(Ordering::Acquire),
            running: self.running(),
            version: state.version,
        }
    }

    /// Replace the reservoir if nothing changed it since `version` was read.
    ///
    /// The new value is capped at the capacity. Returns `false` if the
    /// version is stale.
    pub fn compare_and_set_reservoir(&self, version: u64, reservoir: u64) -> bool {
        let mut state = self.lock();
        #[cfg(test)]
        if self.contended.load(Ordering::Acquire) {
            state.version += 1;
        }
        if state.version != version {
            return false;
        }
        state.reservoir = reservoir.min(state.capacity);
        state.version += 1;
        drop(state);
        self.changed.notify_waiters();
        true
    }

    /// Apply freshly advertised settings. The current window restarts with
    /// the advertised reservoir.
    pub fn reconfigure(&self, spec: &TierSpec) {
        let mut state = self.lock();
        let version = state.version + 1;
        *state = BucketState {
            last_dispatch: state.last_dispatch,
            version,
            ..BucketState::new(spec, Instant::now())
        };
        drop(state);
        self.changed.notify_waiters();
    }

    /// Wait until this bucket admits a request.
    ///
    /// The request counts as running until the returned permit is dropped.
    ///
    /// # Panics
    ///
    /// Panics if the semaphore was closed (should never happen)
    pub async fn acquire(&self) -> BucketPermit {
        let queued = QueueGuard::enter(&self.queued);
        let turn = self.queue.lock().await;

        let slot = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            // SAFETY: this should not panic as we never close the semaphore
            .expect("Semaphore was closed unexpectedly");

        loop {
            // Register before reading the state so that a change in between is not missed
            let mut changed = pin!(self.changed.notified());
            changed.as_mut().enable();

            let wait = match self.lock().admit(Instant::now()) {
                Ok(()) => break,
                Err(wait) => wait,
            };
            log::debug!(
                "Bucket {} is exhausted, waiting {}ms",
                self.id,
                wait.as_millis()
            );
            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = changed => {}
            }
        }

        drop(turn);
        drop(queued);
        self.running.fetch_add(1, Ordering::AcqRel);
        BucketPermit {
            _slot: slot,
            running: Arc::clone(&self.running),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_contended(&self, contended: bool) {
        self.contended.store(contended, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        // The state is valid after every statement, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts a request as queued until it is admitted or its future is dropped
struct QueueGuard<'a>(&'a AtomicUsize);

impl<'a> QueueGuard<'a> {
    fn enter(queued: &'a AtomicUsize) -> Self {
        queued.fetch_add(1, Ordering::AcqRel);
        Self(queued)
    }
}

impl Drop for QueueGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Proof of admission by a [`TokenBucket`]
#[derive(Debug)]
pub struct BucketPermit {
    _slot: OwnedSemaphorePermit,
    running: Arc<AtomicUsize>,
}

impl Drop for BucketPermit {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    use super::TokenBucket;
    use crate::ratelimit::{RateLimitConfig, TierSpec};

    fn spec(capacity: u64, seconds: u64, count: u64) -> TierSpec {
        TierSpec {
            capacity,
            window: Duration::from_secs(seconds),
            count,
        }
    }

    fn bucket(capacity: u64, seconds: u64, count: u64) -> TokenBucket {
        TokenBucket::new("euw1_0", &spec(capacity, seconds, count), &RateLimitConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_time_spacing() {
        let bucket = bucket(10, 1, 0);
        let start = Instant::now();

        drop(bucket.acquire().await);
        drop(bucket.acquire().await);
        drop(bucket.acquire().await);

        assert_eq!(start.elapsed(), Duration::from_millis(400));
        assert_eq!(bucket.snapshot().reservoir, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_reservoir_waits_for_refill() {
        let bucket = bucket(2, 10, 2);
        let start = Instant::now();

        let permit = bucket.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert_eq!(bucket.snapshot().reservoir, 1);
        assert_eq!(bucket.running(), 1);

        drop(permit);
        assert_eq!(bucket.running(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_limit() {
        let bucket = Arc::new(bucket(100, 1, 0));
        let first = bucket.acquire().await;

        let waiting = {
            let bucket = Arc::clone(&bucket);
            tokio::spawn(async move { bucket.acquire().await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!waiting.is_finished());
        assert_eq!(bucket.snapshot().queued, 1);

        drop(first);
        let second = waiting.await.unwrap();
        assert_eq!(bucket.running(), 1);
        assert_eq!(bucket.snapshot().queued, 0);
        drop(second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifo_admission() {
        let bucket = Arc::new(bucket(100, 1, 0));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut handles = Vec::new();
        for i in 0..5 {
            let bucket = Arc::clone(&bucket);
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                let _permit = bucket.acquire().await;
                tx.send(i).unwrap();
            }));
            // let each task enter the queue before the next one is spawned
            tokio::task::yield_now().await;
        }
        for handle in handles {
            handle.await.unwrap();
        }
        drop(tx);

        let mut order = Vec::new();
        while let Some(i) = rx.recv().await {
            order.push(i);
        }
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_wakes_waiters() {
        let bucket = Arc::new(bucket(10, 60, 10));
        let waiting = {
            let bucket = Arc::clone(&bucket);
            tokio::spawn(async move { drop(bucket.acquire().await) })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!waiting.is_finished());

        bucket.reconfigure(&spec(20, 60, 5));
        waiting.await.unwrap();

        let snapshot = bucket.snapshot();
        assert_eq!(snapshot.capacity, 20);
        assert_eq!(snapshot.min_time, Duration::from_secs(3));
        // 20 - 5 advertised, minus the waiter
        assert_eq!(snapshot.reservoir, 14 - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_window_does_not_overflow() {
        let spaced = Arc::new(bucket(2, u64::MAX, 0));
        drop(spaced.acquire().await);

        // min_time is far beyond any Instant, the second request just waits
        let waiting = {
            let spaced = Arc::clone(&spaced);
            tokio::spawn(async move { drop(spaced.acquire().await) })
        };
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!waiting.is_finished());
        assert_eq!(spaced.snapshot().reservoir, 1);
        waiting.abort();

        let exhausted = Arc::new(bucket(1, u64::MAX, 1));
        let waiting = {
            let exhausted = Arc::clone(&exhausted);
            tokio::spawn(async move { drop(exhausted.acquire().await) })
        };
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!waiting.is_finished());
        waiting.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_request_leaves_the_queue() {
        let bucket = Arc::new(bucket(1, 60, 1));
        let waiting = {
            let bucket = Arc::clone(&bucket);
            tokio::spawn(async move { drop(bucket.acquire().await) })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(bucket.snapshot().queued, 1);

        waiting.abort();
        assert!(waiting.await.unwrap_err().is_cancelled());
        assert_eq!(bucket.snapshot().queued, 0);
    }

    #[test]
    fn test_compare_and_set_reservoir() {
        let bucket = bucket(10, 10, 2);
        let snapshot = bucket.snapshot();
        assert_eq!(snapshot.reservoir, 8);

        assert!(bucket.compare_and_set_reservoir(snapshot.version, 5));
        assert_eq!(bucket.snapshot().reservoir, 5);

        // stale version
        assert!(!bucket.compare_and_set_reservoir(snapshot.version, 1));
        assert_eq!(bucket.snapshot().reservoir, 5);

        // never above capacity
        let version = bucket.snapshot().version;
        assert!(bucket.compare_and_set_reservoir(version, 50));
        assert_eq!(bucket.snapshot().reservoir, 10);
    }
}
