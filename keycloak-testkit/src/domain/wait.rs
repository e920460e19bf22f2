//! Polling condition evaluation.
//!
//! A [`WaitSpec`] describes one bounded poll loop: the value a condition is
//! expected to reach, how long to keep trying and how long to pause between
//! two evaluations. The evaluator always evaluates the condition at least
//! once, even when the maximum duration is zero, and never sleeps past the
//! deadline. Reaching the deadline without a match is reported as `false`,
//! never as an error.
//!
//! ```
//! use std::time::Duration;
//! use keycloak_testkit::domain::wait::ConditionMatcher;
//!
//! let matcher = ConditionMatcher::is_true_within(Duration::from_millis(200));
//! assert!(matcher.matches(|| true));
//! ```

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::errors::WaitError;

/// Pause between two evaluations when none is given.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest pause between two evaluations; a zero interval is raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// Far enough to never be reached by a test run.
const DISTANT_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Immutable parameters of a single poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    expected: bool,
    max_duration: Duration,
    interval: Duration,
}

impl WaitSpec {
    /// Evaluate exactly once.
    pub fn new(expected: bool) -> Self {
        Self::within(expected, Duration::ZERO)
    }

    pub fn within(expected: bool, max_duration: Duration) -> Self {
        Self::within_every(expected, max_duration, DEFAULT_POLL_INTERVAL)
    }

    pub fn within_every(expected: bool, max_duration: Duration, interval: Duration) -> Self {
        Self {
            expected,
            max_duration,
            interval,
        }
    }

    pub fn expected(&self) -> bool {
        self.expected
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Pause to apply before the next evaluation, or `None` once the deadline is reached.
    /// Never shorter than [`MIN_POLL_INTERVAL`] unless the deadline is closer.
    fn next_pause(&self, remaining: Option<Duration>) -> Option<Duration> {
        match remaining {
            Some(remaining) if !remaining.is_zero() => {
                Some(self.interval.max(MIN_POLL_INTERVAL).min(remaining))
            }
            _ => None,
        }
    }
}

fn deadline_after(start: Instant, max_duration: Duration) -> Instant {
    start
        .checked_add(max_duration)
        .unwrap_or_else(|| start + DISTANT_FUTURE)
}

fn run_poll_loop<E>(
    spec: &WaitSpec,
    mut condition: impl FnMut() -> Result<bool, E>,
    mut sleep: impl FnMut(Duration) -> Result<(), E>,
) -> Result<bool, E> {
    let deadline = deadline_after(Instant::now(), spec.max_duration);
    loop {
        if condition()? == spec.expected {
            return Ok(true);
        }
        let remaining = deadline.checked_duration_since(Instant::now());
        match spec.next_pause(remaining) {
            Some(pause) => sleep(pause)?,
            None => return Ok(false),
        }
    }
}

/// Block the calling thread until `condition` returns the expected value or
/// the deadline passes.
pub fn evaluate(mut condition: impl FnMut() -> bool, spec: &WaitSpec) -> bool {
    let outcome = run_poll_loop::<Infallible>(
        spec,
        || Ok(condition()),
        |pause| {
            thread::sleep(pause);
            Ok(())
        },
    );
    match outcome {
        Ok(matched) => matched,
        Err(never) => match never {},
    }
}

/// Same as [`evaluate`] for a fallible condition. The first error stops the
/// wait and is returned as [`WaitError::Condition`].
pub fn try_evaluate<E>(
    mut condition: impl FnMut() -> Result<bool, E>,
    spec: &WaitSpec,
) -> Result<bool, WaitError<E>> {
    run_poll_loop(
        spec,
        || condition().map_err(WaitError::Condition),
        |pause| {
            thread::sleep(pause);
            Ok(())
        },
    )
}

/// Same as [`evaluate`], but every pause can be cut short through `interrupter`.
/// An interruption ends the wait with [`WaitError::Interrupted`].
pub fn evaluate_interruptible(
    mut condition: impl FnMut() -> bool,
    spec: &WaitSpec,
    interrupter: &Interrupter,
) -> Result<bool, WaitError<Infallible>> {
    run_poll_loop(spec, || Ok(condition()), |pause| interrupter.sleep(pause))
}

/// Async flavour of [`evaluate`]. Dropping the future cancels the wait.
pub async fn evaluate_async<F, Fut>(mut condition: F, spec: &WaitSpec) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let outcome = try_evaluate_async::<_, _, Infallible>(
        || {
            let check = condition();
            async move { Ok(check.await) }
        },
        spec,
    )
    .await;
    match outcome {
        Ok(matched) => matched,
        Err(WaitError::Condition(never)) => match never {},
        Err(WaitError::Interrupted) => false,
    }
}

/// Async flavour of [`try_evaluate`].
pub async fn try_evaluate_async<F, Fut, E>(
    mut condition: F,
    spec: &WaitSpec,
) -> Result<bool, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let start = tokio::time::Instant::now();
    let deadline = start
        .checked_add(spec.max_duration)
        .unwrap_or_else(|| start + DISTANT_FUTURE);
    loop {
        if condition().await.map_err(WaitError::Condition)? == spec.expected {
            return Ok(true);
        }
        let remaining = deadline.checked_duration_since(tokio::time::Instant::now());
        match spec.next_pause(remaining) {
            Some(pause) => tokio::time::sleep(pause).await,
            None => return Ok(false),
        }
    }
}

/// Named constructors for the usual "condition should become true/false" waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionMatcher {
    spec: WaitSpec,
}

impl ConditionMatcher {
    pub fn is_true() -> Self {
        Self::from(WaitSpec::new(true))
    }

    pub fn is_true_within(timeout: Duration) -> Self {
        Self::from(WaitSpec::within(true, timeout))
    }

    pub fn is_true_within_every(timeout: Duration, interval: Duration) -> Self {
        Self::from(WaitSpec::within_every(true, timeout, interval))
    }

    pub fn is_false() -> Self {
        Self::from(WaitSpec::new(false))
    }

    pub fn is_false_within(timeout: Duration) -> Self {
        Self::from(WaitSpec::within(false, timeout))
    }

    pub fn is_false_within_every(timeout: Duration, interval: Duration) -> Self {
        Self::from(WaitSpec::within_every(false, timeout, interval))
    }

    pub fn spec(&self) -> &WaitSpec {
        &self.spec
    }

    pub fn matches(&self, condition: impl FnMut() -> bool) -> bool {
        evaluate(condition, &self.spec)
    }

    pub async fn matches_async<F, Fut>(&self, condition: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        evaluate_async(condition, &self.spec).await
    }

    /// Human readable expectation, used in assertion messages.
    pub fn describe(&self) -> String {
        let mut text = format!("Input is expected to be {}", self.spec.expected);
        let millis = self.spec.max_duration.as_millis();
        if millis > 0 {
            text.push_str(&format!(" in less than {millis}ms"));
        }
        text
    }
}

impl From<WaitSpec> for ConditionMatcher {
    fn from(spec: WaitSpec) -> Self {
        Self { spec }
    }
}

impl fmt::Display for ConditionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Cancellation handle for blocking waits.
///
/// Once [`interrupt`](Interrupter::interrupt) has been called every pending
/// and future sleep on this handle fails until [`reset`](Interrupter::reset).
#[derive(Debug, Clone, Default)]
pub struct Interrupter {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Interrupter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        let (flag, wakeup) = &*self.state;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wakeup.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        let (flag, _) = &*self.state;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset(&self) {
        let (flag, _) = &*self.state;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    fn sleep<E>(&self, pause: Duration) -> Result<(), WaitError<E>> {
        let (flag, wakeup) = &*self.state;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = wakeup
            .wait_timeout_while(guard, pause, |interrupted| !*interrupted)
            .unwrap_or_else(PoisonError::into_inner);
        if *guard {
            Err(WaitError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Sleep-first wait: pause one step, then ask `should_stop`.
///
/// Returns `true` as soon as `should_stop` does, `false` once `max_duration`
/// has elapsed.
pub fn pause_until(
    max_duration: Duration,
    interval: Duration,
    mut should_stop: impl FnMut() -> bool,
) -> bool {
    let step = WaitSpec::within_every(true, max_duration, interval);
    let deadline = deadline_after(Instant::now(), max_duration);
    while let Some(pause) = step.next_pause(deadline.checked_duration_since(Instant::now())) {
        thread::sleep(pause);
        if should_stop() {
            return true;
        }
    }
    false
}

/// Async flavour of [`pause_until`].
pub async fn pause_until_async<F, Fut>(
    max_duration: Duration,
    interval: Duration,
    mut should_stop: F,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let step = WaitSpec::within_every(true, max_duration, interval);
    let start = tokio::time::Instant::now();
    let deadline = start
        .checked_add(max_duration)
        .unwrap_or_else(|| start + DISTANT_FUTURE);
    while let Some(pause) =
        step.next_pause(deadline.checked_duration_since(tokio::time::Instant::now()))
    {
        tokio::time::sleep(pause).await;
        if should_stop().await {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_never_pauses() {
        let spec = WaitSpec::new(true);
        assert_eq!(spec.next_pause(Some(Duration::ZERO)), None);
        assert_eq!(spec.next_pause(None), None);
    }

    #[test]
    fn pause_is_clamped_to_remaining_time() {
        let spec = WaitSpec::within_every(true, Duration::from_secs(1), Duration::from_millis(100));
        assert_eq!(
            spec.next_pause(Some(Duration::from_millis(30))),
            Some(Duration::from_millis(30))
        );
        assert_eq!(
            spec.next_pause(Some(Duration::from_millis(500))),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn zero_interval_still_pauses() {
        let spec = WaitSpec::within_every(true, Duration::from_secs(1), Duration::ZERO);
        assert_eq!(spec.next_pause(Some(Duration::from_millis(500))), Some(MIN_POLL_INTERVAL));
        assert_eq!(
            spec.next_pause(Some(Duration::from_micros(200))),
            Some(Duration::from_micros(200))
        );
    }

    #[test]
    fn interrupter_cuts_sleep_short() {
        let interrupter = Interrupter::new();
        interrupter.interrupt();
        let started = Instant::now();
        let result: Result<(), WaitError<Infallible>> = interrupter.sleep(Duration::from_secs(5));
        assert!(matches!(result, Err(WaitError::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
