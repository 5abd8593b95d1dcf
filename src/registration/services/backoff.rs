//! Exponential backoff scheduling for recoverable registration failures.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tokio::task::AbortHandle;

use crate::registration::domain::{AttemptTicket, ProviderName};

/// Callback invoked when a retry timer fires.
///
/// The runtime implementation enqueues the ticket onto the worker channel so
/// the retry re-enters the orchestrator through its serialized entry point.
pub type RetryFn = Arc<dyn Fn(AttemptTicket) + Send + Sync>;

/// Backoff tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl BackoffConfig {
    /// Default delay before the first retry.
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
    /// Default ceiling on any single delay.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(600);

    /// Creates a configuration without jitter.
    #[must_use]
    pub const fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
            jitter: false,
        }
    }

    /// Enables or disables full jitter.
    #[must_use]
    pub const fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before the first retry.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Ceiling on any single delay.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Whether delays are jittered.
    #[must_use]
    pub const fn jitter(&self) -> bool {
        self.jitter
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_DELAY, Self::DEFAULT_MAX_DELAY)
    }
}

/// Computes retry delays from a [`BackoffConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    config: BackoffConfig,
}

impl BackoffPolicy {
    /// Creates a policy for `config`.
    #[must_use]
    pub const fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    /// Returns the underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Deterministic delay `min(base * 2^attempt, max)`.
    ///
    /// Saturates at the ceiling instead of overflowing.
    #[must_use]
    pub fn ceiling_for(&self, attempt: u32) -> Duration {
        2_u32
            .checked_pow(attempt)
            .and_then(|factor| self.config.base_delay.checked_mul(factor))
            .map_or(self.config.max_delay, |delay| {
                delay.min(self.config.max_delay)
            })
    }

    /// Delay to wait before retry number `attempt`.
    ///
    /// With jitter enabled the result is sampled uniformly from
    /// `[0, ceiling_for(attempt))`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling_for(attempt);
        if !self.config.jitter {
            return ceiling;
        }
        let nanos = u64::try_from(ceiling.as_nanos()).unwrap_or(u64::MAX);
        if nanos == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(fastrand::u64(0..nanos))
    }
}

/// A pending retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffTimer {
    ticket: AttemptTicket,
    attempt: u32,
    delay: Duration,
    fire_at: DateTime<Utc>,
}

impl BackoffTimer {
    /// Ticket the timer will present when it fires.
    #[must_use]
    pub const fn ticket(&self) -> &AttemptTicket {
        &self.ticket
    }

    /// Attempt number the delay was computed for.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Scheduled delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Wall-clock time at which the timer is due.
    #[must_use]
    pub const fn fire_at(&self) -> DateTime<Utc> {
        self.fire_at
    }
}

#[derive(Debug)]
struct PendingRetry {
    timer: BackoffTimer,
    handle: AbortHandle,
}

/// Owns the single pending retry timer of an orchestrator.
///
/// Scheduling a retry cancels the previous one. Cancellation aborts the
/// sleeping task, but a timer that already fired may still have its ticket
/// queued; [`Self::take_fired`] only accepts the ticket of the timer that is
/// still pending, so such late deliveries are no-ops.
pub struct BackoffScheduler<C>
where
    C: Clock + Send + Sync,
{
    policy: BackoffPolicy,
    clock: Arc<C>,
    on_fire: RetryFn,
    pending: Option<PendingRetry>,
}

impl<C> BackoffScheduler<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a scheduler that calls `on_fire` when a timer elapses.
    #[must_use]
    pub fn new(policy: BackoffPolicy, clock: Arc<C>, on_fire: RetryFn) -> Self {
        Self {
            policy,
            clock,
            on_fire,
            pending: None,
        }
    }

    /// Returns the delay policy.
    #[must_use]
    pub const fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Schedules a retry for `ticket`, replacing any pending timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule_retry(&mut self, ticket: AttemptTicket, attempt: u32) -> BackoffTimer {
        self.cancel_all();
        let delay = self.policy.delay_for(attempt);
        let now = self.clock.utc();
        let fire_at = TimeDelta::from_std(delay)
            .ok()
            .and_then(|offset| now.checked_add_signed(offset))
            .unwrap_or(now);
        let timer = BackoffTimer {
            ticket,
            attempt,
            delay,
            fire_at,
        };

        let on_fire = Arc::clone(&self.on_fire);
        let fired = timer.ticket.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(fired);
        })
        .abort_handle();

        tracing::debug!(
            provider = %timer.ticket.provider(),
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            token = %timer.ticket.token(),
            "scheduled registration retry"
        );
        self.pending = Some(PendingRetry {
            timer: timer.clone(),
            handle,
        });
        timer
    }

    /// Cancels the pending timer when it targets `provider`.
    ///
    /// Returns `true` when a timer was cancelled.
    pub fn cancel(&mut self, provider: &ProviderName) -> bool {
        let targets = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.timer.ticket.provider() == provider);
        if targets {
            self.cancel_all();
        }
        targets
    }

    /// Cancels whatever timer is pending.
    pub fn cancel_all(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            tracing::debug!(
                provider = %pending.timer.ticket.provider(),
                token = %pending.timer.ticket.token(),
                "cancelled registration retry"
            );
        }
    }

    /// Claims the pending timer if `ticket` belongs to it.
    ///
    /// Returns `None` for tickets of cancelled or replaced timers.
    pub fn take_fired(&mut self, ticket: &AttemptTicket) -> Option<BackoffTimer> {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.timer.ticket == *ticket)
        {
            return self.pending.take().map(|pending| pending.timer);
        }
        None
    }

    /// Returns the pending timer, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&BackoffTimer> {
        self.pending.as_ref().map(|pending| &pending.timer)
    }
}

impl<C> Drop for BackoffScheduler<C>
where
    C: Clock + Send + Sync,
{
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}
