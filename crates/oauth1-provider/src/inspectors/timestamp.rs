use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use oauth1_config::ProviderConfig;
use oauth1_core::parameters::names;
use oauth1_core::{Error, OAuthContext, OAuthError};

use super::ContextInspector;
use crate::store::ProviderPhase;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Rejects timestamps outside `[now - max_before_now, now + max_after_now]`.
///
/// Both bounds are inclusive.
#[derive(Clone)]
pub struct TimestampRangeInspector {
    max_before_now: TimeDelta,
    max_after_now: TimeDelta,
    now: Clock,
}

impl TimestampRangeInspector {
    pub fn new(max_before_now: TimeDelta, max_after_now: TimeDelta) -> Self {
        Self {
            max_before_now,
            max_after_now,
            now: Arc::new(Utc::now),
        }
    }

    /// Split `window` evenly around now.
    pub fn with_window(window: TimeDelta) -> Self {
        Self::new(window / 2, window / 2)
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            seconds(config.max_before_now_secs),
            seconds(config.max_after_now_secs),
        )
    }

    /// Replace the source of "now".
    #[must_use]
    pub fn with_clock(mut self, now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.now = Arc::new(now);
        self
    }

    fn timestamp(context: &OAuthContext) -> Result<DateTime<Utc>, OAuthError> {
        let raw = context
            .timestamp()
            .ok_or_else(|| OAuthError::missing_required_parameter(names::OAUTH_TIMESTAMP))?;
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| OAuthError::rejected_parameter(names::OAUTH_TIMESTAMP))
    }
}

impl ContextInspector for TimestampRangeInspector {
    fn inspect_context(
        &self,
        _phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        let timestamp = Self::timestamp(context)?;
        let now = (self.now)();
        let earliest = now
            .checked_sub_signed(self.max_before_now)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let latest = now
            .checked_add_signed(self.max_after_now)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        if timestamp < earliest {
            return Err(OAuthError::timestamp_too_old(
                self.max_before_now.num_seconds(),
                (earliest, latest),
            )
            .into());
        }
        if timestamp > latest {
            return Err(OAuthError::timestamp_too_far_in_future(
                self.max_after_now.num_seconds(),
                (earliest, latest),
            )
            .into());
        }
        Ok(())
    }
}

impl fmt::Debug for TimestampRangeInspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampRangeInspector")
            .field("max_before_now", &self.max_before_now)
            .field("max_after_now", &self.max_after_now)
            .finish_non_exhaustive()
    }
}

fn seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
