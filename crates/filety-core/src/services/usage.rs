//! Usage quota calculation
//!
//! Pure functions combining the anonymous and authenticated quota records
//! into one remaining-time value. A logged-in user always takes priority
//! over the anonymous identity.

use serde::{Deserialize, Serialize};

use crate::models::{AnonymousIdentity, AuthenticatedUser, TariffPlan};

// ============================================================================
// Tariff limits
// ============================================================================

/// Daily allowance of the free plan, in seconds
pub const DAILY_LIMIT_FREE_SECS: i64 = 720;

/// Daily allowance of the plus plan, in seconds
pub const DAILY_LIMIT_PLUS_SECS: i64 = 3_600;

/// Daily allowance of the pro plan, in seconds
pub const DAILY_LIMIT_PRO_SECS: i64 = 6_000;

/// Daily allowance of a plan; `None` means unlimited
pub fn daily_limit_for_plan(plan: TariffPlan) -> Option<i64> {
    match plan {
        TariffPlan::Free => Some(DAILY_LIMIT_FREE_SECS),
        TariffPlan::Plus => Some(DAILY_LIMIT_PLUS_SECS),
        TariffPlan::Pro => Some(DAILY_LIMIT_PRO_SECS),
        TariffPlan::Premium => None,
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Which record a snapshot was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    User,
    Anonymous,
}

impl std::fmt::Display for UsageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageSource::User => write!(f, "user"),
            UsageSource::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// Derived view of the current quota; never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub source: UsageSource,
    pub used_seconds: i64,
    /// `None` for unlimited plans
    pub limit_seconds: Option<i64>,
    /// `max(0, limit - used)`, `None` for unlimited plans
    pub remaining_seconds: Option<i64>,
}

impl UsageSnapshot {
    /// Derive the snapshot from whatever records are known
    pub fn compute(
        anon: Option<&AnonymousIdentity>,
        user: Option<&AuthenticatedUser>,
    ) -> Option<Self> {
        if let Some(user) = user {
            let limit = daily_limit_for_plan(user.tariff_plan);
            return Some(Self {
                source: UsageSource::User,
                used_seconds: user.daily_used_seconds,
                limit_seconds: limit,
                remaining_seconds: limit.map(|l| clamp_remaining(l, user.daily_used_seconds)),
            });
        }

        anon.map(|anon| Self {
            source: UsageSource::Anonymous,
            used_seconds: anon.used_seconds,
            limit_seconds: Some(anon.limit_seconds),
            remaining_seconds: Some(clamp_remaining(anon.limit_seconds, anon.used_seconds)),
        })
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit_seconds.is_none()
    }

    pub fn is_depleted(&self) -> bool {
        is_depleted(self.remaining_seconds)
    }
}

fn clamp_remaining(limit: i64, used: i64) -> i64 {
    limit.saturating_sub(used).max(0)
}

/// Remaining seconds of the daily quota
///
/// `None` means "not determined yet" (no records, or an unlimited plan)
/// and is distinct from zero.
pub fn compute_remaining(
    anon: Option<&AnonymousIdentity>,
    user: Option<&AuthenticatedUser>,
) -> Option<i64> {
    UsageSnapshot::compute(anon, user).and_then(|s| s.remaining_seconds)
}

/// True iff the remaining time is known and not positive
pub fn is_depleted(remaining: Option<i64>) -> bool {
    matches!(remaining, Some(r) if r <= 0)
}

/// Human-readable duration: `1 h 05 min`, `3 min 20 s`, `45 s`
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{} h {:02} min", hours, minutes)
    } else if minutes > 0 {
        format!("{} min {:02} s", minutes, secs)
    } else {
        format!("{} s", secs)
    }
}
