use chrono::{DateTime, Duration, Utc};

/// Whole seconds left until `ends_at`, clamped to zero once the deadline has
/// passed. Captured on pause so the stale `ends_at` can be discarded.
pub fn remaining_seconds(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (ends_at - now).num_seconds().max(0)
}

/// Fresh absolute deadline for a resumed session: paused wall time must not
/// count against the learner.
pub fn deadline_after(now: DateTime<Utc>, remaining_sec: i64) -> DateTime<Utc> {
    now + Duration::seconds(remaining_sec.max(0))
}
