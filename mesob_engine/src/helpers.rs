use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// The `[start, end)` pair covering the whole of `day`, UTC.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default());
    (start, start + chrono::Duration::days(1))
}

/// The `[start, end)` pair covering one hour of `day`, UTC. Hours above 23 clamp to 23.
pub fn hour_bounds(day: NaiveDate, hour: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let hour = hour.min(23);
    let start = Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap_or_default());
    (start, start + chrono::Duration::hours(1))
}
