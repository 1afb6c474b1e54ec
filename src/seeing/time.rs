/// Local forecast time to UTC conversion
///
/// This is the only place where zone offsets and daylight-saving rules are
/// applied. Anything grouping readings by local day must re-derive the day
/// from the stored UTC instant with `local_date`.
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Resolve an IANA zone name, falling back to UTC for unknown names
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("Unknown timezone '{}', falling back to UTC", name);
        Tz::UTC
    })
}

/// Convert `hour:00` on `date` in `tz` to a UTC instant.
///
/// Ambiguous local times (clocks going back) take the earlier instant.
/// Non-existent local times (clocks going forward) are moved one hour later.
/// Returns `None` only when `hour` is not a valid hour of day.
pub fn local_hour_to_utc(date: NaiveDate, hour: u32, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0)?);

    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())?;

    Some(local.with_timezone(&Utc))
}

/// Local calendar day of a stored instant
pub fn local_date(ts: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}
