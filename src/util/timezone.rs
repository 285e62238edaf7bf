//! Conversions between UTC instants and calendar dates in a named timezone.

use chrono::{DateTime, Datelike, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use time::{Date, Month, OffsetDateTime, UtcOffset};

pub fn localized_datetime(instant: OffsetDateTime, tz: Tz) -> DateTime<Tz> {
    let utc = instant.to_offset(UtcOffset::UTC);
    let datetime_utc = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    tz.from_utc_datetime(&datetime_utc.naive_utc())
}

/// The calendar date an observer in `tz` sees at `instant`.
pub fn localized_date(instant: OffsetDateTime, tz: Tz) -> Date {
    let localized = localized_datetime(instant, tz);
    Month::try_from(localized.month() as u8)
        .ok()
        .and_then(|month| {
            Date::from_calendar_date(localized.year(), month, localized.day() as u8).ok()
        })
        .unwrap_or_else(|| instant.date())
}

/// The UTC instant at which `date` begins in `tz`.
pub fn start_of_local_day(date: Date, tz: Tz) -> OffsetDateTime {
    let naive = NaiveDate::from_ymd_opt(
        date.year(),
        u8::from(date.month()).into(),
        date.day().into(),
    )
    .and_then(|day| day.and_hms_opt(0, 0, 0));
    let Some(naive) = naive else {
        return date.midnight().assume_utc();
    };

    let timestamp = match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.timestamp(),
        // Midnight skipped by a DST jump; fall back to the offset in force that day.
        None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix().local_minus_utc();
            naive.and_utc().timestamp() - i64::from(offset)
        }
    };

    OffsetDateTime::from_unix_timestamp(timestamp)
        .unwrap_or_else(|_| date.midnight().assume_utc())
}
