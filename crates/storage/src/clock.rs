#![forbid(unsafe_code)]

use super::StoreError;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

/// Server-local wall clock; falls back to UTC when the local offset is unknown.
pub(crate) fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub(crate) fn now_ms() -> i64 {
    unix_ms(OffsetDateTime::now_utc())
}

pub(crate) fn unix_ms(at: OffsetDateTime) -> i64 {
    let ms = at.unix_timestamp_nanos() / 1_000_000i128;
    if ms <= 0 {
        0
    } else if ms >= i64::MAX as i128 {
        i64::MAX
    } else {
        ms as i64
    }
}

pub(crate) fn format_date(date: Date) -> Result<String, StoreError> {
    Ok(date.format(format_description!("[year]-[month]-[day]"))?)
}

pub(crate) fn format_hh_mm(time: Time) -> Result<String, StoreError> {
    Ok(time.format(format_description!("[hour]:[minute]"))?)
}
