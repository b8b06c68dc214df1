use chrono::{DateTime, Utc};
use windows::Win32::Foundation::FILETIME;

/// Null-terminated UTF-16 rendering of `s`, as expected by the wide-string
/// Win32 entry points.
pub fn to_wide_null_terminated(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Converts a FILETIME (100 ns ticks since 1601-01-01 UTC) into a
/// `DateTime<Utc>`. Values before the Unix epoch clamp to the epoch.
pub fn filetime_to_datetime(ft: FILETIME) -> DateTime<Utc> {
    const FILETIME_UNIX_EPOCH: u64 = 116_444_736_000_000_000;
    const TICKS_PER_SECOND: u64 = 10_000_000;

    let ticks = ((ft.dwHighDateTime as u64) << 32) | (ft.dwLowDateTime as u64);
    let unix_seconds = ticks.saturating_sub(FILETIME_UNIX_EPOCH) / TICKS_PER_SECOND;
    DateTime::from_timestamp(unix_seconds as i64, 0)
        .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
}
