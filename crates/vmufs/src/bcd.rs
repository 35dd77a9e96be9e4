//! Binary-coded decimal, as used by the root block and directory timestamps.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// The format only records years 2000-2099.
pub const CENTURY: u8 = 20;

pub const TIMESTAMP_LEN: usize = 8;

/// Encodes `0..=99` as two decimal nibbles.
pub fn encode(value: u8) -> Option<u8> {
    if value > 99 {
        return None;
    }
    Some(((value / 10) << 4) | (value % 10))
}

pub fn decode(byte: u8) -> Option<u8> {
    let (high, low) = (byte >> 4, byte & 0x0F);
    if high > 9 || low > 9 {
        return None;
    }
    Some(high * 10 + low)
}

/// Packs a timestamp as `[century, year, month, day, hour, minute, second, weekday]`.
///
/// The weekday counts from Monday = 0. A leap second (chrono's nanosecond
/// overflow) is stored as second 60.
pub fn encode_timestamp(timestamp: &NaiveDateTime) -> [u8; TIMESTAMP_LEN] {
    let second = if timestamp.nanosecond() >= 1_000_000_000 {
        60
    } else {
        timestamp.second()
    };
    let fields = [
        CENTURY as u32,
        timestamp.year().rem_euclid(100) as u32,
        timestamp.month(),
        timestamp.day(),
        timestamp.hour(),
        timestamp.minute(),
        second,
        timestamp.weekday().num_days_from_monday(),
    ];

    // Every field above is at most 99 by construction.
    fields.map(|field| encode(field as u8).unwrap_or(0))
}

/// Reverses [`encode_timestamp`]. The stored weekday is ignored. Returns
/// `None` for malformed nibbles or an impossible date.
pub fn decode_timestamp(bytes: &[u8]) -> Option<NaiveDateTime> {
    if bytes.len() < TIMESTAMP_LEN {
        return None;
    }
    let mut fields = [0u8; 7];
    for (field, byte) in fields.iter_mut().zip(bytes.iter()) {
        *field = decode(*byte)?;
    }
    let [century, year, month, day, hour, minute, second] = fields;
    let year = century as i32 * 100 + year as i32;
    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)?;
    if second == 60 {
        date.and_hms_milli_opt(hour as u32, minute as u32, 59, 1_000)
    } else {
        date.and_hms_opt(hour as u32, minute as u32, second as u32)
    }
}
