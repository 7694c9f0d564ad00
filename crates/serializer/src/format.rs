//! Scalar formatting rules
//!
//! Numbers, dates and strings must come out exactly as a JavaScript/Haxe
//! runtime would print them, since consumers parse the text with that
//! runtime's rules.

use crate::config::DateZone;
use crate::error::SerializeError;
use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Timelike, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is by URI-component escaping
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a string the way `encodeURIComponent` does
pub fn escape_string(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Write a number that is not a safe integer: `k`, `p`, `m` or `d<digits>`
pub fn write_unsafe_number(f: f64, buf: &mut String) {
    if f.is_nan() {
        buf.push('k');
    } else if f.is_infinite() {
        buf.push(if f > 0.0 { 'p' } else { 'm' });
    } else {
        buf.push('d');
        if f.fract() == 0.0 {
            buf.push_str(&exponential(f));
        } else {
            buf.push_str(&shortest_decimal(f));
        }
    }
}

/// Shortest round-trip decimal, switching to exponent form below 1e-6
/// like the JavaScript number printer.
fn shortest_decimal(f: f64) -> String {
    if f != 0.0 && f.abs() < 1e-6 {
        exponential(f)
    } else {
        f.to_string()
    }
}

/// Shortest-digit exponential with a signed exponent (`1.5e+21`, `1e-7`)
fn exponential(f: f64) -> String {
    let s = format!("{:e}", f);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}

/// Write `v` followed by `YYYY-MM-DD HH:MM:SS` in the requested timezone
pub fn write_date(
    date: &DateTime<Utc>,
    zone: DateZone,
    buf: &mut String,
) -> Result<(), SerializeError> {
    let text = match zone {
        DateZone::Utc => date_text(date),
        DateZone::Local => date_text(&date.with_timezone(&Local)),
        DateZone::Fixed(seconds) => {
            let offset =
                FixedOffset::east_opt(seconds).ok_or(SerializeError::InvalidTimezone(seconds))?;
            date_text(&date.with_timezone(&offset))
        }
    };
    buf.push('v');
    buf.push_str(&text);
    Ok(())
}

/// The year is always four digits: the last four of the calendar year
fn date_text<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        date.year().rem_euclid(10_000),
        date.month(),
        date.day(),
        date.hour(),
        date.minute(),
        date.second()
    )
}
