//! Timestamp fields and their layouts.
//!
//! A field's `format` tag selects the layout used to parse it:
//!
//! - no tag: RFC 3339 (`2019-05-06T10:00:00+02:00`).
//! - a symbolic name: `ANSIC`, `UnixDate`, `RubyDate`, `RFC822`, `RFC822Z`,
//!   `RFC850`, `RFC1123`, `RFC1123Z`, `RFC3339`, `RFC3339Nano`, `Kitchen`,
//!   `Stamp`, `StampMilli`, `StampMicro`, `StampNano`.
//! - a chrono strftime pattern, recognised by containing `%` (`%Y-%m-%d`).
//! - a reference-date layout written as the moment `Mon Jan 2 15:04:05 MST 2006`
//!   would appear (`2006-01-02`, `15:04`, `Jan _2`), translated to strftime.
//!
//! Layouts that carry no offset parse as UTC. Missing time parts default to
//! midnight, a missing year to year 0 and a missing date to `0000-01-01`.

use std::fmt::Write as _;

use chrono::format::ParseErrorKind;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use thiserror::Error;

pub const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%:z";
pub const RFC3339_NANO: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";

/// Timestamp parse failure, carrying the layout that was actually tried.
#[derive(Debug, Error)]
#[error("parsing time '{value}' as '{layout}': {source}")]
pub struct TimestampError {
    pub value: String,
    pub layout: String,
    pub source: chrono::ParseError,
}

/// A field that holds a point in time.
pub trait Timestamp {
    fn assign(&mut self, parsed: DateTime<FixedOffset>);

    fn get(&self) -> DateTime<FixedOffset>;
}

impl Timestamp for DateTime<FixedOffset> {
    fn assign(&mut self, parsed: DateTime<FixedOffset>) {
        *self = parsed;
    }

    fn get(&self) -> DateTime<FixedOffset> {
        *self
    }
}

impl Timestamp for DateTime<Utc> {
    fn assign(&mut self, parsed: DateTime<FixedOffset>) {
        *self = parsed.with_timezone(&Utc);
    }

    fn get(&self) -> DateTime<FixedOffset> {
        self.fixed_offset()
    }
}

impl Timestamp for NaiveDateTime {
    fn assign(&mut self, parsed: DateTime<FixedOffset>) {
        *self = parsed.naive_local();
    }

    fn get(&self) -> DateTime<FixedOffset> {
        self.and_utc().fixed_offset()
    }
}

/// Resolve a layout tag to a strftime pattern.
pub fn resolve_layout(tag: Option<&str>) -> String {
    let tag = match tag {
        None | Some("") => return RFC3339.to_string(),
        Some(t) => t,
    };
    let named = match tag {
        "ANSIC" => "%a %b %e %H:%M:%S %Y",
        "UnixDate" => "%a %b %e %H:%M:%S %Z %Y",
        "RubyDate" => "%a %b %d %H:%M:%S %z %Y",
        "RFC822" => "%d %b %y %H:%M %Z",
        "RFC822Z" => "%d %b %y %H:%M %z",
        "RFC850" => "%A, %d-%b-%y %H:%M:%S %Z",
        "RFC1123" => "%a, %d %b %Y %H:%M:%S %Z",
        "RFC1123Z" => "%a, %d %b %Y %H:%M:%S %z",
        "RFC3339" => RFC3339,
        "RFC3339Nano" => RFC3339_NANO,
        "Kitchen" => "%I:%M%p",
        "Stamp" => "%b %e %H:%M:%S",
        "StampMilli" => "%b %e %H:%M:%S%.3f",
        "StampMicro" => "%b %e %H:%M:%S%.6f",
        "StampNano" => "%b %e %H:%M:%S%.9f",
        custom if custom.contains('%') => custom,
        reference => return translate_reference_layout(reference),
    };
    named.to_string()
}

/// Parse `literal` with the layout named by `tag` and store it in `dest`.
///
/// Returns the resolved strftime pattern.
pub fn set_time(
    dest: &mut dyn Timestamp,
    literal: &str,
    tag: Option<&str>,
) -> Result<String, TimestampError> {
    let layout = resolve_layout(tag);
    match parse_with_layout(literal, &layout) {
        Ok(parsed) => {
            dest.assign(parsed);
            Ok(layout)
        }
        Err(source) => Err(TimestampError {
            value: literal.to_string(),
            layout,
            source,
        }),
    }
}

/// Render a timestamp with the layout named by `tag`.
pub fn render(ts: &dyn Timestamp, tag: Option<&str>) -> String {
    let layout = resolve_layout(tag);
    let dt = ts.get();
    if layout == RFC3339 {
        return dt.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    if layout == RFC3339_NANO {
        return dt.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    }
    // `%#z` only exists for parsing.
    let pattern = layout.replace("%#z", "%:z");
    let mut out = String::new();
    if write!(out, "{}", dt.format(&pattern)).is_err() {
        return dt.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    out
}

fn parse_with_layout(
    literal: &str,
    layout: &str,
) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    if layout == RFC3339 || layout == RFC3339_NANO {
        return DateTime::parse_from_rfc3339(literal);
    }

    let err = match DateTime::parse_from_str(literal, layout) {
        Ok(dt) => return Ok(dt),
        Err(e) if e.kind() != ParseErrorKind::NotEnough => return Err(e),
        Err(e) => e,
    };

    match NaiveDateTime::parse_from_str(literal, layout) {
        Ok(naive) => return Ok(naive.and_utc().fixed_offset()),
        Err(e) if e.kind() != ParseErrorKind::NotEnough => return Err(e),
        Err(_) => {}
    }

    match NaiveDate::parse_from_str(literal, layout) {
        Ok(date) => return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset()),
        Err(e) if e.kind() != ParseErrorKind::NotEnough => return Err(e),
        Err(_) => {}
    }

    // No year, or no date at all.
    for (prefix, prefix_layout) in [("0000 ", "%Y "), ("0000-01-01 ", "%Y-%m-%d ")] {
        let padded = format!("{prefix}{literal}");
        let padded_layout = format!("{prefix_layout}{layout}");
        if let Ok(naive) = NaiveDateTime::parse_from_str(&padded, &padded_layout) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    Err(err)
}

/// Reference-layout tokens in match priority order.
const REFERENCE_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Jan", "%b"),
    ("Monday", "%A"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("2006", "%Y"),
    ("Z07:00", "%#z"),
    ("Z0700", "%#z"),
    ("Z07", "%#z"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("-07", "%#z"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("_2", "%e"),
    ("15", "%H"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("1", "%m"),
    ("2", "%d"),
    ("3", "%I"),
    ("4", "%M"),
    ("5", "%S"),
];

/// Translate a reference-date layout (`2006-01-02 15:04`) into strftime.
pub fn translate_reference_layout(layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;

    'scan: while !rest.is_empty() {
        if let Some(width) = fraction_width(rest) {
            match (rest.as_bytes()[1], width) {
                (b'0', 3) => out.push_str("%.3f"),
                (b'0', 6) => out.push_str("%.6f"),
                (b'0', 9) => out.push_str("%.9f"),
                _ => out.push_str("%.f"),
            }
            rest = &rest[width + 1..];
            continue;
        }
        for (token, spec) in REFERENCE_TOKENS {
            if let Some(r) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = r;
                continue 'scan;
            }
        }
        let ch = rest.chars().next().unwrap_or_default();
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Length of a `.000`/`.999` fractional-second run at the start of `s`.
fn fraction_width(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'.' || !matches!(bytes[1], b'0' | b'9') {
        return None;
    }
    let digit = bytes[1];
    let width = bytes[1..].iter().take_while(|b| **b == digit).count();
    match bytes.get(1 + width) {
        Some(b) if b.is_ascii_digit() => None,
        _ => Some(width),
    }
}

/// Parse a timestamp written in a config file: RFC 3339, a local date-time
/// (`2010-08-10T10:00:00` or with a space) as UTC, or a bare date as midnight UTC.
pub fn parse_file_timestamp(literal: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let mut last = match DateTime::parse_from_rfc3339(literal) {
        Ok(dt) => return Ok(dt),
        Err(e) => e,
    };
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d"] {
        match parse_with_layout(literal, layout) {
            Ok(dt) => return Ok(dt),
            Err(e) => last = e,
        }
    }
    Err(last)
}

/// Serde adapter for timestamp fields in config files.
///
/// ```ignore
/// #[serde(with = "fieldfig::timestamp::serde")]
/// pub started: DateTime<Utc>,
/// ```
///
/// Accepts everything [`parse_file_timestamp`] does and writes RFC 3339,
/// keeping any fractional seconds.
pub mod serde {
    use chrono::SecondsFormat;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    pub fn serialize<T: Timestamp, S: Serializer>(ts: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.get().to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: Timestamp + Default,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let parsed = super::parse_file_timestamp(&raw)
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{raw}': {e}")))?;
        let mut out = T::default();
        out.assign(parsed);
        Ok(out)
    }
}
