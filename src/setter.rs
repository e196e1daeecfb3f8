//! String-to-field conversion.
//!
//! [`set_field`] writes one external string into one slot. The literal that
//! means "zero" for the slot's kind (`"0"` for numbers and durations, `""`
//! otherwise) leaves the field untouched, so a source can never reset a field
//! back to its zero value.

use crate::duration::parse_duration;
use crate::error::SetError;
use crate::timestamp::set_time;
use crate::value::{Slot, Value};

/// Convert `raw` into the value's type and store it.
pub fn set_value<T: Value + ?Sized>(
    value: &mut T,
    raw: &str,
    format: Option<&str>,
) -> Result<(), SetError> {
    set_field(value.slot(), raw, format)
}

/// Convert `raw` into the slot's type and store it.
///
/// `format` is the field's layout tag; only timestamps read it.
pub fn set_field(slot: Slot<'_>, raw: &str, format: Option<&str>) -> Result<(), SetError> {
    if raw == slot.zero_literal() {
        return Ok(());
    }

    match slot {
        Slot::Str(s) => *s = raw.to_string(),
        Slot::Path(p) => *p = raw.into(),
        Slot::Bool(b) => {
            *b = match raw.to_lowercase().as_str() {
                "true" => true,
                "false" | "" => false,
                _ => return Err(SetError::AmbiguousBool(raw.to_string())),
            }
        }
        Slot::Int(n) | Slot::Uint(n) => n.parse_in(raw).map_err(|source| SetError::Int {
            value: raw.to_string(),
            source,
        })?,
        Slot::Float(f) => f.parse_in(raw).map_err(|source| SetError::Float {
            value: raw.to_string(),
            source,
        })?,
        Slot::Duration(d) => {
            *d = match parse_duration(raw) {
                Ok(parsed) => parsed,
                // A bare integer is a count of nanoseconds.
                Err(err) => match raw.parse::<i64>().ok().and_then(|n| u64::try_from(n).ok()) {
                    Some(nanos) => std::time::Duration::from_nanos(nanos),
                    None => return Err(err.into()),
                },
            }
        }
        Slot::Timestamp(t) => {
            set_time(t, raw, format)?;
        }
        Slot::Text(t) | Slot::NumericText(t) => {
            t.parse_text(raw).map_err(|source| SetError::Text {
                value: raw.to_string(),
                source,
            })?
        }
        Slot::Pointer(p) => p.populate(raw, format)?,
        Slot::Slice(s) | Slot::Array(s) => s.assign(&split_list(raw), format)?,
        Slot::Opaque => {}
        Slot::Unsupported(kind) => return Err(SetError::Unsupported(kind)),
    }
    Ok(())
}

/// Split a list literal: `1,2,3`, `[1, 2, 3]`, `["a", 'b']`.
pub(crate) fn split_list(raw: &str) -> Vec<&str> {
    let inner = raw.strip_prefix('[').unwrap_or(raw);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner
        .split(',')
        .map(|token| token.trim().trim_matches(|c| c == '"' || c == '\''))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::path::PathBuf;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};

    // --- zero literals ---

    #[test]
    fn zero_literal_leaves_numbers_untouched() {
        let mut n = 7i32;
        set_value(&mut n, "0", None).unwrap();
        assert_eq!(n, 7);

        let mut f = 2.5f64;
        set_value(&mut f, "0", None).unwrap();
        assert_eq!(f, 2.5);

        let mut d = Duration::from_secs(3);
        set_value(&mut d, "0", None).unwrap();
        assert_eq!(d, Duration::from_secs(3));
    }

    #[test]
    fn empty_literal_leaves_others_untouched() {
        let mut s = "keep".to_string();
        set_value(&mut s, "", None).unwrap();
        assert_eq!(s, "keep");

        let mut b = true;
        set_value(&mut b, "", None).unwrap();
        assert!(b);

        let mut v = vec![1, 2];
        set_value(&mut v, "", None).unwrap();
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn zero_string_is_a_value_for_strings() {
        let mut s = String::new();
        set_value(&mut s, "0", None).unwrap();
        assert_eq!(s, "0");
    }

    // --- scalars ---

    #[test]
    fn strings_and_paths_verbatim() {
        let mut s = String::new();
        set_value(&mut s, " spaced ", None).unwrap();
        assert_eq!(s, " spaced ");

        let mut p = PathBuf::new();
        set_value(&mut p, "/etc/app.toml", None).unwrap();
        assert_eq!(p, PathBuf::from("/etc/app.toml"));
    }

    #[test]
    fn bools_case_insensitive() {
        let mut b = false;
        set_value(&mut b, "True", None).unwrap();
        assert!(b);
        set_value(&mut b, "FALSE", None).unwrap();
        assert!(!b);
    }

    #[test]
    fn bool_rejects_other_words() {
        let mut b = false;
        let err = set_value(&mut b, "yes", None).unwrap_err();
        assert_eq!(err.to_string(), "cannot assign 'yes' to bool type");
        assert!(!b);
    }

    #[test]
    fn integers_respect_width() {
        let mut n = 0i8;
        set_value(&mut n, "-12", None).unwrap();
        assert_eq!(n, -12);
        assert!(matches!(
            set_value(&mut n, "300", None),
            Err(SetError::Int { .. })
        ));

        let mut u = 0u32;
        set_value(&mut u, "4000000000", None).unwrap();
        assert_eq!(u, 4_000_000_000);
        assert!(set_value(&mut u, "-1", None).is_err());
    }

    #[test]
    fn floats() {
        let mut f = 0f32;
        set_value(&mut f, "99.9", None).unwrap();
        assert_eq!(f, 99.9);
        assert!(matches!(
            set_value(&mut f, "abc", None),
            Err(SetError::Float { .. })
        ));
    }

    // --- durations ---

    #[test]
    fn duration_string() {
        let mut d = Duration::ZERO;
        set_value(&mut d, "12s", None).unwrap();
        assert_eq!(d, Duration::from_secs(12));
    }

    #[test]
    fn duration_bare_integer_is_nanoseconds() {
        let mut d = Duration::ZERO;
        set_value(&mut d, "12", None).unwrap();
        assert_eq!(d, Duration::from_nanos(12));
    }

    #[test]
    fn duration_garbage_reports_duration_error() {
        let mut d = Duration::ZERO;
        let err = set_value(&mut d, "soon", None).unwrap_err();
        assert!(matches!(err, SetError::Duration(_)));
    }

    // --- optional values ---

    #[test]
    fn pointer_stays_none_on_zero() {
        let mut p: Option<i32> = None;
        set_value(&mut p, "0", None).unwrap();
        assert_eq!(p, None);
    }

    #[test]
    fn pointer_allocated_on_value() {
        let mut p: Option<i32> = None;
        set_value(&mut p, "5", None).unwrap();
        assert_eq!(p, Some(5));
    }

    #[test]
    fn pointer_untouched_on_failure() {
        let mut p: Option<i32> = Some(1);
        assert!(set_value(&mut p, "x", None).is_err());
        assert_eq!(p, Some(1));
    }

    // --- sequences ---

    #[test]
    fn slice_plain_and_bracketed() {
        let mut v: Vec<i32> = Vec::new();
        set_value(&mut v, "1,2,3", None).unwrap();
        assert_eq!(v, vec![1, 2, 3]);

        let mut w: Vec<i32> = vec![9];
        set_value(&mut w, "[1, 2, 3]", None).unwrap();
        assert_eq!(w, vec![1, 2, 3]);
    }

    #[test]
    fn slice_strips_quotes() {
        let mut v: Vec<String> = Vec::new();
        set_value(&mut v, r#"["a", 'b', c]"#, None).unwrap();
        assert_eq!(v, vec!["a", "b", "c"]);
    }

    #[test]
    fn slice_failure_keeps_old_contents() {
        let mut v = vec![4, 5];
        assert!(set_value(&mut v, "1,x,3", None).is_err());
        assert_eq!(v, vec![4, 5]);
    }

    #[test]
    fn array_exact_length() {
        let mut a = [0u8; 3];
        set_value(&mut a, "1,2,3", None).unwrap();
        assert_eq!(a, [1, 2, 3]);
    }

    #[test]
    fn array_of_two() {
        let mut a = [0i64; 2];
        set_value(&mut a, "1,2", None).unwrap();
        assert_eq!(a, [1, 2]);
    }

    #[test]
    fn array_length_mismatch() {
        let mut a = [0u8; 2];
        let err = set_value(&mut a, "1,2,3", None).unwrap_err();
        assert!(matches!(err, SetError::LengthMismatch { got: 3, want: 2 }));
        assert_eq!(a, [0, 0]);
    }

    #[test]
    fn array_commits_only_on_success() {
        let mut a = [7u8, 7];
        assert!(set_value(&mut a, "1,x", None).is_err());
        assert_eq!(a, [7, 7]);
    }

    #[test]
    fn split_list_trims() {
        assert_eq!(split_list("[ a , \"b\" ]"), vec!["a", "b"]);
        assert_eq!(split_list("x"), vec!["x"]);
    }

    // --- render then set ---

    fn round_trip<T: Value + Default + PartialEq + std::fmt::Debug>(mut value: T) {
        let rendered = value.slot().render(None);
        let mut back = T::default();
        set_value(&mut back, &rendered, None).unwrap();
        assert_eq!(back, value, "via {rendered:?}");
    }

    #[test]
    fn rendered_values_set_back() {
        round_trip(-42i32);
        round_trip(i64::MIN);
        round_trip(u64::MAX);
        round_trip(7u8);
        round_trip(2.25f32);
        round_trip(-1.0e-7f64);
        round_trip(true);
        round_trip("hello world".to_string());
        round_trip(PathBuf::from("/etc/app.toml"));
        round_trip(Duration::from_millis(1500));
        round_trip(Duration::new(3 * 3600 + 1, 7));
        round_trip('z');
        round_trip(Some(9u16));
        round_trip(vec![3, 1, 2]);
    }

    // --- timestamps, text, unsupported ---

    #[test]
    fn timestamp_uses_format_tag() {
        let mut t = DateTime::<Utc>::default();
        set_value(&mut t, "2010-08-10", Some("2006-01-02")).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2010, 8, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn timestamp_error_keeps_layout() {
        let mut t = DateTime::<Utc>::default();
        match set_value(&mut t, "nope", None) {
            Err(SetError::Timestamp(e)) => assert_eq!(e.layout, crate::timestamp::RFC3339),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn text_values_parse_from_str() {
        let mut ip: IpAddr = "127.0.0.1".parse().unwrap();
        set_value(&mut ip, "::1", None).unwrap();
        assert_eq!(ip, "::1".parse::<IpAddr>().unwrap());
        assert!(matches!(
            set_value(&mut ip, "not-an-ip", None),
            Err(SetError::Text { .. })
        ));
    }

    #[test]
    fn opaque_is_a_no_op() {
        assert!(set_field(Slot::Opaque, "anything", None).is_ok());
    }

    #[test]
    fn unsupported_errors() {
        let mut m = std::collections::HashMap::<String, String>::new();
        assert!(matches!(
            set_value(&mut m, "a=b", None),
            Err(SetError::Unsupported("map"))
        ));
    }
}
