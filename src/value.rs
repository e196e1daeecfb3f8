//! How a field exposes itself to the setter.
//!
//! Every walked field implements [`Value`], which hands out a [`Slot`]: a
//! mutable view of the field tagged with its kind. The setter dispatches on
//! the slot; adapters also use it to render the current value (flag defaults,
//! generated env templates).
//!
//! Types with their own text form plug in through [`TextValue`], which is
//! implemented for anything `FromStr + Display`. Register one with
//! [`text_value!`](crate::text_value):
//!
//! ```ignore
//! #[derive(Debug, Default, Clone)]
//! pub struct Level(u8);
//! impl std::str::FromStr for Level { /* ... */ }
//! impl std::fmt::Display for Level { /* ... */ }
//! fieldfig::text_value!(numeric: Level);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::error::{BoxError, SetError};
use crate::setter::set_value;
use crate::timestamp::{self, Timestamp};

/// A field the setter can write into.
pub trait Value {
    fn slot(&mut self) -> Slot<'_>;
}

/// Mutable, kind-tagged view of one field.
pub enum Slot<'a> {
    Str(&'a mut String),
    Path(&'a mut PathBuf),
    Bool(&'a mut bool),
    Int(&'a mut dyn Scalar<ParseIntError>),
    Uint(&'a mut dyn Scalar<ParseIntError>),
    Float(&'a mut dyn Scalar<ParseFloatError>),
    Duration(&'a mut Duration),
    Timestamp(&'a mut dyn Timestamp),
    Text(&'a mut dyn TextValue),
    /// A text type over a number: `"0"` counts as no value.
    NumericText(&'a mut dyn TextValue),
    Pointer(&'a mut dyn PointerSlot),
    Slice(&'a mut dyn Sequence),
    Array(&'a mut dyn Sequence),
    /// A plain struct with no text form. Setting it is a no-op.
    Opaque,
    /// Maps, channels. Adapters skip these.
    Unsupported(&'static str),
}

impl Slot<'_> {
    /// The literal that means "no value" for this kind.
    pub fn zero_literal(&self) -> &'static str {
        match self {
            Slot::Int(_)
            | Slot::Uint(_)
            | Slot::Float(_)
            | Slot::Duration(_)
            | Slot::NumericText(_) => "0",
            Slot::Pointer(p) => p.pointee_zero(),
            _ => "",
        }
    }

    /// Current value in the form the setter reads back.
    pub fn render(&mut self, format: Option<&str>) -> String {
        match self {
            Slot::Str(s) => s.to_string(),
            Slot::Path(p) => p.display().to_string(),
            Slot::Bool(b) => b.to_string(),
            Slot::Int(n) | Slot::Uint(n) => n.render(),
            Slot::Float(f) => f.render(),
            Slot::Duration(d) => crate::duration::format_duration(**d),
            Slot::Timestamp(t) => timestamp::render(&**t, format),
            Slot::Text(t) | Slot::NumericText(t) => t.render_text(),
            Slot::Pointer(p) => p.render(format),
            Slot::Slice(s) | Slot::Array(s) => s.render(format),
            Slot::Opaque | Slot::Unsupported(_) => String::new(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Slot::Unsupported(_))
    }
}

/// Integer and float fields: parsed with `FromStr`, rendered with `Display`.
pub trait Scalar<E> {
    fn parse_in(&mut self, raw: &str) -> Result<(), E>;
    fn render(&self) -> String;
}

impl<T, E> Scalar<E> for T
where
    T: FromStr<Err = E> + Display,
{
    fn parse_in(&mut self, raw: &str) -> Result<(), E> {
        *self = raw.parse()?;
        Ok(())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// Fields with a custom text form.
pub trait TextValue {
    fn parse_text(&mut self, raw: &str) -> Result<(), BoxError>;
    fn render_text(&self) -> String;
}

impl<T> TextValue for T
where
    T: FromStr + Display,
    T::Err: Into<BoxError>,
{
    fn parse_text(&mut self, raw: &str) -> Result<(), BoxError> {
        *self = raw.parse().map_err(Into::into)?;
        Ok(())
    }

    fn render_text(&self) -> String {
        self.to_string()
    }
}

/// `Option<T>`: allocated only when a non-zero value arrives.
pub trait PointerSlot {
    fn pointee_zero(&self) -> &'static str;
    fn populate(&mut self, raw: &str, format: Option<&str>) -> Result<(), SetError>;
    fn render(&mut self, format: Option<&str>) -> String;
}

impl<T: Value + Default> PointerSlot for Option<T> {
    fn pointee_zero(&self) -> &'static str {
        T::default().slot().zero_literal()
    }

    fn populate(&mut self, raw: &str, format: Option<&str>) -> Result<(), SetError> {
        let mut fresh = T::default();
        set_value(&mut fresh, raw, format)?;
        *self = Some(fresh);
        Ok(())
    }

    fn render(&mut self, format: Option<&str>) -> String {
        match self {
            Some(v) => v.slot().render(format),
            None => String::new(),
        }
    }
}

/// `Vec<T>` and `[T; N]`, written from a comma-separated list.
pub trait Sequence {
    /// Replace the contents with one element per token. Nothing is written
    /// unless every token converts.
    fn assign(&mut self, tokens: &[&str], format: Option<&str>) -> Result<(), SetError>;
    fn render(&mut self, format: Option<&str>) -> String;
}

impl<T: Value + Default> Sequence for Vec<T> {
    fn assign(&mut self, tokens: &[&str], format: Option<&str>) -> Result<(), SetError> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            let mut item = T::default();
            set_value(&mut item, token, format)?;
            out.push(item);
        }
        *self = out;
        Ok(())
    }

    fn render(&mut self, format: Option<&str>) -> String {
        render_items(self.iter_mut(), format)
    }
}

impl<T: Value + Clone, const N: usize> Sequence for [T; N] {
    fn assign(&mut self, tokens: &[&str], format: Option<&str>) -> Result<(), SetError> {
        if tokens.len() != N {
            return Err(SetError::LengthMismatch {
                got: tokens.len(),
                want: N,
            });
        }
        let mut copy = self.clone();
        for (item, token) in copy.iter_mut().zip(tokens) {
            set_value(item, token, format)?;
        }
        *self = copy;
        Ok(())
    }

    fn render(&mut self, format: Option<&str>) -> String {
        render_items(self.iter_mut(), format)
    }
}

fn render_items<'a, T: Value + 'a>(
    items: impl Iterator<Item = &'a mut T>,
    format: Option<&str>,
) -> String {
    items
        .map(|item| item.slot().render(format))
        .collect::<Vec<_>>()
        .join(",")
}

macro_rules! scalar_values {
    ($variant:ident: $($ty:ty),*) => {
        $(impl Value for $ty {
            fn slot(&mut self) -> Slot<'_> {
                Slot::$variant(self)
            }
        })*
    };
}

scalar_values!(Int: i8, i16, i32, i64, i128, isize);
scalar_values!(Uint: u8, u16, u32, u64, u128, usize);
scalar_values!(Float: f32, f64);

impl Value for String {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Str(self)
    }
}

impl Value for PathBuf {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Path(self)
    }
}

impl Value for bool {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Bool(self)
    }
}

impl Value for Duration {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Duration(self)
    }
}

impl Value for DateTime<FixedOffset> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Timestamp(self)
    }
}

impl Value for DateTime<Utc> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Timestamp(self)
    }
}

impl Value for NaiveDateTime {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Timestamp(self)
    }
}

impl<T: Value + Default> Value for Option<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }
}

impl<T: Value + Default> Value for Vec<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Slice(self)
    }
}

impl<T: Value + Clone, const N: usize> Value for [T; N] {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Array(self)
    }
}

impl<T: Value> Value for Box<T> {
    fn slot(&mut self) -> Slot<'_> {
        (**self).slot()
    }
}

impl<K, V, S> Value for HashMap<K, V, S> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Unsupported("map")
    }
}

impl<K, V> Value for BTreeMap<K, V> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Unsupported("map")
    }
}

impl<T> Value for mpsc::Sender<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Unsupported("channel")
    }
}

impl<T> Value for mpsc::Receiver<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Unsupported("channel")
    }
}

/// Implement [`Value`] for types parsed with `FromStr` and shown with `Display`.
///
/// Prefix the list with `numeric:` for types that wrap a number, so that `"0"`
/// from an env var or flag leaves the field alone like it does for integers:
///
/// ```ignore
/// fieldfig::text_value!(numeric: LogLevel, Port);
/// ```
#[macro_export]
macro_rules! text_value {
    (numeric: $($ty:ty),+ $(,)?) => {
        $(impl $crate::Value for $ty {
            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::NumericText(self)
            }
        })+
    };
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::Value for $ty {
            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Text(self)
            }
        })+
    };
}

/// Implement [`Value`] for plain structs that have no text form. The setter
/// leaves them untouched.
#[macro_export]
macro_rules! opaque_value {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::Value for $ty {
            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Opaque
            }
        })+
    };
}

text_value!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, char);
