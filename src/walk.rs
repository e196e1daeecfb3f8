//! Struct reflection and the walk every string-based source goes through.
//!
//! `#[derive(Config)]` generates [`Config::walk`], which reports each public
//! field to a [`Visitor`]: leaves as a [`Slot`], `#[config(nested)]` fields as
//! a [`Section`] to recurse into. The crate's own visitor, [`Walker`], owns
//! the rules shared by the env and flag sources: name derivation, prefix
//! composition, skip and omit-prefix tags, and error wrapping.

use heck::{ToShoutySnakeCase, ToSnakeCase};

use crate::error::{BoxError, FieldfigError};
use crate::setter::set_field;
use crate::value::Slot;

/// A configuration record. Usually derived:
///
/// ```ignore
/// #[derive(fieldfig::Config, Default)]
/// pub struct AppConfig {
///     /// Port to listen on.
///     pub port: u16,
///     #[config(env = "DATABASE_URL")]
///     pub db: String,
///     #[config(nested)]
///     pub log: LogConfig,
/// }
/// ```
pub trait Config {
    /// Report every walked field to `visitor`, in declaration order.
    fn walk(&mut self, visitor: &mut dyn Visitor) -> Result<(), FieldfigError>;

    /// Called once after all sources were applied.
    fn validate(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Receives the fields of a [`Config`] walk.
pub trait Visitor {
    fn leaf(&mut self, info: &FieldInfo, slot: Slot<'_>) -> Result<(), FieldfigError>;

    fn nested(&mut self, info: &FieldInfo, section: &mut dyn Section)
    -> Result<(), FieldfigError>;

    /// Number of fields written so far.
    fn applied(&self) -> usize;
}

/// A nested config field. The derive implements this for every `Config`
/// struct; `Option<T>` sections are created only when one of their fields
/// receives a value.
pub trait Section {
    fn enter(&mut self, visitor: &mut dyn Visitor) -> Result<(), FieldfigError>;
}

impl<T: Config + Default> Section for Option<T> {
    fn enter(&mut self, visitor: &mut dyn Visitor) -> Result<(), FieldfigError> {
        if let Some(inner) = self {
            return inner.walk(visitor);
        }
        let before = visitor.applied();
        let mut fresh = T::default();
        fresh.walk(visitor)?;
        if visitor.applied() > before {
            *self = Some(fresh);
        }
        Ok(())
    }
}

impl<T: Section + ?Sized> Section for Box<T> {
    fn enter(&mut self, visitor: &mut dyn Visitor) -> Result<(), FieldfigError> {
        (**self).enter(visitor)
    }
}

/// How a source names a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameTag {
    /// Derived from the field name in the source's convention.
    #[default]
    Derive,
    Rename(&'static str),
    /// Not read from this source.
    Skip,
    /// Nested fields only: children use the parent's prefix.
    OmitPrefix,
}

/// Static description of one field, generated by the derive.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldInfo {
    pub name: &'static str,
    pub type_name: &'static str,
    pub env: NameTag,
    pub flag: NameTag,
    /// Timestamp layout.
    pub format: Option<&'static str>,
    pub help: Option<&'static str>,
}

impl FieldInfo {
    pub fn tag(&self, kind: SourceKind) -> NameTag {
        match kind {
            SourceKind::Env => self.env,
            SourceKind::Flag => self.flag,
        }
    }
}

/// The string-based sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Env,
    Flag,
}

impl SourceKind {
    /// Name segment for a field: `max_conns` is `MAX_CONNS` in env, `max_conns` as a flag.
    pub fn segment(self, field: &str) -> String {
        match self {
            SourceKind::Env => field.to_shouty_snake_case(),
            SourceKind::Flag => field.to_snake_case(),
        }
    }

    fn segment_for(self, info: &FieldInfo) -> String {
        match info.tag(self) {
            NameTag::Rename(name) => name.to_string(),
            _ => self.segment(info.name),
        }
    }
}

/// Join a prefix and a name segment with `_`.
pub fn compose(prefix: &str, segment: &str) -> String {
    match (prefix.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}_{segment}"),
    }
}

/// What a source does with each named leaf.
pub(crate) trait Sink {
    fn kind(&self) -> SourceKind;

    /// Handle the leaf under its external name. Returns whether the field
    /// was written.
    fn leaf(&mut self, key: &str, info: &FieldInfo, slot: Slot<'_>)
    -> Result<bool, FieldfigError>;
}

/// Walks a config, naming each leaf and handing it to a [`Sink`].
pub(crate) struct Walker<'s, S: Sink> {
    sink: &'s mut S,
    prefix: String,
    written: usize,
}

impl<'s, S: Sink> Walker<'s, S> {
    /// Walk `cfg` with names under `prefix`. Returns the number of fields written.
    pub(crate) fn run<C: Config + ?Sized>(
        sink: &'s mut S,
        prefix: &str,
        cfg: &mut C,
    ) -> Result<usize, FieldfigError> {
        let mut walker = Walker {
            sink,
            prefix: prefix.to_string(),
            written: 0,
        };
        cfg.walk(&mut walker)?;
        Ok(walker.written)
    }
}

impl<S: Sink> Visitor for Walker<'_, S> {
    fn leaf(&mut self, info: &FieldInfo, slot: Slot<'_>) -> Result<(), FieldfigError> {
        let kind = self.sink.kind();
        match info.tag(kind) {
            NameTag::Skip => return Ok(()),
            _ if slot.is_unsupported() => return Ok(()),
            NameTag::OmitPrefix => {
                return Err(FieldfigError::OmitPrefixOnLeaf { field: info.name });
            }
            _ => {}
        }
        let key = compose(&self.prefix, &kind.segment_for(info));
        if self.sink.leaf(&key, info, slot)? {
            self.written += 1;
        }
        Ok(())
    }

    fn nested(
        &mut self,
        info: &FieldInfo,
        section: &mut dyn Section,
    ) -> Result<(), FieldfigError> {
        let kind = self.sink.kind();
        let child = match info.tag(kind) {
            NameTag::Skip => return Ok(()),
            NameTag::OmitPrefix => self.prefix.clone(),
            _ => compose(&self.prefix, &kind.segment_for(info)),
        };
        let parent = std::mem::replace(&mut self.prefix, child);
        let result = section.enter(self);
        self.prefix = parent;
        result
    }

    fn applied(&self) -> usize {
        self.written
    }
}

/// Run the setter for one named leaf, attaching the name and field on failure.
pub(crate) fn write_leaf(
    source: SourceKind,
    key: &str,
    raw: &str,
    info: &FieldInfo,
    slot: Slot<'_>,
) -> Result<bool, FieldfigError> {
    if raw.is_empty() || raw == slot.zero_literal() {
        return Ok(false);
    }
    set_field(slot, raw, info.format).map_err(|e| FieldfigError::field(key, raw, info, e))?;
    tracing::debug!(source = ?source, key, field = info.name, "set field");
    Ok(true)
}
