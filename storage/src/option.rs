use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::http::DEFAULT_PROJECTION;

/// The options a storage call accepts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum StorageOption {
    PredefinedAcl,
    PredefinedDefaultObjectAcl,
    /// `true` requires the stored generation to equal the one carried by the target,
    /// `false` requires it to differ.
    IfGenerationMatch,
    /// Same as [`StorageOption::IfGenerationMatch`] for the metageneration.
    IfMetagenerationMatch,
    Fields,
    Projection,
    Prefix,
    Delimiter,
    PageToken,
    Versions,
    MaxResults,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Kind {
    Bool,
    Long,
    Str,
}

impl StorageOption {
    /// Name of the request parameter the option populates.
    pub fn field(&self) -> &'static str {
        match self {
            StorageOption::PredefinedAcl => "predefinedAcl",
            StorageOption::PredefinedDefaultObjectAcl => "predefinedDefaultObjectAcl",
            StorageOption::IfGenerationMatch => "ifGenerationMatch",
            StorageOption::IfMetagenerationMatch => "ifMetagenerationMatch",
            StorageOption::Fields => "fields",
            StorageOption::Projection => "projection",
            StorageOption::Prefix => "prefix",
            StorageOption::Delimiter => "delimiter",
            StorageOption::PageToken => "pageToken",
            StorageOption::Versions => "versions",
            StorageOption::MaxResults => "maxResults",
        }
    }

    fn kind(&self) -> Kind {
        match self {
            StorageOption::IfGenerationMatch | StorageOption::IfMetagenerationMatch | StorageOption::Versions => {
                Kind::Bool
            }
            StorageOption::MaxResults => Kind::Long,
            _ => Kind::Str,
        }
    }
}

impl fmt::Display for StorageOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.field())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum OptionValue {
    Bool(bool),
    Long(i64),
    Str(String),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Long(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

/// A set of options, at most one value per key.
///
/// Keys an operation does not use are ignored. A value of the wrong kind is only
/// reported by an operation that reads the key.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Options(BTreeMap<StorageOption, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: StorageOption, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a value, returning the one it replaced.
    pub fn insert(&mut self, key: StorageOption, value: impl Into<OptionValue>) -> Option<OptionValue> {
        self.0.insert(key, value.into())
    }

    pub fn get(&self, key: StorageOption) -> Option<&OptionValue> {
        self.0.get(&key)
    }

    pub fn contains(&self, key: StorageOption) -> bool {
        self.0.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, StorageOption, OptionValue> {
        self.0.iter()
    }

    fn checked(&self, key: StorageOption) -> Result<Option<&OptionValue>, Error> {
        let Some(value) = self.0.get(&key) else {
            return Ok(None);
        };
        let kind = match value {
            OptionValue::Bool(_) => Kind::Bool,
            OptionValue::Long(_) => Kind::Long,
            OptionValue::Str(_) => Kind::Str,
        };
        if kind != key.kind() {
            return Err(Error::invalid(format!("option {key} does not accept {value:?}")));
        }
        Ok(Some(value))
    }

    pub(crate) fn string(&self, key: StorageOption) -> Result<Option<String>, Error> {
        Ok(match self.checked(key)? {
            Some(OptionValue::Str(v)) => Some(v.clone()),
            _ => None,
        })
    }

    pub(crate) fn boolean(&self, key: StorageOption) -> Result<Option<bool>, Error> {
        Ok(match self.checked(key)? {
            Some(OptionValue::Bool(v)) => Some(*v),
            _ => None,
        })
    }

    pub(crate) fn long(&self, key: StorageOption) -> Result<Option<i64>, Error> {
        Ok(match self.checked(key)? {
            Some(OptionValue::Long(v)) => Some(*v),
            _ => None,
        })
    }

    /// The requested projection, `full` unless set.
    pub(crate) fn projection(&self) -> Result<Option<String>, Error> {
        Ok(Some(
            self.string(StorageOption::Projection)?
                .unwrap_or_else(|| DEFAULT_PROJECTION.to_string()),
        ))
    }

    /// Interprets a match option against the value carried by the target.
    ///
    /// The option only takes effect when both the key and the value are present.
    pub fn precondition(&self, key: StorageOption, value: Option<i64>) -> Result<Option<Precondition>, Error> {
        let Some(matches) = self.boolean(key)? else {
            return Ok(None);
        };
        Ok(value.map(|v| {
            if matches {
                Precondition::Match(v)
            } else {
                Precondition::NotMatch(v)
            }
        }))
    }

    /// The `fields` selector for a single-resource response, extended with the `identity` fields
    /// it is missing. Nested or wildcard selectors are sent unchanged.
    pub(crate) fn fields(&self, identity: &[&str]) -> Result<Option<String>, Error> {
        let Some(selector) = self.string(StorageOption::Fields)? else {
            return Ok(None);
        };
        if selector.trim().is_empty() || selector.contains(['(', '/', '*']) {
            return Ok(Some(selector));
        }
        let mut fields: Vec<&str> = selector.split(',').map(str::trim).filter(|f| !f.is_empty()).collect();
        for field in identity {
            if !fields.contains(field) {
                fields.push(field);
            }
        }
        Ok(Some(fields.join(",")))
    }

    /// `(match, not_match)` metageneration fields for a bucket. Generation options do not
    /// apply to buckets and are not read.
    pub(crate) fn metageneration_conditions(
        &self,
        metageneration: Option<i64>,
    ) -> Result<(Option<i64>, Option<i64>), Error> {
        let precondition = self.precondition(StorageOption::IfMetagenerationMatch, metageneration)?;
        Ok(Precondition::split(precondition))
    }

    /// Generation and metageneration preconditions for a target carrying those values.
    pub(crate) fn conditions(&self, generation: Option<i64>, metageneration: Option<i64>) -> Result<Conditions, Error> {
        let (if_generation_match, if_generation_not_match) =
            Precondition::split(self.precondition(StorageOption::IfGenerationMatch, generation)?);
        let (if_metageneration_match, if_metageneration_not_match) =
            Precondition::split(self.precondition(StorageOption::IfMetagenerationMatch, metageneration)?);
        Ok(Conditions {
            if_generation_match,
            if_generation_not_match,
            if_metageneration_match,
            if_metageneration_not_match,
        })
    }
}

impl<V: Into<OptionValue>> FromIterator<(StorageOption, V)> for Options {
    fn from_iter<T: IntoIterator<Item = (StorageOption, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Precondition {
    /// The stored value must equal this one.
    Match(i64),
    /// The stored value must differ from this one.
    NotMatch(i64),
}

impl Precondition {
    /// Splits into the `(match, not_match)` request fields.
    pub fn split(p: Option<Precondition>) -> (Option<i64>, Option<i64>) {
        match p {
            Some(Precondition::Match(v)) => (Some(v), None),
            Some(Precondition::NotMatch(v)) => (None, Some(v)),
            None => (None, None),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub(crate) struct Conditions {
    pub if_generation_match: Option<i64>,
    pub if_generation_not_match: Option<i64>,
    pub if_metageneration_match: Option<i64>,
    pub if_metageneration_not_match: Option<i64>,
}
