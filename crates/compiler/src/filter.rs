//! Key filtering applied while compiling, and the options that drive it.
use crate::error::PatternError;
use deepr_types::is_built_in_key;
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Matches a source key either literally or against a regular expression.
///
/// In configuration a pattern is written as a plain key or as
/// `{"regex": "..."}`.
#[derive(Clone)]
pub enum KeyPattern {
    Exact(String),
    Regex(Regex),
}

impl KeyPattern {
    pub fn exact(key: impl Into<String>) -> Self {
        Self::Exact(key.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        Regex::new(pattern).map(Self::Regex).map_err(|e| PatternError {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::Regex(regex) => regex.is_match(key),
        }
    }
}

impl fmt::Debug for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(exact) => write!(f, "Exact({exact:?})"),
            Self::Regex(regex) => write!(f, "Regex(/{}/)", regex.as_str()),
        }
    }
}

impl From<&str> for KeyPattern {
    fn from(key: &str) -> Self {
        Self::exact(key)
    }
}

impl From<String> for KeyPattern {
    fn from(key: String) -> Self {
        Self::Exact(key)
    }
}

impl From<Regex> for KeyPattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl<'de> Deserialize<'de> for KeyPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PatternVisitor)
    }
}

struct PatternVisitor;

impl<'de> Visitor<'de> for PatternVisitor {
    type Value = KeyPattern;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a key or a map like {\"regex\": \"^_\"}")
    }

    fn visit_str<E>(self, value: &str) -> Result<KeyPattern, E>
    where
        E: de::Error,
    {
        Ok(KeyPattern::exact(value))
    }

    fn visit_map<A>(self, mut map: A) -> Result<KeyPattern, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pattern: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "regex" => pattern = Some(map.next_value()?),
                other => return Err(de::Error::unknown_field(other, &["regex"])),
            }
        }
        let pattern = pattern.ok_or_else(|| de::Error::missing_field("regex"))?;
        KeyPattern::regex(&pattern).map_err(de::Error::custom)
    }
}

/// A list written either as a single pattern or as an array of them.
struct PatternsVisitor;

impl<'de> Visitor<'de> for PatternsVisitor {
    type Value = Vec<KeyPattern>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a key pattern or a list of key patterns")
    }

    fn visit_str<E>(self, value: &str) -> Result<Vec<KeyPattern>, E>
    where
        E: de::Error,
    {
        PatternVisitor.visit_str(value).map(|pattern| vec![pattern])
    }

    fn visit_map<A>(self, map: A) -> Result<Vec<KeyPattern>, A::Error>
    where
        A: MapAccess<'de>,
    {
        PatternVisitor.visit_map(map).map(|pattern| vec![pattern])
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Vec<KeyPattern>, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut patterns = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(pattern) = seq.next_element::<KeyPattern>()? {
            patterns.push(pattern);
        }
        Ok(patterns)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<KeyPattern>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(PatternsVisitor)
}

/// Controls which keys of a query document make it into the compiled tree.
///
/// A key is dropped when it is a built-in key (unless `ignore_built_in_keys`
/// is off), or when it matches `ignore_keys` without also matching
/// `accept_keys`. Dropped keys are skipped silently, sub-document included.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(deserialize_with = "one_or_many")]
    pub ignore_keys: Vec<KeyPattern>,
    #[serde(deserialize_with = "one_or_many")]
    pub accept_keys: Vec<KeyPattern>,
    pub ignore_built_in_keys: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            ignore_keys: Vec::new(),
            accept_keys: Vec::new(),
            ignore_built_in_keys: true,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_key(mut self, pattern: impl Into<KeyPattern>) -> Self {
        self.ignore_keys.push(pattern.into());
        self
    }

    pub fn accept_key(mut self, pattern: impl Into<KeyPattern>) -> Self {
        self.accept_keys.push(pattern.into());
        self
    }

    pub fn ignore_built_in_keys(mut self, ignore: bool) -> Self {
        self.ignore_built_in_keys = ignore;
        self
    }

    /// Whether a parsed source key survives filtering.
    pub fn accepts(&self, source_key: &str) -> bool {
        if self.ignore_built_in_keys && is_built_in_key(source_key) {
            return false;
        }
        let ignored = self.ignore_keys.iter().any(|p| p.matches(source_key));
        !ignored || self.accept_keys.iter().any(|p| p.matches(source_key))
    }
}
