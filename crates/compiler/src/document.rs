//! A query document that remembers every key it was given.
//!
//! `serde_json::Value` silently keeps only the last of several identical
//! keys. The compiler wants to report a document that spells out `()` twice
//! at one level instead of guessing which block was meant, so documents
//! parsed from text keep all of their entries in order.
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryDocument {
    /// Object entries in document order, duplicates included.
    Object(Vec<(String, QueryDocument)>),
    Array(Vec<QueryDocument>),
    Scalar(Json),
}

impl QueryDocument {
    /// Converts to plain JSON. Duplicate keys collapse, the last one winning.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Object(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<String, Json>>(),
            ),
            Self::Array(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Scalar(value) => value.clone(),
        }
    }

    /// Compact rendering for diagnostics.
    pub(crate) fn describe(&self) -> String {
        const LIMIT: usize = 60;
        let text = self.to_json().to_string();
        if text.chars().count() > LIMIT {
            format!("{}...", text.chars().take(LIMIT).collect::<String>())
        } else {
            text
        }
    }
}

impl From<&Json> for QueryDocument {
    fn from(value: &Json) -> Self {
        match value {
            Json::Object(map) => Self::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
            Json::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            scalar => Self::Scalar(scalar.clone()),
        }
    }
}

impl From<Json> for QueryDocument {
    fn from(value: Json) -> Self {
        Self::from(&value)
    }
}

impl FromStr for QueryDocument {
    type Err = serde_json::Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(text)
    }
}

impl<'de> Deserialize<'de> for QueryDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = QueryDocument;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a query document")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(QueryDocument::Scalar(Json::Null))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(QueryDocument::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, QueryDocument>()? {
            entries.push((key, value));
        }
        Ok(QueryDocument::Object(entries))
    }
}
