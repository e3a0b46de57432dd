use std::collections::BTreeSet;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::id::generate_memory_id;
use crate::keywords::extract_keywords;

/// A persisted memory item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Record {
    /// Builds a record with a fresh identifier, stamped with the current time.
    pub fn create(content: impl Into<String>, keywords: Vec<String>) -> Self {
        Self::with_id(generate_memory_id(), content, keywords)
    }

    pub fn with_id(id: impl Into<String>, content: impl Into<String>, keywords: Vec<String>) -> Self {
        let now = now_utc();
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            content: content.into(),
            keywords,
        }
    }

    pub fn index_keywords(&self) -> BTreeSet<String> {
        extract_keywords(&self.content, self.keywords.as_slice())
    }
}

/// Current UTC time at the precision records are persisted with.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
