// Wire model shared by the API client, the store and the display layer
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifiers arrive either as JSON numbers or strings depending on the backend
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Int(n) => n.to_string(),
            RawId::Str(s) => s,
        }
    }
}

macro_rules! wire_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                $name(n.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| $name(raw.into_string()))
            }
        }
    };
}

wire_id!(
    /// Server-assigned identifier of a title
    TitleId
);

wire_id!(
    /// Server-assigned identifier of a task (a "list" entry on the wire)
    TaskId
);

/// A named group of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: TitleId,
    pub title: String,
}

/// A single sub-task belonging to exactly one title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub list_desc: String,
    #[serde(rename = "titleId")]
    pub title_id: TitleId,
    #[serde(rename = "status", default, deserialize_with = "deserialize_status")]
    pub done: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Bool(bool),
    Int(i64),
    Str(String),
}

// Backends store status as a bool, a 0/1 column, or a string; null means not done
fn deserialize_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<RawStatus>::deserialize(deserializer)?;
    Ok(match raw {
        None => false,
        Some(RawStatus::Bool(b)) => b,
        Some(RawStatus::Int(n)) => n != 0,
        Some(RawStatus::Str(s)) => matches!(s.as_str(), "1" | "true" | "done"),
    })
}
