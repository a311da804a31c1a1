//! Production scheduling value objects
//!
//! Status and priority enums travel over the wire in kebab-case
//! (`in-progress`) and are stored the same way. Parsing is lenient: `InProgress`,
//! `in_progress` and `IN-PROGRESS` all resolve to the same variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower-case and strip separators so `InProgress` and `in-progress` compare equal
fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Error returned when a string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} '{value}', expected one of: {expected}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

macro_rules! kebab_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize(s);
                $(
                    if wanted == normalize($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(ParseEnumError {
                    kind: $kind,
                    value: s.to_string(),
                    expected: concat!($($text, " "),+),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

kebab_enum! {
    /// Production order priority
    Priority, "priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

kebab_enum! {
    /// Lifecycle of a production order
    OrderStatus, "order status" {
        Pending => "pending",
        InProgress => "in-progress",
        Completed => "completed",
        Delayed => "delayed",
        Cancelled => "cancelled",
    }
}

kebab_enum! {
    /// Lifecycle of a single job on the scheduling board
    JobStatus, "job status" {
        Scheduled => "scheduled",
        InProgress => "in-progress",
        Completed => "completed",
        Delayed => "delayed",
    }
}

kebab_enum! {
    /// Operating state of a machine
    MachineStatus, "machine status" {
        Running => "running",
        Idle => "idle",
        Maintenance => "maintenance",
        Error => "error",
    }
}

impl OrderStatus {
    /// Orders in a final state are never reported as overdue
    pub fn is_closed(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Human readable production order number, `PO-{year}-{sequence:03}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub const MAX_LENGTH: usize = 50;

    pub fn for_sequence(year: i32, sequence: i64) -> Self {
        Self(format!("PO-{}-{:03}", year, sequence))
    }

    pub fn new(value: String) -> Result<Self, String> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err("Order number cannot be empty".to_string());
        }
        if value.len() > Self::MAX_LENGTH {
            return Err(format!(
                "Order number too long (max {} characters)",
                Self::MAX_LENGTH
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
