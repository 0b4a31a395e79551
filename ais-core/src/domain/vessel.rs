use std::fmt::{self, Display};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};
use strum::AsRefStr;

/// Unique vessel identity, in practice an MMSI.
///
/// Feeds are inconsistent about whether the MMSI is sent as a number or a string, both are
/// accepted and stored in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VesselId(String);

impl VesselId {
    pub fn new(value: impl Into<String>) -> Option<VesselId> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == value.len() {
            Some(VesselId(value))
        } else {
            Some(VesselId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for VesselId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for VesselId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Helper;

        impl Visitor<'_> for Helper {
            type Value = VesselId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a non-empty string or an integer")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(VesselId(v.to_string()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(VesselId(v.to_string()))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                VesselId::new(v).ok_or_else(|| E::custom("vessel identifier was empty"))
            }
        }

        deserializer.deserialize_any(Helper)
    }
}

/// Human readable vessel categories resolved from AIS ship type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, strum::Display)]
pub enum VesselCategory {
    #[strum(serialize = "Tow Ship")]
    TowShip,
    #[strum(serialize = "Passenger Ships")]
    Passenger,
    #[strum(serialize = "Cargo Ships")]
    Cargo,
    #[strum(serialize = "Tanker")]
    Tanker,
}

impl VesselCategory {
    pub fn from_code(code: i32) -> Option<VesselCategory> {
        match code {
            31 | 32 | 52 | 1023 | 1025 => Some(VesselCategory::TowShip),
            60..=69 => Some(VesselCategory::Passenger),
            70..=79 => Some(VesselCategory::Cargo),
            80..=89 => Some(VesselCategory::Tanker),
            _ => None,
        }
    }
}

/// The display label of a vessel type.
///
/// Codes missing from the category table and values that are not integers are kept as they
/// were received so that no information is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VesselTypeLabel {
    Category(VesselCategory),
    Code(i32),
    Raw(String),
}

impl VesselTypeLabel {
    pub fn resolve(raw: &str) -> VesselTypeLabel {
        match raw.trim().parse::<i32>() {
            Ok(code) => VesselTypeLabel::from(code),
            Err(_) => VesselTypeLabel::Raw(raw.to_string()),
        }
    }

    pub fn category(&self) -> Option<VesselCategory> {
        match self {
            VesselTypeLabel::Category(c) => Some(*c),
            VesselTypeLabel::Code(_) | VesselTypeLabel::Raw(_) => None,
        }
    }
}

impl From<i32> for VesselTypeLabel {
    fn from(code: i32) -> Self {
        VesselCategory::from_code(code)
            .map(VesselTypeLabel::Category)
            .unwrap_or(VesselTypeLabel::Code(code))
    }
}

impl Display for VesselTypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VesselTypeLabel::Category(c) => c.fmt(f),
            VesselTypeLabel::Code(code) => code.fmt(f),
            VesselTypeLabel::Raw(raw) => f.write_str(raw),
        }
    }
}
