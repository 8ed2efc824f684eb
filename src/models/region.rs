use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EnumChoice;

/// Geographic region shared by conferences and venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT")]
pub enum Region {
    #[sqlx(rename = "US")]
    #[serde(rename = "US")]
    Us,
    #[sqlx(rename = "EU")]
    #[serde(rename = "EU")]
    Eu,
    #[sqlx(rename = "AU")]
    #[serde(rename = "AU")]
    Australia,
    #[sqlx(rename = "IN")]
    #[serde(rename = "IN")]
    India,
    #[sqlx(rename = "Online")]
    #[serde(rename = "Online")]
    Online,
}

impl EnumChoice for Region {
    const ALL: &'static [Self] = &[
        Region::Us,
        Region::Eu,
        Region::Australia,
        Region::India,
        Region::Online,
    ];

    fn value(self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Eu => "EU",
            Region::Australia => "AU",
            Region::India => "IN",
            Region::Online => "Online",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Eu => "EU",
            Region::Australia => "Australia",
            Region::India => "India",
            Region::Online => "Online",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_round_trip_through_from_value() {
        for region in Region::ALL {
            assert_eq!(Region::from_value(region.value()), Some(*region));
        }
        assert_eq!(Region::from_value("Mars"), None);
    }

    #[test]
    fn test_serde_uses_stored_value() {
        assert_eq!(serde_json::to_string(&Region::Australia).unwrap(), "\"AU\"");
        let region: Region = serde_json::from_str("\"Online\"").unwrap();
        assert_eq!(region, Region::Online);
    }
}
