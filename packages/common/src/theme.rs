#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hackathon theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ai"))]
    Ai,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "fintech"))]
    Fintech,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "healthcare"))]
    Healthcare,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "education"))]
    Education,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "sustainability"))]
    Sustainability,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "other"))]
    Other,
}

impl Theme {
    pub const ALL: &'static [Theme] = &[
        Self::Ai,
        Self::Fintech,
        Self::Healthcare,
        Self::Education,
        Self::Sustainability,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fintech => "fintech",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Sustainability => "sustainability",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown theme string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Unknown theme '{invalid}'. Valid values: ai, fintech, healthcare, education, sustainability, other"
)]
pub struct ParseThemeError {
    invalid: String,
}

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(Self::Ai),
            "fintech" => Ok(Self::Fintech),
            "healthcare" => Ok(Self::Healthcare),
            "education" => Ok(Self::Education),
            "sustainability" => Ok(Self::Sustainability),
            "other" => Ok(Self::Other),
            _ => Err(ParseThemeError {
                invalid: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), *theme);
            let json = serde_json::to_string(theme).unwrap();
            let parsed: Theme = serde_json::from_str(&json).unwrap();
            assert_eq!(*theme, parsed);
        }
    }

    #[test]
    fn test_unknown_theme() {
        assert!("web3".parse::<Theme>().is_err());
    }
}
