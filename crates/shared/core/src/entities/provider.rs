use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// External marketplace exposing a promotions API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Ozon,
    Wildberries,
}

impl ProviderId {
    /// All supported providers, in a stable order
    pub const ALL: [ProviderId; 2] = [ProviderId::Ozon, ProviderId::Wildberries];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Ozon => "ozon",
            ProviderId::Wildberries => "wildberries",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported marketplace: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ozon" => Ok(ProviderId::Ozon),
            "wildberries" | "wb" => Ok(ProviderId::Wildberries),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Ozon".parse::<ProviderId>().unwrap(), ProviderId::Ozon);
        assert_eq!(
            "WILDBERRIES".parse::<ProviderId>().unwrap(),
            ProviderId::Wildberries
        );
        assert_eq!("wb".parse::<ProviderId>().unwrap(), ProviderId::Wildberries);
        assert!("yandex".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for provider in ProviderId::ALL {
            assert_eq!(provider.to_string().parse::<ProviderId>().unwrap(), provider);
        }
    }
}
