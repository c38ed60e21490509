use serde::{Deserialize, Serialize};
use std::fmt;

use super::ProviderId;

/// Provider-issued access keys
///
/// `Debug` never prints secrets; only their lengths are shown.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Credential {
    Ozon { client_id: String, api_key: String },
    Wildberries { api_key: String },
}

impl Credential {
    pub fn ozon(client_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Credential::Ozon {
            client_id: client_id.into(),
            api_key: api_key.into(),
        }
    }

    pub fn wildberries(api_key: impl Into<String>) -> Self {
        Credential::Wildberries {
            api_key: api_key.into(),
        }
    }

    /// Provider this credential belongs to
    pub fn provider(&self) -> ProviderId {
        match self {
            Credential::Ozon { .. } => ProviderId::Ozon,
            Credential::Wildberries { .. } => ProviderId::Wildberries,
        }
    }
}

fn mask(secret: &str) -> String {
    "*".repeat(secret.len())
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Ozon { client_id, api_key } => f
                .debug_struct("Ozon")
                .field("client_id", &mask(client_id))
                .field("api_key", &mask(api_key))
                .finish(),
            Credential::Wildberries { api_key } => f
                .debug_struct("Wildberries")
                .field("api_key", &mask(api_key))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_secrets() {
        let cred = Credential::ozon("12345", "secret-key");
        let printed = format!("{:?}", cred);

        assert!(!printed.contains("secret-key"));
        assert!(!printed.contains("12345"));
        assert_eq!(cred.provider(), ProviderId::Ozon);
    }

    #[test]
    fn test_tagged_json() {
        let cred: Credential =
            serde_json::from_str(r#"{"provider":"wildberries","api_key":"k"}"#).unwrap();
        assert_eq!(cred, Credential::wildberries("k"));
    }
}
