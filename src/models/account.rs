// file: src/models/account.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;

/// A configured sync account as stored locally.
///
/// `credential_ref` is an opaque handle into the platform credential store;
/// this crate can never resolve it to a password or private key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Option<i64>,
    pub account_name: String,
    pub server_url: String,
    pub username: String,
    pub credential_ref: Option<String>,
    pub certificate_fingerprint: Option<String>,
}

impl Account {
    pub fn new(account_name: String, server_url: String, username: String) -> Self {
        Self {
            id: None,
            account_name,
            server_url,
            username,
            credential_ref: None,
            certificate_fingerprint: None,
        }
    }

    /// Identity used when matching against other records: host is compared
    /// case-insensitively, username case-sensitively.
    pub fn identity(&self) -> (String, String) {
        identity_key(&self.server_url, &self.username)
    }
}

/// (server-URL host lowercased, username verbatim).
///
/// Falls back to the whole trimmed URL when it does not parse, so two
/// equally malformed records still compare equal.
pub fn identity_key(server_url: &str, username: &str) -> (String, String) {
    let host = Url::parse(server_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .unwrap_or_else(|| server_url.trim().to_ascii_lowercase());
    (host, username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_new() {
        let account = Account::new(
            "Work".to_string(),
            "https://dav.example.com".to_string(),
            "alice".to_string(),
        );

        assert_eq!(account.account_name, "Work");
        assert_eq!(account.server_url, "https://dav.example.com");
        assert_eq!(account.username, "alice");
        assert_eq!(account.credential_ref, None);
        assert_eq!(account.certificate_fingerprint, None);
    }

    #[test]
    fn test_identity_host_is_case_insensitive() {
        let a = identity_key("https://DAV.Example.COM/dav", "alice");
        let b = identity_key("https://dav.example.com/other-path", "alice");
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_username_is_case_sensitive() {
        let a = identity_key("https://dav.example.com", "alice");
        let b = identity_key("https://dav.example.com", "Alice");
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_unparseable_url_falls_back_to_string() {
        let a = identity_key("not a url", "alice");
        assert_eq!(a.0, "not a url");
    }
}
