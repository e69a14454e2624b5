//! Bearer token persistence and claim decoding.
//!
//! The token is an opaque three-segment string whose middle segment is
//! base64url-encoded JSON claims. Nothing here verifies the signature;
//! that is the backend's job. The client only needs the claims for
//! display and the `exp` claim for expiry checks.
//!
//! The store is a single file under the OS config directory, shared by
//! every terminal of the same OS user. All access is synchronous; a new
//! `set` or a `remove` discards the previous token with no history.

use std::fs;
use std::path::PathBuf;

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Token file name inside the store directory
const TOKEN_FILE: &str = "token";

/// Claims embedded in the token payload. `iat`/`exp` are seconds since
/// epoch. Backends are loose about claim types, so `sub` accepts either
/// a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(default, deserialize_with = "numeric_id")]
    pub sub: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

fn numeric_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Decode the claims from a token's middle segment.
///
/// Returns `None` for anything that is not three dot-separated segments
/// with a base64-decodable JSON payload. Never panics or errors.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = segments[1];
    // Tokens in the wild use base64url without padding, but some issuers
    // pad or use the standard alphabet.
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| general_purpose::STANDARD.decode(payload))
        .ok()?;

    serde_json::from_slice(&bytes).ok()
}

/// Whether a token should be treated as expired.
///
/// Fails closed: a token that cannot be decoded, or whose claims carry
/// no numeric `exp`, is reported as expired. A token is live only when
/// `exp` is strictly in the future.
pub fn is_expired(token: &str) -> bool {
    match decode_claims(token).and_then(|c| c.exp) {
        Some(exp) => exp <= Utc::now().timestamp(),
        None => true,
    }
}

/// File-backed store for the current bearer token.
///
/// All operations report failure instead of raising: a broken store
/// degrades to "not logged in", it never crashes the client.
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Persist the token. Returns whether persistence succeeded.
    pub fn set(&self, token: &str) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(error = %e, "Failed to create token store directory");
            return false;
        }
        match fs::write(self.token_path(), token) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to write token");
                false
            }
        }
    }

    /// The currently persisted token, or `None` if absent or unreadable.
    pub fn get(&self) -> Option<String> {
        match fs::read_to_string(self.token_path()) {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(_) => None,
        }
    }

    /// Clear the persisted token, effective on the next `get`.
    /// A token that was never stored counts as successfully removed.
    pub fn remove(&self) -> bool {
        let path = self.token_path();
        if !path.exists() {
            return true;
        }
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to remove token");
                false
            }
        }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a syntactically valid token with the given payload JSON.
    pub(crate) fn token_with_payload(payload: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("{}.{}.signature", header, body)
    }

    /// Build a token for user 1 expiring at the given epoch second.
    pub(crate) fn token_expiring_at(exp: i64) -> String {
        token_with_payload(&format!(
            r#"{{"sub":1,"name":"Asha","email":"asha@example.com","role":"user","iat":0,"exp":{}}}"#,
            exp
        ))
    }

    #[test]
    fn test_expired_token_is_expired() {
        let token = token_expiring_at(Utc::now().timestamp() - 1);
        assert!(is_expired(&token));
    }

    #[test]
    fn test_token_expiring_now_is_expired() {
        // Strictly-greater-than rule: exp == now is already expired.
        let token = token_expiring_at(Utc::now().timestamp());
        assert!(is_expired(&token));
    }

    #[test]
    fn test_future_token_is_live() {
        let token = token_expiring_at(Utc::now().timestamp() + 3600);
        assert!(!is_expired(&token));
    }

    #[test]
    fn test_malformed_tokens_are_expired_with_no_claims() {
        let malformed = [
            "",
            "no-dots-at-all",
            "only.two",
            "a.b.c.d",
            "header.!!!not-base64!!!.sig",
        ];
        for token in malformed {
            assert!(is_expired(token), "expected {:?} to be expired", token);
            assert!(decode_claims(token).is_none());
        }

        // Three segments, decodable base64, but not JSON.
        let not_json = format!(
            "h.{}.s",
            general_purpose::URL_SAFE_NO_PAD.encode("plain text")
        );
        assert!(is_expired(&not_json));
        assert!(decode_claims(&not_json).is_none());
    }

    #[test]
    fn test_token_without_exp_is_expired_but_decodable() {
        let token = token_with_payload(r#"{"sub":1,"name":"Asha"}"#);
        assert!(is_expired(&token));
        let claims = decode_claims(&token).expect("payload should decode");
        assert_eq!(claims.sub, Some(1));
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_string_sub_claim_parses() {
        let token = token_with_payload(r#"{"sub":"42","exp":99999999999}"#);
        let claims = decode_claims(&token).expect("payload should decode");
        assert_eq!(claims.sub, Some(42));
    }

    #[test]
    fn test_padded_standard_base64_payload_decodes() {
        let body = general_purpose::STANDARD.encode(r#"{"sub":7,"exp":99999999999}"#);
        let token = format!("h.{}.s", body);
        let claims = decode_claims(&token).expect("padded payload should decode");
        assert_eq!(claims.sub, Some(7));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path().join("divimate"));

        assert!(store.get().is_none());
        assert!(store.set("header.payload.sig"));
        assert_eq!(store.get().as_deref(), Some("header.payload.sig"));

        // A new token replaces the old one entirely.
        assert!(store.set("second.token.sig"));
        assert_eq!(store.get().as_deref(), Some("second.token.sig"));
    }

    #[test]
    fn test_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path().to_path_buf());

        store.set("a.b.c");
        assert!(store.remove());
        assert!(store.get().is_none());
        // Removing again still succeeds.
        assert!(store.remove());
    }

    #[test]
    fn test_store_set_reports_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Point the store "directory" at an existing regular file so
        // create_dir_all fails.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write blocker");

        let store = TokenStore::new(blocker);
        assert!(!store.set("a.b.c"));
        assert!(store.get().is_none());
    }
}
