//! Session Tokens
//!
//! Stateless sessions: the token itself carries the signed-in user and its
//! expiry, so nothing is stored server-side.
//!
//! Format: `base64url(claims JSON) "." base64url(HMAC-SHA256(secret, first segment))`

use chrono::{DateTime, Duration, Utc};
use kernel::id::AdminUserId;
use platform::crypto::{from_base64url, sign_hmac_sha256, to_base64url, verify_hmac_sha256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Identity recovered from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: AdminUserId,
    pub login_id: String,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Freshly signed token and its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    uid: Uuid,
    login_id: String,
    display_name: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens.
pub struct SessionCodec {
    secret: [u8; 32],
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: [u8; 32], ttl: std::time::Duration) -> Self {
        Self {
            secret,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(7)),
        }
    }

    pub fn issue(
        &self,
        id: &AdminUserId,
        login_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedSession> {
        let issued_at = now;
        let expires_at = now + self.ttl;
        let claims = Claims {
            uid: id.into_uuid(),
            login_id: login_id.to_owned(),
            display_name: display_name.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let json = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::Internal(format!("Session claims: {e}")))?;
        let payload = to_base64url(&json);
        let tag = sign_hmac_sha256(&self.secret, payload.as_bytes())
            .map_err(|e| AuthError::Internal(format!("Session signing: {e}")))?;

        Ok(IssuedSession {
            token: format!("{payload}.{}", to_base64url(&tag)),
            issued_at,
            expires_at,
        })
    }

    /// Verify integrity and expiry. Any defect reads as "no session".
    pub fn read(&self, token: &str, now: DateTime<Utc>) -> Option<SessionUser> {
        let (payload, tag_b64) = token.split_once('.')?;
        let tag = from_base64url(tag_b64).ok()?;
        if !verify_hmac_sha256(&self.secret, payload.as_bytes(), &tag) {
            return None;
        }

        let claims: Claims = serde_json::from_slice(&from_base64url(payload).ok()?).ok()?;
        let issued_at = DateTime::from_timestamp(claims.iat, 0)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)?;
        if now >= expires_at {
            return None;
        }

        Some(SessionUser {
            id: AdminUserId::from_uuid(claims.uid),
            login_id: claims.login_id,
            display_name: claims.display_name,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn codec() -> SessionCodec {
        SessionCodec::new([9u8; 32], std::time::Duration::from_secs(7 * 24 * 3600))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_then_read() {
        let id = AdminUserId::new();
        let issued = codec().issue(&id, "admin", "Site Admin", now()).unwrap();
        assert_eq!(issued.expires_at, now() + Duration::days(7));

        let user = codec().read(&issued.token, now()).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.login_id, "admin");
        assert_eq!(user.display_name, "Site Admin");
        assert_eq!(user.expires_at, issued.expires_at);
    }

    #[test]
    fn test_expired_token_reads_as_absent() {
        let issued = codec()
            .issue(&AdminUserId::new(), "admin", "A", now())
            .unwrap();
        let just_before = now() + Duration::days(7) - Duration::seconds(1);
        assert!(codec().read(&issued.token, just_before).is_some());
        assert!(codec().read(&issued.token, now() + Duration::days(7)).is_none());
    }

    #[test]
    fn test_tampered_payload_reads_as_absent() {
        let issued = codec()
            .issue(&AdminUserId::new(), "admin", "A", now())
            .unwrap();
        let (_, tag) = issued.token.split_once('.').unwrap();

        let forged_claims = Claims {
            uid: Uuid::new_v4(),
            login_id: "root".into(),
            display_name: "Root".into(),
            iat: now().timestamp(),
            exp: (now() + Duration::days(365)).timestamp(),
        };
        let forged_payload = to_base64url(&serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{tag}");
        assert!(codec().read(&forged, now()).is_none());
    }

    #[test]
    fn test_other_secret_and_garbage_read_as_absent() {
        let issued = codec()
            .issue(&AdminUserId::new(), "admin", "A", now())
            .unwrap();
        let other = SessionCodec::new([1u8; 32], std::time::Duration::from_secs(60));
        assert!(other.read(&issued.token, now()).is_none());

        for junk in ["", ".", "abc", "abc.def", "!!!.???"] {
            assert!(codec().read(junk, now()).is_none(), "{junk}");
        }
    }
}
