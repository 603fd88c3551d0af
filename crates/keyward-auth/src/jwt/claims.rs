//! JWT claims structure carried by every issued token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keyward_core::types::UserId;

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Email the token was issued for.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns the remaining lifetime, measured in milliseconds so it never
    /// reaches past `exp`. Zero once expired.
    pub fn remaining_ttl(&self) -> Duration {
        self.remaining_ttl_at(Utc::now().timestamp_millis())
    }

    fn remaining_ttl_at(&self, now_millis: i64) -> Duration {
        let remaining = self.exp.saturating_mul(1000).saturating_sub(now_millis);
        Duration::from_millis(u64::try_from(remaining).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> Claims {
        Claims {
            sub: UserId::new(),
            email: "a@test.com".into(),
            iat: 1_000,
            exp,
        }
    }

    #[test]
    fn test_remaining_ttl_floors_at_zero() {
        assert_eq!(
            claims(1_060).remaining_ttl_at(1_000_000),
            Duration::from_secs(60)
        );
        assert_eq!(claims(1_000).remaining_ttl_at(1_000_000), Duration::ZERO);
        assert_eq!(claims(900).remaining_ttl_at(1_000_000), Duration::ZERO);
    }

    #[test]
    fn test_remaining_ttl_counts_partial_seconds() {
        // 999 ms into second 1_000 leaves 59.001 s, not 60 s.
        assert_eq!(
            claims(1_060).remaining_ttl_at(1_000_999),
            Duration::from_millis(59_001)
        );
    }

    #[test]
    fn test_subject_serializes_as_string() {
        let c = claims(2_000);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["sub"], c.sub.to_string());
        assert_eq!(json["exp"], 2_000);
    }
}
