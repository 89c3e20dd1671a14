//! Share tokens: per-(document, trusted person) grants.

use chrono::{DateTime, Utc};
use papersafe_crypto::WrappedKey;
use papersafe_vault::{DocumentId, OwnerId, TrustedPersonId};
use serde::{Deserialize, Serialize};

/// What the trusted person may do with the document.
///
/// `View` grants an ephemeral decrypt-and-render path; `Download` also
/// permits handing the decrypted bytes to persistent storage. The
/// cryptography is identical; the gate is policy, enforced at access time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    View,
    Download,
}

/// One share grant. The wrapped DEK is the only key material, and it is
/// wrapped under the relationship key, so it is useless to the server and
/// to any other trusted person.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShareToken {
    pub owner: OwnerId,
    pub document: DocumentId,
    pub trusted_person: TrustedPersonId,
    /// The document DEK re-wrapped under this relationship's RK.
    pub wrapped_dek_for_recipient: WrappedKey,
    pub permission: SharePermission,
    /// Absolute expiry; `None` means no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Set once by revocation, never cleared.
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ShareToken {
    /// Usability at a given instant: not revoked, not expired.
    ///
    /// Monotonic in revocation: once `revoked_at` is set there is no input
    /// for which this returns true.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at.is_none_or(|expiry| expiry > now)
    }

    /// Usability against the wall clock.
    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use papersafe_crypto::{generate_dek, generate_master_key, wrap_content_key};

    fn token(expires_at: Option<DateTime<Utc>>, revoked_at: Option<DateTime<Utc>>) -> ShareToken {
        ShareToken {
            owner: OwnerId::new(),
            document: DocumentId::new(),
            trusted_person: TrustedPersonId::new(),
            wrapped_dek_for_recipient: wrap_content_key(&generate_dek(), &generate_master_key())
                .unwrap(),
            permission: SharePermission::View,
            expires_at,
            revoked_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_expiry_no_revocation_is_usable() {
        assert!(token(None, None).is_usable());
    }

    #[test]
    fn future_expiry_is_usable_past_expiry_is_not() {
        let now = Utc::now();
        assert!(token(Some(now + Duration::hours(1)), None).is_usable_at(now));
        assert!(!token(Some(now - Duration::seconds(1)), None).is_usable_at(now));
        // Expiry boundary is exclusive
        assert!(!token(Some(now), None).is_usable_at(now));
    }

    #[test]
    fn revocation_is_terminal_regardless_of_expiry() {
        let now = Utc::now();
        let revoked = token(Some(now + Duration::days(30)), Some(now));

        assert!(!revoked.is_usable_at(now));
        // Never usable again, at any later instant
        assert!(!revoked.is_usable_at(now + Duration::days(365)));
    }

    #[test]
    fn permission_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SharePermission::Download).unwrap(),
            "\"download\""
        );
    }
}
