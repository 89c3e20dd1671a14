//! Relationship keys.
//!
//! One random RK per (owner, trusted person) pair, stored wrapped two ways:
//! under the owner's master key (so the owner can share further documents
//! without retaining the access secret) and under a key derived from the
//! out-of-band access secret (so the trusted person can unwrap it without
//! the server ever seeing a usable key).

use chrono::{DateTime, Utc};
use papersafe_crypto::{
    derive_wrapping_key, generate_relationship_key, unwrap_master_key, wrap_master_key,
    AccessSecret, CryptoResult, KdfParams, Salt, WrappedKey, WrappingKey,
};
use papersafe_vault::{OwnerId, TrustedPersonId};
use serde::{Deserialize, Serialize};

/// Server-stored relationship record. Both RK wraps are opaque ciphertext.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub owner: OwnerId,
    pub trusted_person: TrustedPersonId,
    /// RK wrapped under the owner's master key.
    pub wrapped_rk_for_owner: WrappedKey,
    /// RK wrapped under the secret-derived key only the recipient can rebuild.
    pub wrapped_rk_for_recipient: WrappedKey,
    /// Salt for the recipient's secret derivation.
    pub secret_salt: Salt,
    pub kdf_params: KdfParams,
    pub created_at: DateTime<Utc>,
}

impl RelationshipRecord {
    /// Creates a relationship: fresh RK, fresh access secret, both wraps.
    ///
    /// The returned secret is handed to the trusted person out-of-band and
    /// never persisted.
    pub fn establish(
        owner: OwnerId,
        trusted_person: TrustedPersonId,
        master_key: &WrappingKey,
        kdf_params: KdfParams,
    ) -> CryptoResult<(Self, AccessSecret)> {
        let rk = generate_relationship_key();
        let secret = AccessSecret::generate();
        let secret_salt = Salt::random();

        let recipient_kek = derive_wrapping_key(secret.as_str(), &secret_salt, &kdf_params)?;

        let record = Self {
            owner,
            trusted_person,
            wrapped_rk_for_owner: wrap_master_key(&rk, master_key)?,
            wrapped_rk_for_recipient: wrap_master_key(&rk, &recipient_kek)?,
            secret_salt,
            kdf_params,
            created_at: Utc::now(),
        };
        Ok((record, secret))
    }

    /// Owner-side RK access, via the unlocked master key.
    pub fn owner_key(&self, master_key: &WrappingKey) -> CryptoResult<WrappingKey> {
        unwrap_master_key(&self.wrapped_rk_for_owner, master_key)
    }

    /// Recipient-side RK access, via the out-of-band access secret.
    pub fn recipient_key(&self, secret: &AccessSecret) -> CryptoResult<WrappingKey> {
        let kek = derive_wrapping_key(secret.as_str(), &self.secret_salt, &self.kdf_params)?;
        unwrap_master_key(&self.wrapped_rk_for_recipient, &kek)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papersafe_crypto::{generate_dek, generate_master_key, unwrap_content_key, wrap_content_key, KdfHash};

    fn fast_params() -> KdfParams {
        KdfParams {
            iterations: 1_000,
            hash: KdfHash::Sha256,
        }
    }

    #[test]
    fn owner_and_recipient_recover_the_same_rk() {
        let mk = generate_master_key();
        let (record, secret) =
            RelationshipRecord::establish(OwnerId::new(), TrustedPersonId::new(), &mk, fast_params())
                .unwrap();

        let rk_owner = record.owner_key(&mk).unwrap();
        let rk_recipient = record.recipient_key(&secret).unwrap();

        // Functional equivalence: a DEK wrapped by one unwraps with the other
        let dek = generate_dek();
        let wrapped = wrap_content_key(&dek, &rk_owner).unwrap();
        assert!(unwrap_content_key(&wrapped, &rk_recipient).is_ok());
    }

    #[test]
    fn wrong_secret_cannot_unwrap_rk() {
        let mk = generate_master_key();
        let (record, _secret) =
            RelationshipRecord::establish(OwnerId::new(), TrustedPersonId::new(), &mk, fast_params())
                .unwrap();

        let other = AccessSecret::generate();
        assert!(record.recipient_key(&other).is_err());
    }

    #[test]
    fn wrong_master_key_cannot_unwrap_rk() {
        let mk = generate_master_key();
        let (record, _) =
            RelationshipRecord::establish(OwnerId::new(), TrustedPersonId::new(), &mk, fast_params())
                .unwrap();

        assert!(record.owner_key(&generate_master_key()).is_err());
    }
}
