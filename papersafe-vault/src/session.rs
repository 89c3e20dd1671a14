//! Vault session: the master key lifecycle.
//!
//! States: `Uninitialized → Locked ⇄ Unlocked`. The master key exists only in
//! the `Unlocked` variant and only in memory; locking drops (and zeroizes) it.
//! A reload of the surrounding process always starts from `Locked`.

use crate::error::{VaultError, VaultResult};
use crate::ids::OwnerId;
use crate::material::{KeyMaterialStore, MasterKeyRecord};
use papersafe_crypto::{
    derive_wrapping_key, generate_master_key, unwrap_master_key, wrap_master_key, KdfParams,
    RecoveryKey, Salt, WrappingKey,
};
use std::sync::Arc;
use tracing::{debug, info};

const MIN_PASSPHRASE_LEN: usize = 8;

enum SessionState {
    Uninitialized,
    Locked,
    Unlocked(WrappingKey),
}

/// Client-held vault session for one owner.
///
/// The state is an enum rather than `is_set_up`/`is_unlocked` flags: code
/// cannot reach the master key without matching `Unlocked`, so a locked-vault
/// violation is impossible by construction.
pub struct VaultSession {
    owner: OwnerId,
    store: Arc<dyn KeyMaterialStore>,
    state: SessionState,
}

impl VaultSession {
    /// Opens a session, probing the store to distinguish a fresh vault from
    /// an existing (locked) one.
    pub async fn open(owner: OwnerId, store: Arc<dyn KeyMaterialStore>) -> VaultResult<Self> {
        let state = match store.load(owner).await? {
            Some(_) => SessionState::Locked,
            None => SessionState::Uninitialized,
        };
        Ok(Self {
            owner,
            store,
            state,
        })
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn is_set_up(&self) -> bool {
        !matches!(self.state, SessionState::Uninitialized)
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, SessionState::Unlocked(_))
    }

    /// The in-memory master key. This is the synchronous gate every document
    /// and share operation passes before its first await.
    pub fn master_key(&self) -> VaultResult<&WrappingKey> {
        match &self.state {
            SessionState::Unlocked(mk) => Ok(mk),
            SessionState::Locked => Err(VaultError::Locked),
            SessionState::Uninitialized => Err(VaultError::NotSetUp),
        }
    }

    /// First-time setup with the default KDF tuning (600k PBKDF2 iterations).
    ///
    /// Returns the generated recovery key. It is shown to the user exactly
    /// once and stored nowhere; losing both it and the passphrase loses the
    /// vault.
    pub async fn set_up(&mut self, passphrase: &str) -> VaultResult<RecoveryKey> {
        self.set_up_with_params(passphrase, KdfParams::default())
            .await
    }

    /// Setup with explicit KDF params (fixed into the record for all future
    /// unlocks).
    pub async fn set_up_with_params(
        &mut self,
        passphrase: &str,
        params: KdfParams,
    ) -> VaultResult<RecoveryKey> {
        if passphrase.len() < MIN_PASSPHRASE_LEN {
            return Err(VaultError::PassphraseTooShort);
        }
        if self.is_set_up() {
            return Err(VaultError::AlreadySetUp);
        }

        let recovery_key = RecoveryKey::generate();
        let master_key = generate_master_key();

        let kdf_salt = Salt::random();
        let recovery_key_salt = Salt::random();
        let pdk = derive_wrapping_key(passphrase, &kdf_salt, &params)?;
        let rdk = derive_wrapping_key(recovery_key.as_str(), &recovery_key_salt, &params)?;

        let record = MasterKeyRecord {
            kdf_salt,
            kdf_params: params,
            wrapped_mk: wrap_master_key(&master_key, &pdk)?,
            recovery_key_salt,
            wrapped_mk_with_recovery: wrap_master_key(&master_key, &rdk)?,
        };

        // State must not transition if the write fails
        self.store.save(self.owner, &record).await?;

        self.state = SessionState::Unlocked(master_key);
        info!(owner = %self.owner, "vault set up and unlocked");
        Ok(recovery_key)
    }

    /// Unlocks with the passphrase. Every failure short of store I/O is
    /// reported as `InvalidPassphrase`, including an absent key-material
    /// record; the state stays locked.
    pub async fn unlock(&mut self, passphrase: &str) -> VaultResult<()> {
        let record = self.fetch_record(VaultError::InvalidPassphrase).await?;

        let pdk = derive_wrapping_key(passphrase, &record.kdf_salt, &record.kdf_params)
            .map_err(|_| VaultError::InvalidPassphrase)?;
        let master_key = unwrap_master_key(&record.wrapped_mk, &pdk)
            .map_err(|_| VaultError::InvalidPassphrase)?;

        self.state = SessionState::Unlocked(master_key);
        info!(owner = %self.owner, "vault unlocked with passphrase");
        Ok(())
    }

    /// Unlocks with the recovery key, yielding the identical master key.
    pub async fn unlock_with_recovery(&mut self, recovery_key: &str) -> VaultResult<()> {
        let recovery_key =
            RecoveryKey::parse(recovery_key).map_err(|_| VaultError::InvalidRecoveryKey)?;
        let record = self.fetch_record(VaultError::InvalidRecoveryKey).await?;

        let rdk = derive_wrapping_key(
            recovery_key.as_str(),
            &record.recovery_key_salt,
            &record.kdf_params,
        )
        .map_err(|_| VaultError::InvalidRecoveryKey)?;
        let master_key = unwrap_master_key(&record.wrapped_mk_with_recovery, &rdk)
            .map_err(|_| VaultError::InvalidRecoveryKey)?;

        self.state = SessionState::Unlocked(master_key);
        info!(owner = %self.owner, "vault unlocked with recovery key");
        Ok(())
    }

    /// Drops the in-memory master key. No persistence side effect.
    pub fn lock(&mut self) {
        if self.is_set_up() {
            self.state = SessionState::Locked;
            debug!(owner = %self.owner, "vault locked");
        }
    }

    /// An absent record is reported as the caller's invalid-credential
    /// error: unlock must not reveal whether key material exists.
    async fn fetch_record(&self, missing: VaultError) -> VaultResult<MasterKeyRecord> {
        self.store.load(self.owner).await?.ok_or(missing)
    }
}
