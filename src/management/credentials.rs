use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::{
    config,
    errors::{AuthError, StoreError},
    types::CredentialRecord,
    warning,
};

/// Checks a stored record against the service that issued it.
///
/// Returns the record to keep using, possibly refreshed. Returning
/// [`AuthError::InvalidCredential`] marks the record as unusable.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, record: &CredentialRecord) -> Result<CredentialRecord, AuthError>;
}

/// On-disk home of the destination credential record.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config() -> Self {
        Self::new(config::credentials_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<CredentialRecord>, StoreError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Writes the record next to the target and renames it into place.
    pub async fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        let tmp = self.temp_path();
        async_fs::write(&tmp, json).await?;
        if let Err(e) = async_fs::rename(&tmp, &self.path).await {
            let _ = async_fs::remove_file(&tmp).await;
            return Err(StoreError::Io(e));
        }
        Ok(())
    }

    pub async fn delete(&self) -> Result<(), StoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Loads the record and checks it with `validator`.
    ///
    /// A rejected or unreadable record is deleted and `None` is returned.
    /// A refreshed record handed back by the validator replaces the stored one.
    pub async fn load_validated<V>(
        &self,
        validator: &V,
    ) -> Result<Option<CredentialRecord>, AuthError>
    where
        V: CredentialValidator + ?Sized,
    {
        let record = match self.load().await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(StoreError::Serde(e)) => {
                warning!("Discarding unreadable credential file: {}", e);
                self.delete().await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match validator.validate(&record).await {
            Ok(valid) => {
                if valid != record {
                    self.save(&valid).await?;
                }
                Ok(Some(valid))
            }
            Err(AuthError::InvalidCredential(reason)) => {
                warning!("Stored credentials were rejected ({}), removing them.", reason);
                self.delete().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}
