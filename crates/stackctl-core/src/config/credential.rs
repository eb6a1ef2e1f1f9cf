//! Where profile tokens live
//!
//! The config file holds either the token itself or a `keyring:<key>`
//! pointer into the OS keyring. A caller-named environment variable
//! overrides both.

use super::error::{ConfigError, Result};

const KEYRING_PREFIX: &str = "keyring:";

#[cfg(feature = "secure-storage")]
const KEYRING_SERVICE: &str = "stackctl";

/// Backend a [`CredentialStore`] writes new secrets to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStorage {
    #[cfg(feature = "secure-storage")]
    Keyring,
    Plaintext,
}

#[derive(Debug)]
pub struct CredentialStore {
    storage: CredentialStorage,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "secure-storage")]
fn keyring_entry(key: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, key).map_err(|e| ConfigError::Keyring(e.to_string()))
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            storage: CredentialStorage::Plaintext,
        }
    }

    #[cfg(feature = "secure-storage")]
    pub fn keyring() -> Self {
        Self {
            storage: CredentialStorage::Keyring,
        }
    }

    pub fn storage(&self) -> CredentialStorage {
        self.storage
    }

    /// Persist `secret` and return what the config file should record for it
    pub fn store_credential(&self, key: &str, secret: &str) -> Result<String> {
        match self.storage {
            #[cfg(feature = "secure-storage")]
            CredentialStorage::Keyring => {
                keyring_entry(key)?
                    .set_password(secret)
                    .map_err(|e| ConfigError::Keyring(format!("cannot save '{key}': {e}")))?;
                Ok(format!("{KEYRING_PREFIX}{key}"))
            }
            CredentialStorage::Plaintext => {
                let _ = key;
                Ok(secret.to_string())
            }
        }
    }

    /// Turn a stored value back into the secret
    ///
    /// `env_var`, when set in the environment, short-circuits the lookup.
    pub fn get_credential(&self, stored: &str, env_var: Option<&str>) -> Result<String> {
        if let Some(from_env) = env_var.and_then(|var| std::env::var(var).ok()) {
            return Ok(from_env);
        }

        match stored.strip_prefix(KEYRING_PREFIX) {
            None => Ok(stored.to_string()),
            #[cfg(feature = "secure-storage")]
            Some(key) => keyring_entry(key)?
                .get_password()
                .map_err(|e| ConfigError::Keyring(format!("cannot read '{key}': {e}"))),
            #[cfg(not(feature = "secure-storage"))]
            Some(key) => Err(ConfigError::Credential(format!(
                "'{key}' lives in the keyring, but this build has no keyring support"
            ))),
        }
    }

    /// Drop the keyring entry behind `stored`; plain values are left alone
    pub fn delete_credential(&self, stored: &str) -> Result<()> {
        let Some(key) = stored.strip_prefix(KEYRING_PREFIX) else {
            return Ok(());
        };

        #[cfg(feature = "secure-storage")]
        {
            match keyring_entry(key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(ConfigError::Keyring(format!("cannot delete '{key}': {e}"))),
            }
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            Err(ConfigError::Credential(format!(
                "'{key}' lives in the keyring, but this build has no keyring support"
            )))
        }
    }

    pub fn is_keyring_reference(value: &str) -> bool {
        value.starts_with(KEYRING_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_pass_through() {
        let store = CredentialStore::new();
        assert_eq!(store.store_credential("dev-token", "abc").unwrap(), "abc");
        assert_eq!(store.get_credential("abc", None).unwrap(), "abc");
    }

    #[test]
    #[serial_test::serial]
    fn environment_wins_over_stored_value() {
        unsafe {
            std::env::set_var("STACKCTL_CREDENTIAL_UNDER_TEST", "from-env");
        }
        let resolved = CredentialStore::new()
            .get_credential("from-file", Some("STACKCTL_CREDENTIAL_UNDER_TEST"));
        unsafe {
            std::env::remove_var("STACKCTL_CREDENTIAL_UNDER_TEST");
        }

        assert_eq!(resolved.unwrap(), "from-env");
    }

    #[test]
    fn only_prefixed_values_are_references() {
        assert!(CredentialStore::is_keyring_reference("keyring:dev-token"));
        assert!(!CredentialStore::is_keyring_reference("dev-token"));
        assert!(!CredentialStore::is_keyring_reference(""));
    }

    #[test]
    fn deleting_a_plain_value_does_nothing() {
        assert!(CredentialStore::new().delete_credential("abc").is_ok());
    }

    #[cfg(not(feature = "secure-storage"))]
    #[test]
    fn keyring_reference_needs_keyring_support() {
        let err = CredentialStore::new()
            .get_credential("keyring:dev-token", None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Credential(_)));
    }

    #[cfg(not(feature = "secure-storage"))]
    #[test]
    fn deleting_a_keyring_reference_needs_keyring_support() {
        let err = CredentialStore::new()
            .delete_credential("keyring:dev-token")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Credential(_)));
    }

    #[cfg(feature = "secure-storage")]
    #[test]
    #[ignore = "needs a running keyring service"]
    fn keyring_round_trip() {
        let store = CredentialStore::keyring();
        let reference = store.store_credential("stackctl-test", "s3cret").unwrap();
        assert_eq!(reference, "keyring:stackctl-test");
        assert_eq!(store.get_credential(&reference, None).unwrap(), "s3cret");
        store.delete_credential(&reference).unwrap();
    }
}
