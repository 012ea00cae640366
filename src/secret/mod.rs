//! Secret retrieval pipeline
//!
//! Fetches an encrypted value from the parameter store, base64-decodes it and
//! asks the key-management service to decrypt it. Upstream services sit behind
//! [`ParameterStore`] and [`KeyManagement`] so they can be swapped in tests.

mod aws;

pub use aws::AwsSecretClients;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::config::SecretConfig;
use crate::error::ServiceError;

/// Parameter store "get parameter" operation
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get_parameter(
        &self,
        region: &str,
        name: &str,
        with_decryption: bool,
    ) -> Result<String, ServiceError>;
}

/// Key-management "decrypt" operation
#[async_trait]
pub trait KeyManagement: Send + Sync {
    async fn decrypt(&self, region: &str, ciphertext_blob: Vec<u8>)
        -> Result<Vec<u8>, ServiceError>;
}

/// Body returned by `GET /secret`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SecretResponse {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Run the lookup for one request. No caching and no retries.
pub async fn fetch_secret(
    config: &SecretConfig,
    store: &dyn ParameterStore,
    kms: &dyn KeyManagement,
) -> Result<SecretResponse, ServiceError> {
    let encoded = store
        .get_parameter(&config.region, &config.parameter_name, false)
        .await?;

    let ciphertext = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::DecodeError(format!("parameter value is not base64: {e}")))?;

    let plaintext = kms.decrypt(&config.region, ciphertext).await?;
    let value = String::from_utf8(plaintext)
        .map_err(|e| ServiceError::DecodeError(format!("plaintext is not UTF-8: {e}")))?;

    Ok(SecretResponse {
        name: config.parameter_name.clone(),
        value,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory upstream fakes shared by handler and server tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeParameterStore {
        pub values: HashMap<String, String>,
        pub calls: AtomicUsize,
        pub last_request: Mutex<Option<(String, String, bool)>>,
        pub unavailable: bool,
    }

    impl FakeParameterStore {
        pub fn with(name: &str, value: &str) -> Self {
            let mut values = HashMap::new();
            values.insert(name.to_string(), value.to_string());
            Self {
                values,
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ParameterStore for FakeParameterStore {
        async fn get_parameter(
            &self,
            region: &str,
            name: &str,
            with_decryption: bool,
        ) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() =
                Some((region.to_string(), name.to_string(), with_decryption));
            if self.unavailable {
                return Err(ServiceError::UpstreamUnavailable("connection refused".into()));
            }
            self.values
                .get(name)
                .cloned()
                .ok_or_else(|| ServiceError::SecretNotFound(name.to_string()))
        }
    }

    /// Decrypts by table lookup of the exact ciphertext bytes
    #[derive(Default)]
    pub struct FakeKeyManagement {
        pub plaintexts: HashMap<Vec<u8>, Vec<u8>>,
        pub calls: AtomicUsize,
    }

    impl FakeKeyManagement {
        pub fn with(ciphertext: &[u8], plaintext: &[u8]) -> Self {
            let mut plaintexts = HashMap::new();
            plaintexts.insert(ciphertext.to_vec(), plaintext.to_vec());
            Self {
                plaintexts,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyManagement for FakeKeyManagement {
        async fn decrypt(
            &self,
            _region: &str,
            ciphertext_blob: Vec<u8>,
        ) -> Result<Vec<u8>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.plaintexts
                .get(&ciphertext_blob)
                .cloned()
                .ok_or_else(|| ServiceError::DecryptionFailed("InvalidCiphertextException".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeKeyManagement, FakeParameterStore};
    use super::*;

    fn config() -> SecretConfig {
        SecretConfig {
            region: "eu-west-1".to_string(),
            parameter_name: "my-secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_secret_success() {
        let store = FakeParameterStore::with("my-secret", "Y2lwaGVy");
        let kms = FakeKeyManagement::with(b"cipher", b"plaintext123");

        let resp = fetch_secret(&config(), &store, &kms).await.unwrap();
        assert_eq!(
            resp,
            SecretResponse {
                name: "my-secret".to_string(),
                value: "plaintext123".to_string(),
            }
        );

        let last = store.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(last, ("eu-west-1".to_string(), "my-secret".to_string(), false));
    }

    #[test]
    fn test_response_field_names() {
        let resp = SecretResponse {
            name: "my-secret".to_string(),
            value: "plaintext123".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({"Name": "my-secret", "Value": "plaintext123"}));
    }

    #[tokio::test]
    async fn test_fetch_secret_not_found() {
        let store = FakeParameterStore::default();
        let kms = FakeKeyManagement::default();

        let err = fetch_secret(&config(), &store, &kms).await.unwrap_err();
        assert!(matches!(err, ServiceError::SecretNotFound(_)));
        assert_eq!(kms.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_secret_invalid_base64() {
        let store = FakeParameterStore::with("my-secret", "not base64!!");
        let kms = FakeKeyManagement::default();

        let err = fetch_secret(&config(), &store, &kms).await.unwrap_err();
        assert!(matches!(err, ServiceError::DecodeError(_)));
        assert_eq!(kms.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_secret_decrypt_rejected() {
        // "b3RoZXI=" is "other", which the fake cannot decrypt
        let store = FakeParameterStore::with("my-secret", "b3RoZXI=");
        let kms = FakeKeyManagement::with(b"cipher", b"plaintext123");

        let err = fetch_secret(&config(), &store, &kms).await.unwrap_err();
        assert!(matches!(err, ServiceError::DecryptionFailed(_)));
        assert_eq!(kms.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_secret_non_utf8_plaintext() {
        let store = FakeParameterStore::with("my-secret", "Y2lwaGVy");
        let kms = FakeKeyManagement::with(b"cipher", &[0xff, 0xfe]);

        let err = fetch_secret(&config(), &store, &kms).await.unwrap_err();
        assert!(matches!(err, ServiceError::DecodeError(_)));
    }

    #[tokio::test]
    async fn test_fetch_secret_upstream_down() {
        let store = FakeParameterStore {
            unavailable: true,
            ..FakeParameterStore::default()
        };
        let kms = FakeKeyManagement::default();

        let err = fetch_secret(&config(), &store, &kms).await.unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamUnavailable(_)));
    }
}
