//! AWS-backed upstreams: SSM Parameter Store and KMS
//!
//! The shared SDK configuration (credential chain, retry and timeout
//! settings) is loaded once; per request a client is derived from it for the
//! region named in the secret config.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_kms::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_kms::operation::decrypt::DecryptError;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;

use super::{KeyManagement, ParameterStore};
use crate::error::ServiceError;

pub struct AwsSecretClients {
    sdk_config: SdkConfig,
}

impl AwsSecretClients {
    /// Load credentials and defaults from the environment, profile files or
    /// instance metadata, the same chain the AWS CLI uses
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self { sdk_config }
    }

    fn ssm_client(&self, region: &str) -> aws_sdk_ssm::Client {
        let conf = aws_sdk_ssm::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_owned()))
            .build();
        aws_sdk_ssm::Client::from_conf(conf)
    }

    fn kms_client(&self, region: &str) -> aws_sdk_kms::Client {
        let conf = aws_sdk_kms::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_owned()))
            .build();
        aws_sdk_kms::Client::from_conf(conf)
    }
}

#[async_trait]
impl ParameterStore for AwsSecretClients {
    async fn get_parameter(
        &self,
        region: &str,
        name: &str,
        with_decryption: bool,
    ) -> Result<String, ServiceError> {
        tracing::debug!(region, name, with_decryption, "ssm:GetParameter");

        let output = self
            .ssm_client(region)
            .get_parameter()
            .name(name)
            .with_decryption(with_decryption)
            .send()
            .await
            .map_err(|err| map_get_parameter_error(name, &err))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(ToString::to_string)
            .ok_or_else(|| ServiceError::SecretNotFound(format!("{name} has no value")))
    }
}

#[async_trait]
impl KeyManagement for AwsSecretClients {
    async fn decrypt(
        &self,
        region: &str,
        ciphertext_blob: Vec<u8>,
    ) -> Result<Vec<u8>, ServiceError> {
        tracing::debug!(region, bytes = ciphertext_blob.len(), "kms:Decrypt");

        let output = self
            .kms_client(region)
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext_blob))
            .send()
            .await
            .map_err(|err| map_decrypt_error(&err))?;

        output
            .plaintext()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| ServiceError::DecryptionFailed("kms:Decrypt returned no plaintext".into()))
    }
}

/// Error codes KMS reports outside the modeled `Decrypt` errors that mean
/// the service could not answer right now
const KMS_RETRYABLE_CODES: &[&str] = &[
    "ThrottlingException",
    "ServiceUnavailableException",
    "RequestTimeoutException",
];

/// Only a missing parameter is the caller's problem; any other failure means
/// SSM could not be reached or refused to answer
fn map_get_parameter_error<R>(name: &str, err: &SdkError<GetParameterError, R>) -> ServiceError
where
    R: Debug + 'static,
{
    if err
        .as_service_error()
        .is_some_and(GetParameterError::is_parameter_not_found)
    {
        return ServiceError::SecretNotFound(name.to_string());
    }
    ServiceError::UpstreamUnavailable(format!(
        "ssm:GetParameter: {}",
        aws_sdk_ssm::error::DisplayErrorContext(err)
    ))
}

/// KMS rejections of the ciphertext or key are decryption failures; KMS
/// being down, throttled or unreachable is an upstream failure
fn map_decrypt_error<R>(err: &SdkError<DecryptError, R>) -> ServiceError
where
    R: Debug + 'static,
{
    let context = format!(
        "kms:Decrypt: {}",
        aws_sdk_kms::error::DisplayErrorContext(err)
    );

    let Some(service_err) = err.as_service_error() else {
        return ServiceError::UpstreamUnavailable(context);
    };

    let unavailable = match service_err {
        DecryptError::KmsInternalException(_)
        | DecryptError::DependencyTimeoutException(_)
        | DecryptError::KeyUnavailableException(_) => true,
        other => other
            .code()
            .is_some_and(|code| KMS_RETRYABLE_CODES.contains(&code)),
    };

    if unavailable {
        ServiceError::UpstreamUnavailable(context)
    } else {
        ServiceError::DecryptionFailed(context)
    }
}
