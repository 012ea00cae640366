// Secret lookup settings
// Read from an INI file on every request, never cached

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use config::FileFormat;

use crate::error::ServiceError;

/// Region and parameter name used to locate the encrypted secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretConfig {
    pub region: String,
    pub parameter_name: String,
}

impl SecretConfig {
    /// Read and validate the INI file at `path`
    ///
    /// Expects `region` under `[aws]` and `var_name` under `[secret]`.
    pub async fn load(path: &Path) -> Result<Self, ServiceError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ServiceError::ConfigNotFound(path.display().to_string()));
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(ServiceError::ConfigMalformed(format!(
                    "{}: {e}",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(ServiceError::ConfigNotFound(format!(
                    "{}: {e}",
                    path.display()
                )));
            }
        };

        Self::parse(&content)
    }

    /// Parse INI content into a validated config
    pub fn parse(content: &str) -> Result<Self, ServiceError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, FileFormat::Ini))
            .build()
            .map_err(|e| ServiceError::ConfigMalformed(e.to_string()))?;

        Ok(Self {
            region: required(&settings, "aws.region")?,
            parameter_name: required(&settings, "secret.var_name")?,
        })
    }
}

fn required(settings: &config::Config, key: &str) -> Result<String, ServiceError> {
    let value = settings
        .get_string(key)
        .map_err(|e| ServiceError::ConfigMalformed(format!("{key}: {e}")))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::ConfigMalformed(format!("{key} is empty")));
    }
    Ok(value.to_string())
}

/// Resolve the configured path; relative paths are anchored at the
/// directory holding the running executable
pub fn resolve_config_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map_or_else(|| path.to_path_buf(), |dir| dir.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = "[aws]\nregion = eu-west-1\n\n[secret]\nvar_name = my-secret\n";

    #[test]
    fn test_parse_valid() {
        let cfg = SecretConfig::parse(VALID).unwrap();
        assert_eq!(cfg.region, "eu-west-1");
        assert_eq!(cfg.parameter_name, "my-secret");
    }

    #[test]
    fn test_parse_missing_key() {
        let err = SecretConfig::parse("[aws]\nregion = eu-west-1\n").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigMalformed(ref m) if m.contains("secret.var_name")));
    }

    #[test]
    fn test_parse_empty_value() {
        let err = SecretConfig::parse("[aws]\nregion =\n[secret]\nvar_name = x\n").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigMalformed(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SecretConfig::load(&dir.path().join("secret.ini"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ConfigNotFound(_)));
    }

    #[tokio::test]
    async fn test_load_non_utf8_file_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[aws]\nregion = \xff\xfe\n").unwrap();
        let err = SecretConfig::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ConfigMalformed(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let cfg = SecretConfig::load(file.path()).await.unwrap();
        assert_eq!(cfg.parameter_name, "my-secret");
    }

    #[test]
    fn test_resolve_absolute_path_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let abs = dir.path().join("secret.ini");
        let resolved = resolve_config_path(abs.to_str().unwrap());
        assert_eq!(resolved, abs);
    }

    #[test]
    fn test_resolve_relative_path_next_to_executable() {
        let resolved = resolve_config_path("conf/secret.ini");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("conf/secret.ini"));
    }
}
