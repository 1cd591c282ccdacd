use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration, loaded from a TOML file.
///
/// ```toml
/// listen = "0.0.0.0:8080"
///
/// [storage]
/// data_dir = "/var/lib/svcreg"
///
/// [jwt]
/// secret = "change-me"
///
/// [[organizations]]
/// code = "MIN"
/// name = "Ministry of Services"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address; the CLI flag overrides this.
    #[serde(default)]
    pub listen: Option<String>,

    pub storage: StorageConfig,

    pub jwt: JwtConfig,

    /// Organizations to ensure at startup. Tokens for callers outside
    /// these organizations are rejected by the catalog.
    #[serde(default)]
    pub organizations: Vec<OrganizationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory that holds all persistent data.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret used to validate bearer tokens. Token issuance lives
    /// with the external identity provider that shares this secret.
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationConfig {
    pub code: String,
    pub name: String,
}

impl ServerConfig {
    /// Resolve a context name to a config path.
    ///
    /// A bare name resolves to `/etc/svcreg/<name>.toml`; anything
    /// containing `/` or `.` is used as a path directly.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/svcreg/{}.toml", name_or_path))
        }
    }

    /// Load and parse the configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path.display(), e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_bare_name() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/svcreg/prod.toml")
        );
    }

    #[test]
    fn resolve_explicit_path() {
        assert_eq!(
            ServerConfig::resolve_path("./svcreg.toml"),
            PathBuf::from("./svcreg.toml")
        );
    }

    #[test]
    fn parse_full_config() {
        let raw = r#"
            listen = "127.0.0.1:9090"

            [storage]
            data_dir = "/tmp/svcreg"

            [jwt]
            secret = "test-secret-test-secret"

            [[organizations]]
            code = "MIN"
            name = "Ministry"
        "#;
        let config: ServerConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.listen.as_deref(), Some("127.0.0.1:9090"));
        assert_eq!(config.storage.data_dir, "/tmp/svcreg");
        assert_eq!(config.organizations.len(), 1);
        assert_eq!(config.organizations[0].code, "MIN");
    }

    #[test]
    fn organizations_default_empty() {
        let raw = r#"
            [storage]
            data_dir = "/tmp/svcreg"

            [jwt]
            secret = "s"
        "#;
        let config: ServerConfig = toml::from_str(raw).unwrap();
        assert!(config.organizations.is_empty());
        assert!(config.listen.is_none());
    }
}
