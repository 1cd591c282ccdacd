//! Startup checks and data seeding.

use catalog::service::CatalogService;
use tracing::info;

use crate::config::{OrganizationConfig, ServerConfig};

/// Verify the configuration is usable before touching storage.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.len() < 16 {
        anyhow::bail!("jwt.secret must be at least 16 characters");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("storage.data_dir must not be empty");
    }
    if config.organizations.is_empty() {
        anyhow::bail!("at least one [[organizations]] entry is required");
    }
    Ok(())
}

/// Ensure all configured organizations exist.
pub fn ensure_organizations(
    service: &CatalogService,
    organizations: &[OrganizationConfig],
) -> anyhow::Result<()> {
    for org in organizations {
        let ensured = service
            .ensure_organization(&org.code, &org.name)
            .map_err(|e| anyhow::anyhow!("organization {}: {}", org.code, e))?;
        info!(code = %ensured.code, "organization ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, StorageConfig};

    fn config() -> ServerConfig {
        ServerConfig {
            listen: None,
            storage: StorageConfig {
                data_dir: "/tmp/svcreg".into(),
            },
            jwt: JwtConfig {
                secret: "long-enough-secret-value".into(),
            },
            organizations: vec![OrganizationConfig {
                code: "MIN".into(),
                name: "Ministry".into(),
            }],
        }
    }

    #[test]
    fn valid_config_passes() {
        verify_config(&config()).unwrap();
    }

    #[test]
    fn short_secret_rejected() {
        let mut c = config();
        c.jwt.secret = "short".into();
        assert!(verify_config(&c).is_err());
    }

    #[test]
    fn missing_organizations_rejected() {
        let mut c = config();
        c.organizations.clear();
        assert!(verify_config(&c).is_err());
    }
}
