//! Startup settings read from the environment
//!
//! Missing or malformed required values abort startup.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::config::{AuthConfig, DirectoryConfig, SupersedePolicy};
use auth::domain::value_object::directory_scope::DirectoryScope;

const KEY_LEN: usize = 32;

pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub listen_addr: SocketAddr,
    pub auth: AuthConfig,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let encryption_key = parse_encryption_key(&required("ENCRYPTION_KEY")?)?;

        let jwt_secret = required("JWT_SECRET_KEY")?;
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET_KEY must not be empty");
        }

        let scopes = match env::var("LDAP_SCOPES") {
            Ok(list) => DirectoryScope::parse_list(&list).context("LDAP_SCOPES")?,
            Err(_) => DirectoryScope::defaults(
                &env::var("LDAP_BASE_DN").unwrap_or_else(|_| "dc=example,dc=org".to_string()),
            ),
        };
        if scopes.is_empty() {
            bail!("LDAP_SCOPES must name at least one scope");
        }

        let directory = DirectoryConfig {
            url: required("LDAP_URL")?,
            bind_dn: required("LDAP_BIND_DN")?,
            bind_password: required("LDAP_BIND_PASSWORD")?,
            scopes,
            connect_timeout: Duration::from_secs(optional("LDAP_CONNECT_TIMEOUT_SECS", 10)?),
        };

        let supersede_policy = match env::var("SESSION_SUPERSEDE_POLICY") {
            Ok(value) => value
                .parse::<SupersedePolicy>()
                .map_err(anyhow::Error::msg)
                .context("SESSION_SUPERSEDE_POLICY")?,
            Err(_) => SupersedePolicy::default(),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: optional("DATABASE_MAX_CONNECTIONS", 5)?,
            listen_addr: optional("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            auth: AuthConfig {
                encryption_key,
                jwt_secret: jwt_secret.into_bytes(),
                supersede_policy,
                directory,
                ..AuthConfig::default()
            },
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} must be set in environment"))
}

fn optional<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{name}: {e}")),
        Err(_) => Ok(default),
    }
}

/// The key is used as raw bytes and must be exactly 32 of them
fn parse_encryption_key(value: &str) -> anyhow::Result<[u8; KEY_LEN]> {
    value.as_bytes().try_into().map_err(|_| {
        anyhow::anyhow!(
            "ENCRYPTION_KEY must be exactly {KEY_LEN} bytes, got {}",
            value.len()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_key_length() {
        assert!(parse_encryption_key("0123456789abcdef0123456789abcdef").is_ok());
        assert!(parse_encryption_key("short").is_err());
        assert!(parse_encryption_key(&"x".repeat(33)).is_err());
    }
}
