//! LDAP Directory Implementation

use std::sync::Arc;

use ldap3::{
    DerefAliases, Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry,
    SearchOptions, ldap_escape,
};

use crate::application::config::AuthConfig;
use crate::domain::directory::{DirectoryConnection, DirectoryConnector};
use crate::error::{AuthError, AuthResult};

/// `invalidCredentials` result code
const RC_INVALID_CREDENTIALS: u32 = 49;

fn directory_error(err: LdapError) -> AuthError {
    AuthError::Directory(err.to_string())
}

/// Opens one LDAP connection per login attempt
#[derive(Clone)]
pub struct LdapConnector {
    config: Arc<AuthConfig>,
}

impl LdapConnector {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }
}

impl DirectoryConnector for LdapConnector {
    type Connection = LdapConnection;

    async fn connect(&self) -> AuthResult<LdapConnection> {
        let directory = &self.config.directory;
        let settings = LdapConnSettings::new().set_conn_timeout(directory.connect_timeout);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &directory.url)
            .await
            .map_err(directory_error)?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "Directory connection error");
            }
        });

        Ok(LdapConnection { ldap })
    }
}

/// Open LDAP connection
pub struct LdapConnection {
    ldap: Ldap,
}

impl DirectoryConnection for LdapConnection {
    async fn bind(&mut self, dn: &str, password: &str) -> AuthResult<bool> {
        let result = self
            .ldap
            .simple_bind(dn, password)
            .await
            .map_err(directory_error)?;

        match result.rc {
            0 => Ok(true),
            RC_INVALID_CREDENTIALS => Ok(false),
            rc => Err(AuthError::Directory(format!(
                "bind failed with result code {rc}"
            ))),
        }
    }

    async fn search_uid(&mut self, base_dn: &str, uid: &str) -> AuthResult<Vec<String>> {
        let filter = format!("(&(objectClass=*)(uid={}))", ldap_escape(uid));

        let (entries, _) = self
            .ldap
            .with_search_options(SearchOptions::new().deref(DerefAliases::Never))
            .search(base_dn, Scope::Subtree, &filter, vec!["1.1"])
            .await
            .map_err(directory_error)?
            .success()
            .map_err(directory_error)?;

        Ok(entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).dn)
            .collect())
    }

    async fn unbind(&mut self) -> AuthResult<()> {
        self.ldap.unbind().await.map_err(directory_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_escapes_uid() {
        let filter = format!("(&(objectClass=*)(uid={}))", ldap_escape("a*)(uid=*"));
        assert_eq!(filter, r"(&(objectClass=*)(uid=a\2a\29\28uid=\2a))");
    }
}
