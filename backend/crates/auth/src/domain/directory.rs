//! Directory Service Traits
//!
//! A connector opens one connection per login attempt; the connection is
//! stateful (its bind identity changes) so it is borrowed mutably.

use std::future::Future;

use crate::error::AuthResult;

/// Opens directory connections
pub trait DirectoryConnector: Send + Sync + 'static {
    type Connection: DirectoryConnection + Send;

    fn connect(&self) -> impl Future<Output = AuthResult<Self::Connection>> + Send;
}

/// One open directory connection
pub trait DirectoryConnection {
    /// Simple bind. `Ok(false)` means the directory rejected the credentials;
    /// `Err` is a transport or protocol failure.
    fn bind(
        &mut self,
        dn: &str,
        password: &str,
    ) -> impl Future<Output = AuthResult<bool>> + Send;

    /// DNs of all entries under `base_dn` (whole subtree, aliases never
    /// dereferenced) whose `uid` equals `uid`
    fn search_uid(
        &mut self,
        base_dn: &str,
        uid: &str,
    ) -> impl Future<Output = AuthResult<Vec<String>>> + Send;

    /// Release the connection
    fn unbind(&mut self) -> impl Future<Output = AuthResult<()>> + Send;
}
