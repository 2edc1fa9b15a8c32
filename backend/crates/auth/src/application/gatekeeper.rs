//! Request Gatekeeper
//!
//! Checks the (API name, client IP, access key) triple against the policy
//! store before any endpoint logic runs. Every consulted request is audited.

use std::sync::Arc;

use platform::client::is_valid_access_key;

use crate::domain::repository::ApiPolicyRepository;
use crate::domain::value_object::api_access::{ApiAccessRequest, PolicyVerdict};
use crate::error::{AuthError, AuthResult};

/// Gatekeeper
pub struct Gatekeeper<P>
where
    P: ApiPolicyRepository,
{
    policy_repo: Arc<P>,
}

impl<P> Gatekeeper<P>
where
    P: ApiPolicyRepository,
{
    pub fn new(policy_repo: Arc<P>) -> Self {
        Self { policy_repo }
    }

    /// Keys that are not plain alphanumerics never reach the policy store.
    pub async fn admit(&self, request: &ApiAccessRequest) -> AuthResult<PolicyVerdict> {
        if !is_valid_access_key(&request.access_key) {
            tracing::warn!(
                api_name = %request.api_name,
                client_ip = %request.client_ip,
                "Malformed API access key"
            );
            return Err(AuthError::InvalidAccessToken);
        }

        let status = self.policy_repo.check(request).await?;
        self.policy_repo.record(request, &status).await?;

        let verdict = PolicyVerdict::from_status(&status);
        match &verdict {
            PolicyVerdict::Allowed => tracing::info!(
                api_name = %request.api_name,
                client_ip = %request.client_ip,
                "API request admitted"
            ),
            PolicyVerdict::Rejected(reason) => tracing::warn!(
                api_name = %request.api_name,
                client_ip = %request.client_ip,
                reason = %reason,
                "API request rejected by policy"
            ),
        }

        Ok(verdict)
    }
}
