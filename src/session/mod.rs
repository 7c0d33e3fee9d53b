//! Current-user lookup.

use async_trait::async_trait;

/// Resolves the user behind a request.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The user for an optional bearer token, or `None` when unauthenticated.
    async fn current_user(&self, bearer: Option<&str>) -> Option<String>;
}

/// Single-user provider that ignores the token and always reports the
/// configured user.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    user_id: String,
}

impl StaticIdentityProvider {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user(&self, _bearer: Option<&str>) -> Option<String> {
        Some(self.user_id.clone())
    }
}
