use camino::Utf8Path;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::ServiceAccountAuthenticator;

use crate::error::RemoteError;

/// Read-only access is all the mirror needs.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Bearer token for the next request. Implementations cache and refresh.
    async fn access_token(&self) -> Result<String, RemoteError>;
}

/// Tokens minted from a Google service-account key file.
pub struct ServiceAccountTokens {
    auth: DefaultAuthenticator,
}

impl ServiceAccountTokens {
    pub async fn from_key_file(path: &Utf8Path) -> Result<Self, RemoteError> {
        if !path.exists() {
            return Err(RemoteError::Auth(format!(
                "credentials file not found: {path}"
            )));
        }
        let key = yup_oauth2::read_service_account_key(path.as_std_path())
            .await
            .map_err(|e| RemoteError::Auth(format!("read service account key {path}: {e}")))?;
        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| RemoteError::Auth(format!("build authenticator: {e}")))?;
        Ok(Self { auth })
    }
}

#[async_trait::async_trait]
impl TokenProvider for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, RemoteError> {
        let token = self
            .auth
            .token(&[DRIVE_READONLY_SCOPE])
            .await
            .map_err(|e| RemoteError::Auth(e.to_string()))?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| RemoteError::Auth("token response carried no access token".into()))
    }
}

/// Fixed bearer token, for tests and pre-minted credentials.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, RemoteError> {
        Ok(self.0.clone())
    }
}
