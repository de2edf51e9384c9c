use crate::client::{Client, RequestOptions};
use crate::error::{ApiError, ApiResult};
use crate::models::user::*;
use async_trait::async_trait;

/// Credentialed authentication API methods
#[async_trait]
pub trait AuthApi {
    /// Login with email and password
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;

    /// Register a new account
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse>;
}

#[async_trait]
impl AuthApi for Client {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let url = auth_endpoint(self, "login")?;
        self.post(url, request, RequestOptions::new().no_credential())
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        let url = auth_endpoint(self, "register")?;
        self.post(url, request, RequestOptions::new().no_credential())
            .await
    }
}

fn auth_endpoint(client: &Client, path: &str) -> ApiResult<url::Url> {
    let base = client
        .config()
        .auth_url
        .as_ref()
        .ok_or(ApiError::NotConfigured("auth_url"))?;
    Ok(base.join(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;

    #[tokio::test]
    async fn login_without_auth_url_is_not_configured() {
        let client = Client::new(ClientConfig::new("http://localhost:5041/api/uploads").unwrap())
            .unwrap();
        let request = LoginRequest {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
        };

        let err = client.login(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::NotConfigured("auth_url")));
    }
}
