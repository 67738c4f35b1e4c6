//! Login exchange with the access manager.

use reqwest::header::AUTHORIZATION;
use serde::Serialize;

use super::constants::LOGIN_CLAIMS;
use crate::core::provider::SessionToken;
use crate::core::{Credentials, ExtractError};

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
    claims: &'a [&'a str],
}

impl super::IcmClient {
    #[tracing::instrument(skip(self, credentials), err, fields(username = %credentials.username()))]
    pub(crate) async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionToken, ExtractError> {
        let body = LoginBody {
            username: credentials.username(),
            password: credentials.password(),
            claims: &LOGIN_CLAIMS,
        };

        let resp = self
            .http
            .post(self.login_url.clone())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ExtractError::Status {
                status: resp.status().as_u16(),
                url: self.login_url.to_string(),
            });
        }

        let token = resp
            .headers()
            .get(AUTHORIZATION)
            .ok_or_else(|| ExtractError::Auth("No authorization header in login response".into()))?
            .to_str()
            .map_err(|_| ExtractError::Auth("Invalid authorization header format".into()))?
            .to_string();

        if token.is_empty() {
            return Err(ExtractError::Auth("Received empty authorization token".into()));
        }

        Ok(SessionToken::new(token))
    }
}
