//! Secrets extension client
//!
//! Talks to the local secrets caching extension
//! (`GET /secretsmanager/get?secretId=<id>`). The secret's `SecretString` is a
//! JSON object; its `password` field is the resolved value.

use super::{ResolveError, ResolveResult, SecretResolver};
use crate::config::SecretString;
use crate::http::{parse_endpoint, HttpClient, HttpError, RequestOptions};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Header authenticating calls to the extension
pub const TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";

const NOT_FOUND_CODE: &str = "ResourceNotFoundException";

/// Field of the secret payload holding the password
const PASSWORD_FIELD: &str = "password";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValueResponse {
    #[serde(default)]
    secret_string: Option<String>,
}

/// Resolves secrets through the secrets extension HTTP endpoint
#[derive(Clone)]
pub struct ExtensionSecretResolver {
    http: HttpClient,
    endpoint: Url,
    token: Option<SecretString>,
    timeout: Duration,
}

impl ExtensionSecretResolver {
    pub fn new(
        http: HttpClient,
        endpoint: &str,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> ResolveResult<Self> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint)?,
            token,
            timeout,
        })
    }

    fn secret_url(&self, secret_id: &str) -> ResolveResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ResolveError::Http(HttpError::InvalidUrl {
                    url: self.endpoint.to_string(),
                    message: "endpoint cannot be used as a base URL".to_string(),
                })
            })?
            .pop_if_empty()
            .extend(["secretsmanager", "get"]);
        url.query_pairs_mut().append_pair("secretId", secret_id);
        Ok(url)
    }
}

/// Extract the password from a secret payload
fn password_from_secret_string(secret_id: &str, secret_string: &str) -> ResolveResult<SecretString> {
    let payload: Value =
        serde_json::from_str(secret_string).map_err(|e| ResolveError::InvalidSecretFormat {
            secret_id: secret_id.to_string(),
            message: e.to_string(),
        })?;

    payload
        .get(PASSWORD_FIELD)
        .and_then(Value::as_str)
        .map(SecretString::new)
        .ok_or_else(|| ResolveError::InvalidSecretFormat {
            secret_id: secret_id.to_string(),
            message: format!("missing string field '{}'", PASSWORD_FIELD),
        })
}

fn is_not_found(err: &HttpError) -> bool {
    match err {
        HttpError::Status {
            status, code, message, ..
        } => {
            *status == StatusCode::NOT_FOUND.as_u16()
                || code.as_deref() == Some(NOT_FOUND_CODE)
                || message.contains(NOT_FOUND_CODE)
        }
        _ => false,
    }
}

#[async_trait]
impl SecretResolver for ExtensionSecretResolver {
    async fn resolve(&self, secret_id: &str) -> ResolveResult<Option<SecretString>> {
        let url = self.secret_url(secret_id)?;
        let mut options = RequestOptions::new(self.timeout);
        if let Some(token) = &self.token {
            options = options.with_header(TOKEN_HEADER, token.expose_secret());
        }
        debug!(
            "Resolving secret {} [request_id: {}]",
            secret_id, options.request_id
        );

        let response = match self.http.get(&url, &options).await?.error_for_status() {
            Ok(response) => response,
            Err(err) if is_not_found(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let body: GetSecretValueResponse =
            serde_json::from_str(&response.body).map_err(|e| ResolveError::InvalidSecretFormat {
                secret_id: secret_id.to_string(),
                message: e.to_string(),
            })?;

        match body.secret_string {
            Some(secret_string) => password_from_secret_string(secret_id, &secret_string).map(Some),
            None => Err(ResolveError::InvalidSecretFormat {
                secret_id: secret_id.to_string(),
                message: "response has no SecretString".to_string(),
            }),
        }
    }
}
