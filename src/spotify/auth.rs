use reqwest::Client;

use crate::{
    Res,
    config::Credentials,
    error::Error,
    spotify::RequestContext,
    types::{ApiErrorBody, Token},
};

/// Exchanges client credentials for a bearer token.
///
/// Posts `grant_type=client_credentials` together with the client ID and
/// secret to the token endpoint. The token is requested once per run and never
/// refreshed.
///
/// # Errors
///
/// Any failure (transport error, non-success status, a body without an
/// access token) is an [`Error::Auth`] naming the token URL and the error and
/// description the accounts service returned. Callers treat it as fatal.
///
/// # Example
///
/// ```
/// let creds = Credentials::resolve(&config::credentials_path()).await?;
/// let token = request_token(&Client::new(), &config::spotify_apitoken_url(), &creds).await?;
/// ```
pub async fn request_token(client: &Client, token_url: &str, creds: &Credentials) -> Res<Token> {
    let auth_error = |error: &str, description: String| Error::Auth {
        url: token_url.to_string(),
        error: error.to_string(),
        description,
    };

    let res = client
        .post(token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
        ])
        .send()
        .await
        .map_err(|e| auth_error("request_failed", e.to_string()))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| auth_error("invalid_response", e.to_string()))?;

    if !status.is_success() {
        return Err(match ApiErrorBody::parse(&body) {
            Some(parsed) => auth_error(&parsed.error, parsed.description),
            None => auth_error(
                status.canonical_reason().unwrap_or("http_error"),
                body.trim().to_string(),
            ),
        });
    }

    let token: Token = serde_json::from_str(&body)
        .map_err(|e| auth_error("invalid_token_response", e.to_string()))?;
    if token.access_token.is_empty() {
        return Err(auth_error(
            "invalid_token_response",
            "The token response carried an empty access token".to_string(),
        ));
    }

    Ok(token)
}

/// Authenticates and returns the context every later request runs with.
pub async fn connect(
    api_url: &str,
    token_url: &str,
    user_id: &str,
    creds: &Credentials,
) -> Res<RequestContext> {
    let client = Client::new();
    let token = request_token(&client, token_url, creds).await?;
    Ok(RequestContext::new(client, api_url, user_id, token))
}
