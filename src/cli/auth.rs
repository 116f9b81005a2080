use crate::{
    config::{self, Credentials},
    error, info,
    spotify::{RequestContext, auth},
    success,
};

/// Verifies the configured client credentials by requesting a token.
pub async fn auth() {
    let creds = load_credentials().await;
    let token_url = config::spotify_apitoken_url();

    info!("Requesting access token from {}", token_url);
    match auth::request_token(&reqwest::Client::new(), &token_url, &creds).await {
        Ok(token) => success!(
            "Authentication successful! {} token valid for {} seconds.",
            token.token_type,
            token.expires_in
        ),
        Err(e) => error!("{}", e),
    }
}

/// Picks the user from the flag, then `SPOTIFY_USER_ID`; exits if neither is set.
pub(crate) fn resolve_user(user: Option<String>) -> String {
    match user.filter(|u| !u.is_empty()).or_else(config::spotify_user) {
        Some(user) => user,
        None => error!("No Spotify user given. Pass --user or set SPOTIFY_USER_ID."),
    }
}

/// Authenticates once and returns the request context for `user_id`.
///
/// Authentication failure is fatal: the error names the token URL and the
/// description returned by the accounts service, then the process exits.
pub(crate) async fn connect(user_id: &str) -> RequestContext {
    let creds = load_credentials().await;

    match auth::connect(
        &config::spotify_apiurl(),
        &config::spotify_apitoken_url(),
        user_id,
        &creds,
    )
    .await
    {
        Ok(ctx) => ctx,
        Err(e) => error!("{}", e),
    }
}

async fn load_credentials() -> Credentials {
    let path = config::credentials_path();
    match Credentials::resolve(&path).await {
        Ok(creds) => creds,
        Err(e) => error!("Failed to load credentials. Err: {}", e),
    }
}
