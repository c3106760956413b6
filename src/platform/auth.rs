//! Token exchange.
//!
//! One fixed OAuth-style grant: the user's API key goes to the IAM endpoint
//! as a form post under a constant basic-auth header, and the returned access
//! token becomes the bearer header every other call carries. There is no
//! refresh; when the server-side TTL runs out the user authenticates again.

use serde::Deserialize;

use crate::error::{PlatformError, PlatformResult};
use crate::logging::{self, Domain, Level};
use crate::platform::PlatformClient;

const GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Bearer credential for platform calls. The token text stays private and
/// out of Debug output; `bearer()` hands the header value to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    bearer: String,
}

impl AuthToken {
    pub fn new(access_token: &str) -> Self {
        Self { bearer: format!("Bearer {}", access_token) }
    }

    pub fn bearer(&self) -> &str {
        &self.bearer
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

#[derive(Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

impl PlatformClient {
    /// Exchange an API key for a bearer token. A rejected key comes back as
    /// an authentication failure carrying the IAM response body verbatim.
    pub async fn authenticate(&self, apikey: &str) -> PlatformResult<AuthToken> {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let url = format!("{}/identity/token", self.config().iam_base);
        let basic = format!("Basic {}", STANDARD.encode(b"bx:bx"));
        let req = self
            .http()
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, basic)
            .form(&[("apikey", apikey), ("grant_type", GRANT_TYPE)]);

        let body = self
            .send_for_text(Domain::Auth, "POST", "/identity/token", req)
            .await
            .map_err(PlatformError::auth)?;

        let token: IamTokenResponse =
            serde_json::from_str(&body).map_err(|e| PlatformError::auth(e.to_string()))?;

        logging::log(
            Level::Info,
            Domain::Auth,
            "authenticated",
            logging::obj(&[("msg", logging::v_str("token exchange ok"))]),
        );
        Ok(AuthToken::new(&token.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_carries_the_token() {
        let token = AuthToken::new("abc123");
        assert_eq!(token.bearer(), "Bearer abc123");
    }

    #[test]
    fn debug_never_prints_the_token() {
        let token = AuthToken::new("super-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
