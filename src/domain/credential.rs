//! Gateway authentication credentials
//!
//! A credential is a capability that decorates an outbound request with the
//! `Authorization` header of its scheme. Empty tokens, usernames and passwords
//! are accepted as-is; the gateway decides whether they are valid.

use crate::domain::errors::CredentialError;
use reqwest::RequestBuilder;
use std::fmt;
use std::str::FromStr;

/// Authentication scheme understood by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    Basic,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "bearer",
            AuthScheme::Basic => "basic",
        }
    }
}

impl FromStr for AuthScheme {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bearer" => Ok(AuthScheme::Bearer),
            "basic" => Ok(AuthScheme::Basic),
            _ => Err(CredentialError::UnknownScheme(s.to_string())),
        }
    }
}

/// Raw secret material, as read from config or CLI flags
#[derive(Clone, Default)]
pub struct CredentialData {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialData {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }
}

/// Credential attached to every push
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    Basic { username: String, password: String },
}

impl Credential {
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Credential::Bearer(_) => AuthScheme::Bearer,
            Credential::Basic { .. } => AuthScheme::Basic,
        }
    }

    /// Add the `Authorization` header of this credential to an outbound request
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }
}

// Secrets never reach the logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Build the credential for `kind` out of the available secret material.
///
/// Bearer requires a token. Basic requires a username; a missing password is
/// sent as an empty one.
pub fn build_credential(
    kind: AuthScheme,
    data: CredentialData,
) -> Result<Credential, CredentialError> {
    match kind {
        AuthScheme::Bearer => data
            .token
            .map(Credential::Bearer)
            .ok_or(CredentialError::Missing {
                scheme: "bearer",
                field: "token",
            }),
        AuthScheme::Basic => {
            let username = data.username.ok_or(CredentialError::Missing {
                scheme: "basic",
                field: "username",
            })?;
            Ok(Credential::Basic {
                username,
                password: data.password.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    fn authorization_of(credential: &Credential) -> String {
        let client = reqwest::Client::new();
        let request = credential
            .apply_to_request(client.put("http://127.0.0.1:9091/metrics/job/test"))
            .build()
            .expect("Failed to build request");
        request
            .headers()
            .get(AUTHORIZATION)
            .expect("Authorization header missing")
            .to_str()
            .expect("Header is not ASCII")
            .to_string()
    }

    #[test]
    fn test_bearer_header() {
        let credential = build_credential(AuthScheme::Bearer, CredentialData::token("token"))
            .expect("Failed to build credential");
        assert_eq!(authorization_of(&credential), "Bearer token");
    }

    #[test]
    fn test_bearer_header_keeps_token_verbatim() {
        for token in ["abc.def.ghi", "with space", "x"] {
            let credential = Credential::Bearer(token.to_string());
            assert_eq!(authorization_of(&credential), format!("Bearer {}", token));
        }
    }

    #[test]
    fn test_basic_header_matches_standard_encoding() {
        let credential = build_credential(AuthScheme::Basic, CredentialData::basic("user", "pass"))
            .expect("Failed to build credential");
        // base64("user:pass")
        assert_eq!(authorization_of(&credential), "Basic dXNlcjpwYXNz");

        let credential = Credential::Basic {
            username: "Aladdin".to_string(),
            password: "open sesame".to_string(),
        };
        assert_eq!(
            authorization_of(&credential),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_empty_credentials_are_accepted() {
        let bearer = build_credential(AuthScheme::Bearer, CredentialData::token(""))
            .expect("Empty token should be accepted");
        assert_eq!(authorization_of(&bearer), "Bearer ");

        let basic = build_credential(
            AuthScheme::Basic,
            CredentialData {
                username: Some(String::new()),
                ..Default::default()
            },
        )
        .expect("Empty username should be accepted");
        // base64(":")
        assert_eq!(authorization_of(&basic), "Basic Og==");
    }

    #[test]
    fn test_missing_material_is_rejected() {
        assert_eq!(
            build_credential(AuthScheme::Bearer, CredentialData::default()),
            Err(CredentialError::Missing {
                scheme: "bearer",
                field: "token"
            })
        );
        assert!(build_credential(AuthScheme::Basic, CredentialData::token("t")).is_err());
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("Bearer".parse::<AuthScheme>(), Ok(AuthScheme::Bearer));
        assert_eq!(" basic ".parse::<AuthScheme>(), Ok(AuthScheme::Basic));
        assert!("digest".parse::<AuthScheme>().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = Credential::Basic {
            username: "ops".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("ops"));
        assert!(!rendered.contains("hunter2"));
        assert!(!format!("{:?}", Credential::Bearer("s3cret".into())).contains("s3cret"));
    }
}
