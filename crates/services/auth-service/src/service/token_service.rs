//! Signed bearer tokens (HS256 JWT).
//!
//! Access tokens carry identity and role claims and live for one hour.
//! Verification tokens are the same shape plus a `purpose`
//! claim and a 24 hour lifetime; they are rejected wherever an access token
//! is expected and vice versa.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use common::{AppError, AppResult, JwtConfig};
use domain::{
    Account, ACCESS_TOKEN_EXPIRATION_HOURS, MIN_JWT_KEY_LENGTH, PURPOSE_EMAIL_VERIFICATION,
    SECONDS_PER_HOUR, TOKEN_TYPE_BEARER, VERIFICATION_TOKEN_EXPIRATION_HOURS,
};

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub account_id: String,
    pub email: String,
    /// One entry per account role
    #[serde(default, deserialize_with = "one_or_many")]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.iter().any(|r| r == role)
    }
}

/// Accept a single role string as well as an array; some issuers collapse a
/// one-element role list to a bare string.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

/// Only the subject, for unverified parsing.
#[derive(Deserialize)]
struct Subject {
    sub: Option<String>,
}

/// Decode one base64url JSON segment of a compact JWT.
fn decode_segment<T: DeserializeOwned>(segment: &str) -> AppResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| {
            tracing::debug!(error = %e, "Token segment is not base64url");
            AppError::MalformedToken
        })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(error = %e, "Token segment is not a JSON object");
        AppError::MalformedToken
    })
}

/// A freshly issued access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// Compact JWS serialization
    pub token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates signed tokens with one HMAC key.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl TokenService {
    /// Build signing and decoding keys from configuration.
    ///
    /// Fails if the key, issuer or audience is empty, or the key is shorter
    /// than 32 bytes.
    pub fn new(config: &JwtConfig) -> AppResult<Self> {
        if config.key.is_empty() || config.issuer.is_empty() || config.audience.is_empty() {
            return Err(AppError::Config(
                "JWT key, issuer and audience must all be set".to_string(),
            ));
        }
        if config.key_bytes().len() < MIN_JWT_KEY_LENGTH {
            return Err(AppError::Config(format!(
                "JWT key must be at least {} bytes long",
                MIN_JWT_KEY_LENGTH
            )));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.key_bytes()),
            decoding_key: DecodingKey::from_secret(config.key_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    fn claims_for(&self, account: &Account, hours: i64, purpose: Option<&str>) -> Claims {
        let now = Utc::now();
        let expires_at = now + Duration::hours(hours);

        Claims {
            sub: account.id.clone(),
            account_id: account.id.clone(),
            email: account.email.clone(),
            role: account.roles.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            purpose: purpose.map(str::to_string),
        }
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?;
        Ok(token)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation
    }

    /// Issue an access token for an account.
    pub fn issue(&self, account: &Account) -> AppResult<IssuedToken> {
        let claims = self.claims_for(account, ACCESS_TOKEN_EXPIRATION_HOURS, None);
        let token = self.sign(&claims)?;

        Ok(IssuedToken {
            token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: ACCESS_TOKEN_EXPIRATION_HOURS * SECONDS_PER_HOUR,
        })
    }

    /// Read the `sub` claim WITHOUT checking signature, algorithm, expiry,
    /// issuer or audience.
    ///
    /// Any compact JWT whose header and payload decode as JSON objects is
    /// accepted, including `alg: none`. A token without a subject yields
    /// `Ok(None)`; only undecodable input is `MalformedToken`.
    pub fn parse_subject(&self, token: &str) -> AppResult<Option<String>> {
        let segments: Vec<&str> = token.split('.').collect();
        let &[header, payload, _signature] = segments.as_slice() else {
            tracing::debug!(segments = segments.len(), "Token is not a compact JWT");
            return Err(AppError::MalformedToken);
        };

        decode_segment::<serde_json::Map<String, serde_json::Value>>(header)?;
        let subject: Subject = decode_segment(payload)?;
        Ok(subject.sub)
    }

    /// Fully validate an access token.
    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AppError::Unauthorized
            })?
            .claims;

        if claims.purpose.is_some() {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    /// Issue a single-purpose email verification token.
    pub fn issue_verification(&self, account: &Account) -> AppResult<String> {
        let claims = self.claims_for(
            account,
            VERIFICATION_TOKEN_EXPIRATION_HOURS,
            Some(PURPOSE_EMAIL_VERIFICATION),
        );
        self.sign(&claims)
    }

    /// Fully validate an email verification token.
    pub fn validate_verification(&self, token: &str) -> AppResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                tracing::debug!(error = %e, "Verification token rejected");
                AppError::MalformedToken
            })?
            .claims;

        match claims.purpose.as_deref() {
            Some(PURPOSE_EMAIL_VERIFICATION) => Ok(claims),
            _ => Err(AppError::MalformedToken),
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::ROLE_USER;
    use serde_json::json;

    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn config() -> JwtConfig {
        JwtConfig {
            key: KEY.to_string(),
            issuer: "library-auth".to_string(),
            audience: "library-clients".to_string(),
        }
    }

    fn account() -> Account {
        Account::register(
            "a@x.com".to_string(),
            "Ann".to_string(),
            "digest".to_string(),
            true,
        )
        .into_account("acc-1".to_string(), Utc::now())
    }

    fn sign_raw(payload: serde_json::Value, key: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    fn unsigned(header: serde_json::Value, payload: serde_json::Value) -> String {
        format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    #[test]
    fn test_new_rejects_weak_or_missing_settings() {
        let mut short = config();
        short.key = "short".to_string();
        assert!(matches!(TokenService::new(&short), Err(AppError::Config(_))));

        let mut no_issuer = config();
        no_issuer.issuer = String::new();
        assert!(matches!(TokenService::new(&no_issuer), Err(AppError::Config(_))));
    }

    #[test]
    fn test_issue_claims() {
        let tokens = TokenService::new(&config()).unwrap();
        let issued = tokens.issue(&account()).unwrap();

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 3600);

        let claims = tokens.validate(&issued.token).unwrap();
        assert_eq!(claims.sub, "acc-1");
        assert_eq!(claims.account_id, "acc-1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, vec![ROLE_USER.to_string()]);
        assert_eq!(claims.iss, "library-auth");
        assert_eq!(claims.aud, "library-clients");
        assert_eq!(claims.exp, claims.iat + 3600);
        assert!(claims.purpose.is_none());
        assert!(claims.has_role(ROLE_USER));
    }

    #[test]
    fn test_parse_subject_of_issued_token() {
        let tokens = TokenService::new(&config()).unwrap();
        let issued = tokens.issue(&account()).unwrap();

        assert_eq!(tokens.parse_subject(&issued.token).unwrap().as_deref(), Some("acc-1"));
    }

    #[test]
    fn test_parse_subject_ignores_signature_and_expiry() {
        let tokens = TokenService::new(&config()).unwrap();
        let foreign = sign_raw(
            json!({ "sub": "acc-9", "exp": 1 }),
            "another-key-another-key-another-key",
        );

        assert_eq!(tokens.parse_subject(&foreign).unwrap().as_deref(), Some("acc-9"));
    }

    #[test]
    fn test_parse_subject_accepts_any_algorithm() {
        let tokens = TokenService::new(&config()).unwrap();

        for alg in ["none", "ES512", "made-up"] {
            let token = unsigned(json!({ "alg": alg, "typ": "JWT" }), json!({ "sub": "acc-1" }));
            assert_eq!(
                tokens.parse_subject(&token).unwrap().as_deref(),
                Some("acc-1"),
                "alg={}",
                alg
            );
        }
    }

    #[test]
    fn test_parse_subject_without_sub_claim() {
        let tokens = TokenService::new(&config()).unwrap();

        let signed = sign_raw(json!({ "email": "a@x.com" }), KEY);
        assert_eq!(tokens.parse_subject(&signed).unwrap(), None);

        let bare = unsigned(json!({ "alg": "none" }), json!({ "email": "a@x.com" }));
        assert_eq!(tokens.parse_subject(&bare).unwrap(), None);
    }

    #[test]
    fn test_parse_subject_malformed() {
        let tokens = TokenService::new(&config()).unwrap();

        for garbage in ["", "not-a-jwt", "a.b.c", "x.y", "a.b.c.d"] {
            assert!(matches!(
                tokens.parse_subject(garbage),
                Err(AppError::MalformedToken)
            ));
        }

        let not_json = format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
            URL_SAFE_NO_PAD.encode("plain text")
        );
        assert!(matches!(
            tokens.parse_subject(&not_json),
            Err(AppError::MalformedToken)
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_key_audience_and_expiry() {
        let tokens = TokenService::new(&config()).unwrap();

        let mut other = config();
        other.key = "ffffffffffffffffffffffffffffffff".to_string();
        let forged = TokenService::new(&other).unwrap().issue(&account()).unwrap();
        assert!(matches!(tokens.validate(&forged.token), Err(AppError::Unauthorized)));

        let mut elsewhere = config();
        elsewhere.audience = "someone-else".to_string();
        let misdirected = TokenService::new(&elsewhere).unwrap().issue(&account()).unwrap();
        assert!(matches!(
            tokens.validate(&misdirected.token),
            Err(AppError::Unauthorized)
        ));

        let expired = sign_raw(
            json!({
                "sub": "acc-1", "account_id": "acc-1", "email": "a@x.com",
                "role": ["user"], "iss": "library-auth", "aud": "library-clients",
                "iat": 1_000, "exp": 4_600
            }),
            KEY,
        );
        assert!(matches!(tokens.validate(&expired), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_single_role_string_is_accepted() {
        let tokens = TokenService::new(&config()).unwrap();
        let now = Utc::now().timestamp();
        let token = sign_raw(
            json!({
                "sub": "acc-1", "account_id": "acc-1", "email": "a@x.com",
                "role": "user", "iss": "library-auth", "aud": "library-clients",
                "iat": now, "exp": now + 3600
            }),
            KEY,
        );

        assert_eq!(tokens.validate(&token).unwrap().role, vec!["user".to_string()]);
    }

    #[test]
    fn test_verification_tokens_are_single_purpose() {
        let tokens = TokenService::new(&config()).unwrap();
        let account = account();

        let verification = tokens.issue_verification(&account).unwrap();
        let claims = tokens.validate_verification(&verification).unwrap();
        assert_eq!(claims.sub, "acc-1");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(tokens.parse_subject(&verification).unwrap().as_deref(), Some("acc-1"));

        assert!(matches!(tokens.validate(&verification), Err(AppError::Unauthorized)));

        let access = tokens.issue(&account).unwrap();
        assert!(matches!(
            tokens.validate_verification(&access.token),
            Err(AppError::MalformedToken)
        ));
        assert!(matches!(
            tokens.validate_verification("garbage"),
            Err(AppError::MalformedToken)
        ));
    }
}
