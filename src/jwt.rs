//! JWT token generation and validation.
//!
//! Access and refresh tokens share one claim schema and one parser; the
//! `type` claim tells them apart. Signatures are checked before any claim is
//! exposed, and expiry is reported separately from forgery.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, header};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::UserRole;

/// Scheme prefix for the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Access token duration: 1 hour
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 60 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Minimum secret length accepted for HS256 signing.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime; expiry timestamps must fit the registry's `i64` column.
pub const MAX_TTL_SECS: u64 = i64::MAX as u64;

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived bearer token sent on every request
    Access,
    /// Long-lived token delivered in a cookie and recorded in the refresh registry
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims carried by both token types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Token type
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Subject email
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Display name
    pub nickname: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Claims readable through [`TokenProvider::get_claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimName {
    Type,
    Email,
    Role,
    Nickname,
}

impl Claims {
    /// String value of a single claim.
    pub fn get(&self, name: ClaimName) -> String {
        match name {
            ClaimName::Type => self.token_type.as_str().to_string(),
            ClaimName::Email => self.email.clone(),
            ClaimName::Role => self.role.as_str().to_string(),
            ClaimName::Nickname => self.nickname.clone(),
        }
    }

    /// Expired when the current time has reached `exp`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp <= now
    }
}

/// Lifetimes applied when minting tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenConfig {
    /// Access token lifetime in seconds
    pub access_ttl: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: ACCESS_TOKEN_DURATION_SECS,
            refresh_ttl: REFRESH_TOKEN_DURATION_SECS,
        }
    }
}

/// Result of generating an access token.
#[derive(Debug, Clone)]
pub struct AccessTokenResult {
    /// `Bearer `-prefixed token, ready for the `Authorization` header
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

/// Result of generating a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshTokenResult {
    /// The raw JWT string (also the refresh registry key)
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

/// Key-value store that remembers which refresh tokens were issued and to whom.
///
/// Entries expire on their own after the TTL passed to [`RefreshRegistry::store`].
pub trait RefreshRegistry {
    /// `SET token = email` with the given time-to-live.
    fn store(
        &self,
        token: &str,
        email: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send;

    /// Owning email of a live entry, `None` when absent or expired.
    fn lookup(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<String>, RegistryError>> + Send;

    /// Delete an entry. Returns whether one existed.
    fn remove(&self, token: &str) -> impl Future<Output = Result<bool, RegistryError>> + Send;
}

/// Failure reported by a refresh registry backend.
#[derive(Debug, thiserror::Error)]
#[error("refresh registry error: {0}")]
pub struct RegistryError(pub String);

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Not a well-formed token
    #[error("malformed token")]
    Malformed,
    /// Signature does not match the claims (forged or corrupted)
    #[error("invalid token signature")]
    InvalidSignature,
    /// Valid signature, but `exp` has passed
    #[error("token expired")]
    Expired,
    /// Valid token of the wrong type for this use
    #[error("wrong token type: expected {expected}, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },
    /// Signing secret shorter than [`MIN_SECRET_LENGTH`]
    #[error("signing secret must be at least {} bytes", MIN_SECRET_LENGTH)]
    WeakSecret,
    /// A token lifetime of zero seconds, or one past `i64::MAX` seconds
    #[error("token lifetimes must be between 1 and {} seconds", MAX_TTL_SECS)]
    InvalidTtl,
    /// Error encoding the token
    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    /// System time error
    #[error("system time error")]
    Time,
    /// The refresh registry write failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}


/// Signs and verifies tokens with a single HS256 secret.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: TokenConfig,
}

impl TokenProvider {
    /// Create a provider with the default token lifetimes.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        Self::with_config(secret, TokenConfig::default())
    }

    /// Create a provider with explicit token lifetimes.
    pub fn with_config(secret: &[u8], config: TokenConfig) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret);
        }
        let ttl_range = 1..=MAX_TTL_SECS;
        if !ttl_range.contains(&config.access_ttl) || !ttl_range.contains(&config.refresh_ttl) {
            return Err(TokenError::InvalidTtl);
        }

        // Expiry is checked by hand so the boundary second counts as expired.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            config,
        })
    }

    pub fn access_ttl(&self) -> u64 {
        self.config.access_ttl
    }

    pub fn refresh_ttl(&self) -> u64 {
        self.config.refresh_ttl
    }

    /// Generate an access token. Pure computation, nothing is stored.
    pub fn create_access_token(
        &self,
        email: &str,
        role: UserRole,
        display_name: &str,
    ) -> Result<AccessTokenResult, TokenError> {
        let claims = self.build_claims(TokenType::Access, email, role, display_name)?;
        let token = self.encode(&claims)?;

        Ok(AccessTokenResult {
            token: format!("{}{}", BEARER_PREFIX, token),
            issued_at: claims.iat,
            expires_at: claims.exp,
            duration: self.config.access_ttl,
        })
    }

    /// Generate a refresh token and record it in the registry with the refresh TTL.
    pub async fn create_refresh_token<R>(
        &self,
        registry: &R,
        email: &str,
        role: UserRole,
        display_name: &str,
    ) -> Result<RefreshTokenResult, TokenError>
    where
        R: RefreshRegistry + Sync,
    {
        let claims = self.build_claims(TokenType::Refresh, email, role, display_name)?;
        let token = self.encode(&claims)?;

        registry
            .store(&token, email, Duration::from_secs(self.config.refresh_ttl))
            .await?;

        tracing::debug!(email = %email, expires_at = claims.exp, "Refresh token issued");

        Ok(RefreshTokenResult {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
            duration: self.config.refresh_ttl,
        })
    }

    /// Verify the signature and decode the claims. Expired tokens still parse.
    pub fn parse_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let raw = token.strip_prefix(BEARER_PREFIX).unwrap_or(token);
        if raw.is_empty() {
            return Err(TokenError::Malformed);
        }

        jsonwebtoken::decode::<Claims>(raw, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| self.classify_decode_error(raw, e))
    }

    /// A decode failure is a forgery unless the token carries our own signature.
    ///
    /// `decode` parses the header and base64 of the signature before it checks
    /// the MAC, so a corrupted header or signature segment would otherwise
    /// surface as a parse error.
    fn classify_decode_error(&self, raw: &str, e: jsonwebtoken::errors::Error) -> TokenError {
        if matches!(
            e.kind(),
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm
        ) {
            return TokenError::InvalidSignature;
        }

        let Some((message, signature)) = raw.rsplit_once('.') else {
            return TokenError::Malformed;
        };
        let well_shaped = message
            .split_once('.')
            .is_some_and(|(h, p)| !h.is_empty() && !p.is_empty() && !p.contains('.'))
            && !signature.is_empty();
        if !well_shaped {
            return TokenError::Malformed;
        }

        match jsonwebtoken::crypto::sign(message.as_bytes(), &self.encoding_key, Algorithm::HS256)
        {
            Ok(expected) if expected == signature => TokenError::Malformed,
            Ok(_) => TokenError::InvalidSignature,
            Err(e) => {
                tracing::error!("Failed to recompute token signature: {}", e);
                TokenError::Malformed
            }
        }
    }

    /// Read one verified claim.
    pub fn get_claim(&self, token: &str, name: ClaimName) -> Result<String, TokenError> {
        Ok(self.parse_claims(token)?.get(name))
    }

    /// Whether a signature-valid token has expired. Forged or malformed tokens are errors.
    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        let claims = self.parse_claims(token)?;
        Ok(claims.is_expired_at(now_secs()?))
    }

    /// Parse, check expiry, and require an access token.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_typed(token, TokenType::Access)
    }

    /// Parse, check expiry, and require a refresh token.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_typed(token, TokenType::Refresh)
    }

    fn verify_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.parse_claims(token)?;
        if claims.is_expired_at(now_secs()?) {
            return Err(TokenError::Expired);
        }
        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected: expected.as_str(),
                actual: claims.token_type.as_str(),
            });
        }
        Ok(claims)
    }

    fn build_claims(
        &self,
        token_type: TokenType,
        email: &str,
        role: UserRole,
        display_name: &str,
    ) -> Result<Claims, TokenError> {
        let now = now_secs()?;
        let ttl = match token_type {
            TokenType::Access => self.config.access_ttl,
            TokenType::Refresh => self.config.refresh_ttl,
        };

        Ok(Claims {
            token_type,
            email: email.to_string(),
            role,
            nickname: display_name.to_string(),
            iat: now,
            exp: now.checked_add(ttl).ok_or(TokenError::InvalidTtl)?,
        })
    }

    pub(crate) fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }
}

/// Read the bearer token from the `Authorization` header.
///
/// Absence is normal (anonymous request), so anything other than
/// `Bearer <token>` yields `None` rather than an error.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?;
    if token.is_empty() { None } else { Some(token) }
}

/// Current Unix time in seconds.
pub(crate) fn now_secs() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::Time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::sync::Mutex;

    const SECRET: &[u8] = b"test-secret-key-for-testing-0123456789";

    #[derive(Default)]
    struct RecordingRegistry {
        entries: Mutex<Vec<(String, String, Duration)>>,
    }

    impl RefreshRegistry for RecordingRegistry {
        async fn store(&self, token: &str, email: &str, ttl: Duration) -> Result<(), RegistryError> {
            self.entries
                .lock()
                .unwrap()
                .push((token.to_string(), email.to_string(), ttl));
            Ok(())
        }

        async fn lookup(&self, token: &str) -> Result<Option<String>, RegistryError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|(t, _, _)| t == token)
                .map(|(_, email, _)| email.clone()))
        }

        async fn remove(&self, token: &str) -> Result<bool, RegistryError> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|(t, _, _)| t != token);
            Ok(entries.len() != before)
        }
    }

    struct FailingRegistry;

    impl RefreshRegistry for FailingRegistry {
        async fn store(&self, _: &str, _: &str, _: Duration) -> Result<(), RegistryError> {
            Err(RegistryError("connection refused".into()))
        }

        async fn lookup(&self, _: &str) -> Result<Option<String>, RegistryError> {
            Err(RegistryError("connection refused".into()))
        }

        async fn remove(&self, _: &str) -> Result<bool, RegistryError> {
            Err(RegistryError("connection refused".into()))
        }
    }

    fn provider() -> TokenProvider {
        TokenProvider::new(SECRET).unwrap()
    }

    fn claims_with_exp(token_type: TokenType, iat: u64, exp: u64) -> Claims {
        Claims {
            token_type,
            email: "alice@example.com".to_string(),
            role: UserRole::User,
            nickname: "Alice".to_string(),
            iat,
            exp,
        }
    }

    /// Replace the character at `idx` of the given segment.
    fn replace_at(token: &str, segment: usize, idx: usize, replacement: char) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[segment].replace_range(idx..idx + 1, &replacement.to_string());
        parts.join(".")
    }

    /// Replace one base64url character in the middle of the given segment.
    fn tamper(token: &str, segment: usize) -> String {
        let part = token.split('.').nth(segment).unwrap();
        let idx = part.len() / 2;
        let replacement = if part.as_bytes()[idx] == b'A' { 'B' } else { 'A' };
        replace_at(token, segment, idx, replacement)
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = provider();
        let result = jwt
            .create_access_token("alice@example.com", UserRole::Admin, "Alice")
            .unwrap();

        assert!(result.token.starts_with(BEARER_PREFIX));
        assert_eq!(result.duration, ACCESS_TOKEN_DURATION_SECS);
        assert_eq!(result.expires_at, result.issued_at + ACCESS_TOKEN_DURATION_SECS);

        let claims = jwt.parse_claims(&result.token).unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.nickname, "Alice");
        assert!(claims.exp > now_secs().unwrap());
    }

    #[test]
    fn test_parse_accepts_raw_and_prefixed() {
        let jwt = provider();
        let result = jwt
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap();
        let raw = result.token.strip_prefix(BEARER_PREFIX).unwrap();

        assert_eq!(
            jwt.parse_claims(raw).unwrap(),
            jwt.parse_claims(&result.token).unwrap()
        );
    }

    #[test]
    fn test_get_claim() {
        let jwt = provider();
        let token = jwt
            .create_access_token("bob@example.com", UserRole::User, "Bobby")
            .unwrap()
            .token;

        assert_eq!(jwt.get_claim(&token, ClaimName::Type).unwrap(), "access");
        assert_eq!(
            jwt.get_claim(&token, ClaimName::Email).unwrap(),
            "bob@example.com"
        );
        assert_eq!(jwt.get_claim(&token, ClaimName::Role).unwrap(), "user");
        assert_eq!(jwt.get_claim(&token, ClaimName::Nickname).unwrap(), "Bobby");
    }

    #[tokio::test]
    async fn test_refresh_token_writes_one_registry_entry() {
        let jwt = provider();
        let registry = RecordingRegistry::default();

        let result = jwt
            .create_refresh_token(&registry, "a@x.com", UserRole::User, "A")
            .await
            .unwrap();

        let entries = registry.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        let (key, value, ttl) = &entries[0];
        assert_eq!(key, &result.token);
        assert_eq!(value, "a@x.com");
        assert_eq!(*ttl, Duration::from_secs(604800));

        let claims = jwt.parse_claims(&result.token).unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp, claims.iat + REFRESH_TOKEN_DURATION_SECS);
    }

    #[tokio::test]
    async fn test_refresh_token_registry_failure() {
        let jwt = provider();
        let result = jwt
            .create_refresh_token(&FailingRegistry, "a@x.com", UserRole::User, "A")
            .await;

        assert!(matches!(result, Err(TokenError::Registry(_))));
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        let jwt = provider();
        let token = jwt
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap()
            .token;
        let raw = token.strip_prefix(BEARER_PREFIX).unwrap();

        assert!(matches!(
            jwt.parse_claims(&tamper(raw, 1)),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_signature_fails_signature() {
        let jwt = provider();
        let token = jwt
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap()
            .token;
        let raw = token.strip_prefix(BEARER_PREFIX).unwrap();

        assert!(matches!(
            jwt.parse_claims(&tamper(raw, 2)),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_any_corrupted_character_fails_signature() {
        let jwt = provider();
        let token = jwt
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap()
            .token;
        let raw = token.strip_prefix(BEARER_PREFIX).unwrap();

        for (segment, part) in raw.split('.').enumerate() {
            for (idx, original) in part.char_indices() {
                let swapped = if original == 'A' { 'B' } else { 'A' };
                for replacement in [swapped, '!'] {
                    let corrupted = replace_at(raw, segment, idx, replacement);
                    let result = jwt.parse_claims(&corrupted);
                    assert!(
                        matches!(result, Err(TokenError::InvalidSignature)),
                        "segment {} position {} -> {:?}: got {:?}",
                        segment,
                        idx,
                        replacement,
                        result
                    );
                }
            }
        }
    }

    #[test]
    fn test_correctly_signed_garbage_is_malformed() {
        let jwt = provider();
        let message = "eyJhbGciOiJIUzI1NiJ9.bm90LWpzb24";
        let signature =
            jsonwebtoken::crypto::sign(message.as_bytes(), &jwt.encoding_key, Algorithm::HS256)
                .unwrap();

        assert!(matches!(
            jwt.parse_claims(&format!("{}.{}", message, signature)),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let jwt1 = TokenProvider::new(b"secret-1-secret-1-secret-1-secret-1").unwrap();
        let jwt2 = TokenProvider::new(b"secret-2-secret-2-secret-2-secret-2").unwrap();

        let token = jwt1
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap()
            .token;

        assert!(matches!(
            jwt2.parse_claims(&token),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(
            jwt2.is_expired(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let jwt = provider();

        assert!(matches!(
            jwt.parse_claims("invalid-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(jwt.parse_claims(""), Err(TokenError::Malformed)));
        assert!(matches!(jwt.parse_claims("a.b"), Err(TokenError::Malformed)));
        assert!(matches!(jwt.parse_claims("a.b.c.d"), Err(TokenError::Malformed)));
        assert!(matches!(jwt.parse_claims("a..c"), Err(TokenError::Malformed)));
        // Three segments without our signature count as forged
        assert!(matches!(
            jwt.is_expired("a.b.c"),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let jwt = provider();
        let now = now_secs().unwrap();

        let token = jwt
            .encode(&claims_with_exp(TokenType::Access, now - 100, now - 50))
            .unwrap();

        assert!(jwt.is_expired(&token).unwrap());
        // Expired tokens still parse so callers can tell expiry from forgery
        assert!(jwt.parse_claims(&token).is_ok());
        assert!(matches!(
            jwt.verify_access_token(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let jwt = provider();
        let now = now_secs().unwrap();

        let token = jwt
            .encode(&claims_with_exp(TokenType::Access, now - 10, now))
            .unwrap();

        assert!(jwt.is_expired(&token).unwrap());
    }

    #[test]
    fn test_unexpired_token() {
        let jwt = provider();
        let now = now_secs().unwrap();

        let token = jwt
            .encode(&claims_with_exp(TokenType::Access, now, now + 60))
            .unwrap();

        assert!(!jwt.is_expired(&token).unwrap());
    }

    #[tokio::test]
    async fn test_wrong_token_type_rejected() {
        let jwt = provider();
        let registry = RecordingRegistry::default();

        let access = jwt
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap();
        let refresh = jwt
            .create_refresh_token(&registry, "alice@example.com", UserRole::User, "Alice")
            .await
            .unwrap();

        assert!(matches!(
            jwt.verify_access_token(&refresh.token),
            Err(TokenError::WrongType { .. })
        ));
        assert!(matches!(
            jwt.verify_refresh_token(&access.token),
            Err(TokenError::WrongType { .. })
        ));
        assert!(jwt.verify_access_token(&access.token).is_ok());
        assert!(jwt.verify_refresh_token(&refresh.token).is_ok());
    }

    #[test]
    fn test_weak_secret_rejected() {
        assert!(matches!(
            TokenProvider::new(b"short"),
            Err(TokenError::WeakSecret)
        ));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = TokenConfig {
            access_ttl: 0,
            refresh_ttl: 10,
        };
        assert!(matches!(
            TokenProvider::with_config(SECRET, config),
            Err(TokenError::InvalidTtl)
        ));
    }

    #[test]
    fn test_ttl_past_i64_rejected() {
        let config = TokenConfig {
            access_ttl: u64::MAX,
            refresh_ttl: 10,
        };
        assert!(matches!(
            TokenProvider::with_config(SECRET, config),
            Err(TokenError::InvalidTtl)
        ));

        let config = TokenConfig {
            access_ttl: 10,
            refresh_ttl: MAX_TTL_SECS + 1,
        };
        assert!(matches!(
            TokenProvider::with_config(SECRET, config),
            Err(TokenError::InvalidTtl)
        ));
    }

    #[test]
    fn test_longest_ttl_does_not_overflow() {
        let config = TokenConfig {
            access_ttl: MAX_TTL_SECS,
            refresh_ttl: MAX_TTL_SECS,
        };
        let jwt = TokenProvider::with_config(SECRET, config).unwrap();
        let result = jwt
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap();

        assert_eq!(result.expires_at, result.issued_at + MAX_TTL_SECS);
        assert!(!jwt.is_expired(&result.token).unwrap());
    }

    #[test]
    fn test_custom_ttl() {
        let config = TokenConfig {
            access_ttl: 120,
            refresh_ttl: 600,
        };
        let jwt = TokenProvider::with_config(SECRET, config).unwrap();
        let result = jwt
            .create_access_token("alice@example.com", UserRole::User, "Alice")
            .unwrap();

        assert_eq!(result.duration, 120);
        assert_eq!(jwt.refresh_ttl(), 600);
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));
    }
}
