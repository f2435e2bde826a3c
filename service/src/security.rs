//! Session token security definitions.

use std::time::Duration;

use common::DateTime;
use derive_more::{Debug, Display, Error};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore as _;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user::{self, session, Session};

/// Signing [`Algorithm`] of [`Session`] tokens.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Length of the generated signing key material, in bytes.
const KEY_LEN: usize = 64;

/// Key material signing and verifying [`Session`] tokens.
///
/// Generated once at process startup and held for the process lifetime: every
/// token signed by it verifies against it, and a restart (regenerating the
/// key) invalidates all previously issued tokens.
#[derive(Clone, Debug)]
pub struct SigningConfigurations {
    /// Key signing issued tokens.
    #[debug(skip)]
    encoding_key: EncodingKey,

    /// Key verifying presented tokens.
    #[debug(skip)]
    decoding_key: DecodingKey,
}

impl SigningConfigurations {
    /// Generates new [`SigningConfigurations`] from fresh random key material.
    ///
    /// The key material is drawn from the OS entropy source, never persisted
    /// anywhere, and not recoverable from this value.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0; KEY_LEN];
        rand::rng().fill_bytes(&mut secret);
        Self::from_secret(&secret)
    }

    /// Creates new [`SigningConfigurations`] from the provided secret.
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

/// Issuance and validation policy of [`Session`] tokens.
///
/// Loaded once at process startup and immutable afterwards.
#[derive(Clone, Debug)]
pub struct TokenConfigurations {
    /// Intended consumer of issued tokens.
    audience: String,

    /// Authority issuing the tokens.
    issuer: String,

    /// Token lifetime, in seconds.
    seconds: u64,
}

impl TokenConfigurations {
    /// Creates new [`TokenConfigurations`] with the provided policy.
    ///
    /// # Errors
    ///
    /// If `audience` or `issuer` is empty, or `seconds` is zero. A blank
    /// issuer or audience would silently weaken validation, so such policies
    /// are rejected outright.
    pub fn new(
        audience: impl Into<String>,
        issuer: impl Into<String>,
        seconds: u64,
    ) -> Result<Self, InvalidTokenConfigurations> {
        use InvalidTokenConfigurations as E;

        let (audience, issuer) = (audience.into(), issuer.into());
        if audience.is_empty() {
            return Err(E::EmptyAudience);
        }
        if issuer.is_empty() {
            return Err(E::EmptyIssuer);
        }
        if seconds == 0 {
            return Err(E::ZeroSeconds);
        }

        Ok(Self {
            audience,
            issuer,
            seconds,
        })
    }

    /// Returns the audience of issued tokens.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Returns the issuer of issued tokens.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the lifetime of issued tokens.
    #[must_use]
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }
}

/// Error of creating [`TokenConfigurations`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidTokenConfigurations {
    /// `Audience` is empty.
    #[display("`Audience` must not be empty")]
    EmptyAudience,

    /// `Issuer` is empty.
    #[display("`Issuer` must not be empty")]
    EmptyIssuer,

    /// `Seconds` is zero.
    #[display("`Seconds` must be greater than zero")]
    ZeroSeconds,
}

/// Issues a new [`Session`] token for the provided [`User`] ID.
///
/// The produced claim set carries the subject, the configured issuer and
/// audience, `issued_at = now` and `expires_at = now + seconds`.
///
/// # Errors
///
/// If signing the claim set fails. This cannot be caused by the token input
/// and is not retriable.
pub fn issue_session(
    signing: &SigningConfigurations,
    config: &TokenConfigurations,
    user_id: user::Id,
    now: DateTime,
) -> Result<(session::Token, Session), IssuanceError> {
    let session = Session {
        user_id,
        issuer: config.issuer.clone(),
        audience: config.audience.clone(),
        issued_at: now.coerce(),
        expires_at: (now + config.expiration()).coerce(),
    };

    let encoded = jsonwebtoken::encode(
        &Header::new(ALGORITHM),
        &session,
        &signing.encoding_key,
    )
    .map_err(IssuanceError)?;

    // SAFETY: `jsonwebtoken::encode` always returns a valid `session::Token`.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    let token = unsafe { session::Token::new_unchecked(encoded) };

    Ok((token, session))
}

/// Error of issuing a [`Session`] token.
#[derive(Debug, Display, Error)]
#[display("failed to sign a `Session` token: {_0}")]
pub struct IssuanceError(jsonwebtoken::errors::Error);

/// Validates the provided [`Session`] token at the `at` instant.
///
/// Checks are performed in order, short-circuiting on the first failure:
/// signature, issuer, audience, expiry. Expiry is checked with zero
/// clock-skew tolerance: a token is valid strictly while `at < expires_at`.
///
/// # Errors
///
/// See [`ValidationError`].
pub fn validate_session(
    signing: &SigningConfigurations,
    config: &TokenConfigurations,
    token: &session::Token,
    at: DateTime,
) -> Result<Session, ValidationError> {
    use ValidationError as E;

    let mut validation = Validation::new(ALGORITHM);
    // Claims are checked manually below, in a defined order.
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let session = jsonwebtoken::decode::<Session>(
        token.as_ref(),
        &signing.decoding_key,
        &validation,
    )
    .map_err(E::InvalidSignature)?
    .claims;

    if session.issuer != config.issuer {
        return Err(E::InvalidIssuer);
    }
    if session.audience != config.audience {
        return Err(E::InvalidAudience);
    }
    if session.expires_at <= at.coerce() {
        return Err(E::TokenExpired);
    }

    Ok(session)
}

/// Error of validating a [`Session`] token.
#[derive(Debug, Display, Error)]
pub enum ValidationError {
    /// Token signature does not verify against the active
    /// [`SigningConfigurations`] key, or the token is too malformed to carry
    /// a verifiable signature at all.
    #[display("invalid `Session` token signature: {_0}")]
    InvalidSignature(jsonwebtoken::errors::Error),

    /// Token issuer differs from the configured one.
    #[display("invalid `Session` token issuer")]
    InvalidIssuer,

    /// Token audience differs from the configured one.
    #[display("invalid `Session` token audience")]
    InvalidAudience,

    /// Token expiry instant has passed.
    #[display("`Session` token has expired")]
    TokenExpired,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::domain::user;

    use super::{
        issue_session, validate_session, SigningConfigurations,
        TokenConfigurations, ValidationError,
    };

    fn config() -> TokenConfigurations {
        TokenConfigurations::new("ExampleAudience", "ExampleIssuer", 3600)
            .unwrap()
    }

    fn t0() -> DateTime {
        DateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn issued_token_validates_and_yields_principal() {
        let signing = SigningConfigurations::generate();
        let user_id = user::Id::new();

        let (token, issued) =
            issue_session(&signing, &config(), user_id, t0()).unwrap();
        let session =
            validate_session(&signing, &config(), &token, t0()).unwrap();

        assert_eq!(session, issued);
        assert_eq!(session.user_id, user_id);
    }

    #[test]
    fn foreign_key_fails_with_invalid_signature() {
        let signing = SigningConfigurations::generate();
        let foreign = SigningConfigurations::generate();

        let (token, _) =
            issue_session(&foreign, &config(), user::Id::new(), t0()).unwrap();
        let res = validate_session(&signing, &config(), &token, t0());

        assert!(matches!(res, Err(ValidationError::InvalidSignature(_))));
    }

    #[test]
    fn garbage_token_fails_with_invalid_signature() {
        let signing = SigningConfigurations::generate();
        let token = "not.a.token".parse().unwrap();

        let res = validate_session(&signing, &config(), &token, t0());

        assert!(matches!(res, Err(ValidationError::InvalidSignature(_))));
    }

    #[test]
    fn issuer_mismatch_fails_regardless_of_signature() {
        let signing = SigningConfigurations::generate();
        let foreign =
            TokenConfigurations::new("ExampleAudience", "OtherIssuer", 3600)
                .unwrap();

        let (token, _) =
            issue_session(&signing, &foreign, user::Id::new(), t0()).unwrap();
        let res = validate_session(&signing, &config(), &token, t0());

        assert!(matches!(res, Err(ValidationError::InvalidIssuer)));
    }

    #[test]
    fn audience_mismatch_fails_regardless_of_signature() {
        let signing = SigningConfigurations::generate();
        let foreign =
            TokenConfigurations::new("OtherAudience", "ExampleIssuer", 3600)
                .unwrap();

        let (token, _) =
            issue_session(&signing, &foreign, user::Id::new(), t0()).unwrap();
        let res = validate_session(&signing, &config(), &token, t0());

        assert!(matches!(res, Err(ValidationError::InvalidAudience)));
    }

    #[test]
    fn expiry_is_checked_with_zero_skew() {
        let signing = SigningConfigurations::generate();

        let (token, _) =
            issue_session(&signing, &config(), user::Id::new(), t0()).unwrap();

        let ok = t0() + Duration::from_secs(3599);
        assert!(validate_session(&signing, &config(), &token, ok).is_ok());

        for late in [3600, 3601] {
            let at = t0() + Duration::from_secs(late);
            let res = validate_session(&signing, &config(), &token, at);
            assert!(
                matches!(res, Err(ValidationError::TokenExpired)),
                "token still valid {late}s after issuance",
            );
        }
    }

    #[test]
    fn rejects_weak_policies() {
        assert!(TokenConfigurations::new("", "Issuer", 1).is_err());
        assert!(TokenConfigurations::new("Audience", "", 1).is_err());
        assert!(TokenConfigurations::new("Audience", "Issuer", 0).is_err());
    }
}
