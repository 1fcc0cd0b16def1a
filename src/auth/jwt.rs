use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, CLAIMS_VERSION};
use crate::{config::JwtConfig, error::IdentityError, state::AppState};

/// Source of "now" for issuing and expiring tokens.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// HS256 signing and verification keys with the default token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self::new(cfg.secret.as_bytes(), Duration::seconds(cfg.ttl_seconds))
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Signs a token for `user_id` that expires after the configured lifetime.
    pub fn issue(&self, user_id: i64) -> Result<String, IdentityError> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    pub fn issue_with_ttl(&self, user_id: i64, ttl: Duration) -> Result<String, IdentityError> {
        let now = self.clock.now();
        let exp = now
            .checked_add(ttl)
            .filter(|exp| *exp > now)
            .ok_or(IdentityError::TokenLifetime)?;
        let claims = Claims {
            ver: CLAIMS_VERSION,
            sub: user_id.to_string(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Checks signature, schema and expiry, returning the claims.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `self.clock` below.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::ExpiredToken,
                ErrorKind::InvalidSignature => IdentityError::InvalidSignature,
                _ => {
                    debug!(error = %e, "jwt rejected");
                    IdentityError::MalformedToken
                }
            })?
            .claims;

        if claims.ver != CLAIMS_VERSION {
            debug!(ver = claims.ver, "unknown claims version");
            return Err(IdentityError::MalformedToken);
        }
        if self.clock.now().unix_timestamp() >= claims.exp as i64 {
            return Err(IdentityError::ExpiredToken);
        }
        Ok(claims)
    }

    /// Returns the user id the token was issued for.
    pub fn verify(&self, token: &str) -> Result<i64, IdentityError> {
        let user_id = self.decode_claims(token)?.user_id()?;
        debug!(user_id, "jwt verified");
        Ok(user_id)
    }
}

#[cfg(test)]
pub(crate) struct FixedClock(pub OffsetDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
