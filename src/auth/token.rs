use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ac::Role, fallible::Error};

/// A token is good for half a day, afterwards the client logs in again.
const TOKEN_LIFETIME_HOURS: i64 = 12;

/// Claims
///
/// Represents the different fields in the JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// expires at unix timestamp
    pub exp: i64,
    /// issued at unix timestamp
    pub iat: i64,
    /// not valid before unix timestamp
    pub nbf: i64,
    /// the id of this token
    pub jti: Uuid,
    /// the account this token belongs to
    pub sub: i64,
    pub username: String,
    pub role: Role,
}

impl Claims {
    pub fn new(id: i64, username: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4(),
            sub: id,
            username,
            role,
        }
    }

    /// Signs the claims into a compact JWT
    ///
    /// # Panics
    ///
    /// panics if the [``encode``] method returns [``Err``]. Should only be
    /// the case if the key is malformed
    pub fn sign(&self, key: &EncodingKey) -> String {
        encode(&Header::default(), self, key).expect("cannot encode access token")
    }

    /// Tries to parse and validate a JWT, including the expiry check
    pub fn parse(token: &str, key: &DecodingKey) -> Result<Self, Error> {
        lazy_static! {
            static ref VALIDATION: Validation = Validation::new(Algorithm::HS256);
        }

        decode::<Claims>(token, key, &VALIDATION)
            .map(|data| data.claims)
            .map_err(|_| Error::InvalidToken)
    }
}
