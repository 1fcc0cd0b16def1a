use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Current claims schema version. Tokens carrying any other value are rejected.
pub const CLAIMS_VERSION: u8 = 1;

/// JWT payload used for authentication.
///
/// A token stops being valid once `now >= exp`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub ver: u8,     // schema version
    pub sub: String, // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, IdentityError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| IdentityError::MalformedToken)
    }
}
