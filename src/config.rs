use anyhow::Context;
use serde::Deserialize;

const DEFAULT_TTL_SECONDS: i64 = 60 * 60 * 24 * 30;
const MAX_TTL_SECONDS: i64 = 60 * 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            ttl_seconds: parse_ttl_seconds(std::env::var("JWT_TTL_SECONDS").ok().as_deref()),
        };
        Ok(Self {
            database_url,
            max_connections,
            jwt,
        })
    }
}

/// Unset, unparseable or non-positive values fall back to the default;
/// anything above one year is clamped to one year.
fn parse_ttl_seconds(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| v.min(MAX_TTL_SECONDS))
        .unwrap_or(DEFAULT_TTL_SECONDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_when_missing_or_invalid() {
        assert_eq!(parse_ttl_seconds(None), DEFAULT_TTL_SECONDS);
        assert_eq!(parse_ttl_seconds(Some("soon")), DEFAULT_TTL_SECONDS);
        assert_eq!(parse_ttl_seconds(Some("0")), DEFAULT_TTL_SECONDS);
        assert_eq!(parse_ttl_seconds(Some("-60")), DEFAULT_TTL_SECONDS);
    }

    #[test]
    fn ttl_is_clamped_to_a_year() {
        assert_eq!(parse_ttl_seconds(Some("3600")), 3600);
        assert_eq!(
            parse_ttl_seconds(Some(&i64::MAX.to_string())),
            MAX_TTL_SECONDS
        );
    }
}
