use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Ten years. Longer lifetimes overflow the expiry arithmetic.
pub const MAX_JWT_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

impl JwtConfig {
    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.secret.is_empty(), "JWT_SECRET must not be empty");
        anyhow::ensure!(self.ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");
        anyhow::ensure!(
            self.ttl_minutes <= MAX_JWT_TTL_MINUTES,
            "JWT_TTL_MINUTES must be at most {MAX_JWT_TTL_MINUTES}"
        );
        Ok(())
    }
}

/// Argon2 cost parameters, applied to every hash.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for Argon2id)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Admin account created at startup when it does not exist yet.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub hashing: HashConfig,
    pub bootstrap_admin_email: Option<String>,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "portfolio".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "portfolio-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60 * 24 * 30)?,
        };
        jwt.check()?;

        let defaults = HashConfig::default();
        let hashing = HashConfig {
            memory_kib: env_parse("HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_parse("HASH_ITERATIONS", defaults.iterations)?,
            parallelism: env_parse("HASH_PARALLELISM", defaults.parallelism)?,
        };

        let bootstrap_admin_email = env_opt("BOOTSTRAP_ADMIN_EMAIL");

        let seed_admin = match (env_opt("SEED_ADMIN_EMAIL"), env_opt("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                name: env_opt("SEED_ADMIN_NAME").unwrap_or_else(|| "Portfolio Admin".into()),
                email,
                password,
            }),
            (None, None) => None,
            _ => anyhow::bail!("SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            database_url,
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt,
            hashing,
            bootstrap_admin_email,
            seed_admin,
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Unset falls back to `default`; a set but unparsable value is an error.
fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_uses_default_when_unset() {
        let v: u32 = env_parse("PORTFOLIO_TEST_SURELY_UNSET_VAR", 7).unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn env_parse_rejects_garbage() {
        std::env::set_var("PORTFOLIO_TEST_BAD_NUMBER", "twelve");
        let err = env_parse::<u32>("PORTFOLIO_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("PORTFOLIO_TEST_BAD_NUMBER"));
    }

    fn jwt(ttl_minutes: i64) -> JwtConfig {
        JwtConfig {
            secret: "s".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes,
        }
    }

    #[test]
    fn jwt_ttl_is_bounded() {
        assert!(jwt(60 * 24 * 30).check().is_ok());
        assert!(jwt(MAX_JWT_TTL_MINUTES).check().is_ok());
        assert!(jwt(0).check().is_err());
        assert!(jwt(MAX_JWT_TTL_MINUTES + 1).check().is_err());
        assert!(jwt(i64::MAX).check().is_err());
    }

    #[test]
    fn default_hash_config_matches_argon2_defaults() {
        let cfg = HashConfig::default();
        assert_eq!(cfg.memory_kib, argon2::Params::DEFAULT_M_COST);
        assert_eq!(cfg.iterations, argon2::Params::DEFAULT_T_COST);
        assert_eq!(cfg.parallelism, argon2::Params::DEFAULT_P_COST);
    }
}
