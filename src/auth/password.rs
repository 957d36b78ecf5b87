use std::sync::Arc;

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

use crate::config::HashConfig;

/// Argon2id hasher with work factor fixed at startup.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
    // verified against when the account does not exist
    decoy_hash: Arc<str>,
}

impl Hasher {
    pub fn new(cfg: HashConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy = SaltString::generate(&mut OsRng);
        let decoy_hash = hash_with(&argon2, decoy.as_str())?;
        Ok(Self {
            argon2,
            decoy_hash: decoy_hash.into(),
        })
    }

    pub fn hash_blocking(&self, plain: &str) -> anyhow::Result<String> {
        hash_with(&self.argon2, plain)
    }

    /// `false` for a mismatch and for a hash that does not parse.
    pub fn verify_blocking(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "stored password hash does not parse");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash(&self, plain: String) -> anyhow::Result<String> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.hash_blocking(&plain))
            .await
            .context("hash task panicked")?
    }

    pub async fn verify(&self, plain: String, hash: String) -> bool {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.verify_blocking(&plain, &hash))
            .await
            .unwrap_or(false)
    }

    /// Spends the same effort as `verify` and always fails.
    pub async fn verify_absent(&self, plain: String) -> bool {
        let decoy = self.decoy_hash.to_string();
        let _ = self.verify(plain, decoy).await;
        false
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> Hasher {
    Hasher::new(HashConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}
