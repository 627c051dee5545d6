//! Process configuration from the environment (and an optional `.env`).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use tracing::warn;

use jobboard_auth::{DEFAULT_TOKEN_TTL_SECS, parse_ttl};
use jobboard_infra::ServiceSettings;
use jobboard_infra::razorpay::DEFAULT_BASE_URL;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_base_url: String,
    pub payment_timeout: Duration,
    pub email_timeout: Duration,
    /// `None` disables the reconciler.
    pub reconcile_interval: Option<Duration>,
    pub database_url: Option<String>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("razorpay_key_id", &self.razorpay_key_id)
            .field("razorpay_base_url", &self.razorpay_base_url)
            .field("payment_timeout", &self.payment_timeout)
            .field("email_timeout", &self.email_timeout)
            .field("reconcile_interval", &self.reconcile_interval)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; malformed values name the variable.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8080")?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl_secs = match var("JWT_EXPIRES_IN") {
            None => DEFAULT_TOKEN_TTL_SECS,
            Some(raw) => parse_ttl(&raw)
                .ok_or_else(|| anyhow!("JWT_EXPIRES_IN must look like 7d, 12h, 30m or a number of seconds"))?,
        };

        let razorpay_key_id = var("RAZORPAY_KEY_ID").context("RAZORPAY_KEY_ID is required")?;
        let razorpay_key_secret = var("RAZORPAY_KEY_SECRET").context("RAZORPAY_KEY_SECRET is required")?;
        let razorpay_base_url = var("RAZORPAY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let payment_timeout = Duration::from_secs(secs(&var, "PAYMENT_TIMEOUT_SECS", 10)?.max(1));
        let email_timeout = Duration::from_secs(secs(&var, "EMAIL_TIMEOUT_SECS", 5)?.max(1));
        let reconcile_interval = match secs(&var, "RECONCILE_INTERVAL_SECS", 300)? {
            0 => None,
            n => Some(Duration::from_secs(n)),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_secs,
            razorpay_key_id,
            razorpay_key_secret,
            razorpay_base_url,
            payment_timeout,
            email_timeout,
            reconcile_interval,
            database_url: var("DATABASE_URL"),
        })
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl_secs: self.token_ttl_secs,
            payment_key_secret: self.razorpay_key_secret.clone(),
            payment_timeout: self.payment_timeout,
            email_timeout: self.email_timeout,
        }
    }
}

fn secs(var: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> anyhow::Result<u64> {
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    const KEYS: [(&str, &str); 2] = [("RAZORPAY_KEY_ID", "rzp_id"), ("RAZORPAY_KEY_SECRET", "rzp_secret")];

    #[test]
    fn defaults_apply() {
        let cfg = config(&KEYS).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(cfg.payment_timeout, Duration::from_secs(10));
        assert_eq!(cfg.reconcile_interval, Some(Duration::from_secs(300)));
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn provider_keys_are_required() {
        let err = config(&[("RAZORPAY_KEY_ID", "x")]).unwrap_err();
        assert!(err.to_string().contains("RAZORPAY_KEY_SECRET"));
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("PAYMENT_TIMEOUT_SECS", "soon"));
        assert!(config(&pairs).unwrap_err().to_string().contains("PAYMENT_TIMEOUT_SECS"));

        let mut pairs = KEYS.to_vec();
        pairs.push(("JWT_EXPIRES_IN", "forever"));
        assert!(config(&pairs).unwrap_err().to_string().contains("JWT_EXPIRES_IN"));
    }

    #[test]
    fn zero_interval_disables_reconciliation() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("RECONCILE_INTERVAL_SECS", "0"));
        pairs.push(("JWT_EXPIRES_IN", "2h"));
        let cfg = config(&pairs).unwrap();
        assert_eq!(cfg.reconcile_interval, None);
        assert_eq!(cfg.token_ttl_secs, 7200);
    }
}
