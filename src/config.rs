use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, str::FromStr};

use crate::services::search_service::{DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_KM};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub default_radius_km: f64,
    pub max_results: usize,
}

/// What the process should do once configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    /// Apply migrations and exit
    Migrate,
    /// Sweep overdue donations to `expired` and exit
    ExpireOverdue,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Food donation matching service")]
pub struct Args {
    /// Host to bind to (overrides FOOD_SHARE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FOOD_SHARE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides FOOD_SHARE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Search radius used when a caller gives none (overrides FOOD_SHARE_DEFAULT_RADIUS_KM)
    #[arg(long)]
    pub default_radius_km: Option<f64>,

    /// Upper bound on search results (overrides FOOD_SHARE_MAX_RESULTS)
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Run migrations and exit
    #[arg(long, conflicts_with = "expire_overdue")]
    pub migrate: bool,

    /// Mark available donations past their expiry as expired, then exit
    #[arg(long)]
    pub expire_overdue: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, RunMode)> {
        Self::resolve(Args::parse(), |key| env::var(key))
    }

    /// Merge CLI arguments over values obtained from `lookup`.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<(Self, RunMode)>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = lookup("FOOD_SHARE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_var(&lookup, "FOOD_SHARE_PORT", 3000u16)?;
        let env_db = lookup("FOOD_SHARE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/food_share.db".into());
        let env_radius = parse_var(&lookup, "FOOD_SHARE_DEFAULT_RADIUS_KM", DEFAULT_RADIUS_KM)?;
        let env_max = parse_var(&lookup, "FOOD_SHARE_MAX_RESULTS", DEFAULT_MAX_RESULTS)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            default_radius_km: args.default_radius_km.unwrap_or(env_radius),
            max_results: args.max_results.unwrap_or(env_max),
        };

        if !cfg.default_radius_km.is_finite() || cfg.default_radius_km < 0.0 {
            bail!(
                "default radius must be a non-negative number, got {}",
                cfg.default_radius_km
            );
        }
        if cfg.max_results == 0 {
            bail!("max results must be at least 1");
        }

        let mode = if args.migrate {
            RunMode::Migrate
        } else if args.expire_overdue {
            RunMode::ExpireOverdue
        } else {
            RunMode::Serve
        };

        Ok((cfg, mode))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Result<String, env::VarError> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn test_defaults() {
        let (cfg, mode) = AppConfig::resolve(Args::default(), lookup_from(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.database_url, "sqlite://./data/food_share.db");
        assert_eq!(cfg.default_radius_km, DEFAULT_RADIUS_KM);
        assert_eq!(cfg.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(mode, RunMode::Serve);
    }

    #[test]
    fn test_args_override_env() {
        let args = Args {
            port: Some(8080),
            expire_overdue: true,
            ..Args::default()
        };
        let lookup = lookup_from(&[("FOOD_SHARE_PORT", "9000"), ("FOOD_SHARE_HOST", "127.0.0.1")]);
        let (cfg, mode) = AppConfig::resolve(args, lookup).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(mode, RunMode::ExpireOverdue);
    }

    #[test]
    fn test_invalid_env_values_rejected() {
        let err = AppConfig::resolve(Args::default(), lookup_from(&[("FOOD_SHARE_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("FOOD_SHARE_PORT"));

        let lookup = lookup_from(&[("FOOD_SHARE_DEFAULT_RADIUS_KM", "-2")]);
        assert!(AppConfig::resolve(Args::default(), lookup).is_err());

        let lookup = lookup_from(&[("FOOD_SHARE_MAX_RESULTS", "0")]);
        assert!(AppConfig::resolve(Args::default(), lookup).is_err());
    }
}
