use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::career::gaps::DEFAULT_GAP_THRESHOLD_MONTHS;
use crate::career::risk::RiskPolicy;
use crate::career::tenure::DEFAULT_JOB_HOPPING_THRESHOLD_MONTHS;

const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Which `SimilarityProvider` the server is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimilarityBackend {
    #[default]
    Lexical,
    Embedding,
}

impl FromStr for SimilarityBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(SimilarityBackend::Lexical),
            "embedding" => Ok(SimilarityBackend::Embedding),
            other => Err(format!("unknown similarity backend '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub jobs_csv_path: PathBuf,
    pub risk_policy: RiskPolicy,
    pub gap_threshold_months: u32,
    pub job_hopping_threshold_months: f64,
    pub max_upload_mb: usize,
    pub similarity_backend: SimilarityBackend,
    /// Required when `similarity_backend` is `Embedding`.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests never touch the process env.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let similarity_backend = match var("SIMILARITY_BACKEND") {
            Some(raw) => raw
                .parse::<SimilarityBackend>()
                .map_err(anyhow::Error::msg)
                .context("SIMILARITY_BACKEND must be lexical or embedding")?,
            None => SimilarityBackend::default(),
        };
        let embedding_api_url = var("EMBEDDING_API_URL");
        if similarity_backend == SimilarityBackend::Embedding && embedding_api_url.is_none() {
            bail!("EMBEDDING_API_URL is required when SIMILARITY_BACKEND=embedding");
        }

        Ok(Config {
            port: parse_or(var("PORT"), 8080, "PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            jobs_csv_path: var("JOBS_CSV_PATH")
                .unwrap_or_else(|| "job_clean_data.csv".to_string())
                .into(),
            risk_policy: match var("RISK_POLICY") {
                Some(raw) => raw
                    .parse::<RiskPolicy>()
                    .map_err(anyhow::Error::msg)
                    .context("RISK_POLICY must be any_flag or both_flags")?,
                None => RiskPolicy::default(),
            },
            gap_threshold_months: parse_or(
                var("GAP_THRESHOLD_MONTHS"),
                DEFAULT_GAP_THRESHOLD_MONTHS,
                "GAP_THRESHOLD_MONTHS must be a whole number of months",
            )?,
            job_hopping_threshold_months: positive_months(parse_or(
                var("JOB_HOPPING_THRESHOLD_MONTHS"),
                DEFAULT_JOB_HOPPING_THRESHOLD_MONTHS,
                "JOB_HOPPING_THRESHOLD_MONTHS must be a number of months",
            )?)
            .context("JOB_HOPPING_THRESHOLD_MONTHS must be a finite number above zero")?,
            max_upload_mb: parse_or(
                var("MAX_UPLOAD_MB"),
                25,
                "MAX_UPLOAD_MB must be a whole number of megabytes",
            )?,
            similarity_backend,
            embedding_api_url,
            embedding_api_key: var("EMBEDDING_API_KEY"),
            embedding_model: var("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_or<T>(raw: Option<String>, default: T, message: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw.trim().parse::<T>().context(message),
        None => Ok(default),
    }
}

fn positive_months(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        bail!("got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.jobs_csv_path, PathBuf::from("job_clean_data.csv"));
        assert_eq!(config.risk_policy, RiskPolicy::AnyFlag);
        assert_eq!(config.gap_threshold_months, 6);
        assert_eq!(config.job_hopping_threshold_months, 12.0);
        assert_eq!(config.max_upload_bytes(), 25 * 1024 * 1024);
        assert_eq!(config.similarity_backend, SimilarityBackend::Lexical);
        assert_eq!(config.embedding_model, "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("RISK_POLICY", "both_flags"),
            ("GAP_THRESHOLD_MONTHS", "3"),
            ("JOB_HOPPING_THRESHOLD_MONTHS", "18.5"),
            ("SIMILARITY_BACKEND", "Embedding"),
            ("EMBEDDING_API_URL", "http://localhost:9999/v1/embeddings"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.risk_policy, RiskPolicy::BothFlags);
        assert_eq!(config.gap_threshold_months, 3);
        assert_eq!(config.job_hopping_threshold_months, 18.5);
        assert_eq!(config.similarity_backend, SimilarityBackend::Embedding);
        assert!(config.embedding_api_key.is_none());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("RISK_POLICY", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.risk_policy, RiskPolicy::AnyFlag);
    }

    #[test]
    fn test_embedding_backend_requires_url() {
        assert!(config_from(&[("SIMILARITY_BACKEND", "embedding")]).is_err());
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("RISK_POLICY", "sometimes")]).is_err());
        assert!(config_from(&[("SIMILARITY_BACKEND", "magic")]).is_err());
        assert!(config_from(&[("GAP_THRESHOLD_MONTHS", "-1")]).is_err());
        for bad in ["NaN", "inf", "-inf", "-3", "0"] {
            assert!(
                config_from(&[("JOB_HOPPING_THRESHOLD_MONTHS", bad)]).is_err(),
                "accepted {bad}"
            );
        }
    }
}
