// ============================================================================
// Structure : Config
// ============================================================================
// Les réglages de l'application : URL du backend, cadence de polling,
// délai de retry. Des défauts raisonnables, surchargés par variables
// d'environnement (même mécanisme que RUST_LOG pour les logs)
//
// CONCEPT RUST : Parse avec fallback
// - Une variable absente ou invalide retombe sur le défaut (avec un warn),
//   jamais de panic au démarrage pour une config approximative
// ============================================================================

use std::time::Duration;

use tracing::warn;

/// URL de base du backend par défaut
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Cadence du polling du jour live (secondes)
const DEFAULT_POLL_SECS: u64 = 10;

/// Délai avant retry après un échec de fetch (secondes)
const DEFAULT_RETRY_SECS: u64 = 5;

/// Configuration de l'application
#[derive(Debug, Clone)]
pub struct Config {
    /// URL de base du backend (ex: "http://localhost:8080")
    pub base_url: String,

    /// Intervalle entre deux polls du jour live
    pub poll_interval: Duration,

    /// Délai avant le retry unique après un échec de fetch live
    pub retry_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            retry_interval: Duration::from_secs(DEFAULT_RETRY_SECS),
        }
    }
}

impl Config {
    /// Construit la config : défauts + surcharges d'environnement
    ///
    /// Variables reconnues :
    /// - LAZYCHART_URL : URL de base du backend
    /// - LAZYCHART_POLL_SECS : cadence de polling en secondes
    /// - LAZYCHART_RETRY_SECS : délai de retry en secondes
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LAZYCHART_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }

        if let Some(secs) = read_secs("LAZYCHART_POLL_SECS") {
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = read_secs("LAZYCHART_RETRY_SECS") {
            config.retry_interval = Duration::from_secs(secs);
        }

        config
    }
}

/// Lit une durée en secondes depuis l'environnement (None si absente/invalide)
fn read_secs(var: &str) -> Option<u64> {
    let raw = std::env::var(var).ok()?;
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => {
            warn!(var, value = %raw, "Invalid duration in environment, using default");
            None
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
