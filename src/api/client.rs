// ============================================================================
// API Client : backend de trading HTTP
// ============================================================================
// Implémentation HTTP/JSON du trait DataSource : snapshot live + jours
// historiques. Le "pas de contenu" (jour sans activité) est un résultat
// valide (Ok(None)), jamais une erreur
//
// CONCEPTS RUST :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : gestion d'erreurs avec contexte (anyhow)
// 3. Le client reqwest est construit une fois et réutilisé (pool de
//    connexions interne)
// ============================================================================

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tracing::{debug, error, instrument};

use crate::api::wire::{day_from_wire, snapshot_from_wire, WireDay, WireSnapshot};
use crate::api::DataSource;
use crate::models::{DayData, Snapshot};

/// Source de données HTTP vers le backend de trading
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Crée la source avec son URL de base (ex: "http://localhost:8080")
    ///
    /// CONCEPT RUST : Builder pattern
    /// - Le client est configuré une fois (user agent) puis réutilisé
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lazychart/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL de l'endpoint snapshot
    fn snapshot_url(&self) -> String {
        format!("{}/api/snapshot", self.base_url)
    }

    /// URL de l'endpoint d'un jour historique
    fn day_url(&self, day_key: &str) -> String {
        format!("{}/api/day/{}", self.base_url, day_key)
    }
}

impl DataSource for HttpSource {
    /// Récupère le snapshot live (jours navigables + série du jour courant)
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Macro tracing qui ajoute automatiquement un span
    /// - Tous les logs à l'intérieur auront le contexte de l'appel
    #[instrument(skip(self))]
    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let url = self.snapshot_url();
        debug!(url = %url, "Fetching live snapshot");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Échec de la requête snapshot vers le backend")?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Backend returned error status for snapshot");
            anyhow::bail!("Le backend a retourné une erreur : HTTP {}", status);
        }

        let wire: WireSnapshot = response
            .json()
            .await
            .context("Échec du parsing JSON du snapshot")?;

        let snapshot = snapshot_from_wire(wire);
        debug!(
            days = snapshot.available_days.len(),
            points = snapshot.data.prices.len(),
            trades = snapshot.data.trades.len(),
            "Snapshot fetched"
        );
        Ok(snapshot)
    }

    /// Récupère un jour historique ; Ok(None) si le backend n'a rien pour
    /// ce jour (404/204) — journée sans activité, résultat normal
    #[instrument(skip(self))]
    async fn fetch_day(&self, day_key: &str) -> Result<Option<DayData>> {
        let url = self.day_url(day_key);
        debug!(url = %url, "Fetching historical day");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Échec de la requête jour historique vers le backend")?;

        let status = response.status();

        // "Pas de contenu" est un résultat valide, pas une erreur
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            debug!(day = %day_key, "No data for day");
            return Ok(None);
        }

        if !status.is_success() {
            error!(status = %status, day = %day_key, "Backend returned error status for day");
            anyhow::bail!("Le backend a retourné une erreur : HTTP {}", status);
        }

        let wire: WireDay = response
            .json()
            .await
            .context("Échec du parsing JSON du jour historique")?;

        Ok(Some(day_from_wire(wire)))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let source = HttpSource::new("http://localhost:8080/").unwrap();
        // Le slash final de la base est normalisé
        assert_eq!(source.snapshot_url(), "http://localhost:8080/api/snapshot");
        assert_eq!(
            source.day_url("2024-03-15"),
            "http://localhost:8080/api/day/2024-03-15"
        );
    }
}
