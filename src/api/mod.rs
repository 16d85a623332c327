// ============================================================================
// Module : api
// ============================================================================
// La frontière avec la source de données : le trait DataSource (contrat
// abstrait, n'importe quelle source pull-based convient), son implémentation
// HTTP/JSON, et la normalisation des formats wire
// ============================================================================

pub mod client; // Implémentation HTTP (reqwest)
mod wire;       // Formats JSON + normalisation (privé : rien ne sort en forme wire)

pub use client::HttpSource;

use anyhow::Result;

use crate::models::{DayData, Snapshot};

/// Contrat abstrait de la source de données
///
/// CONCEPT RUST : async fn dans un trait (stable depuis Rust 1.75)
/// - Les consommateurs sont génériques sur S: DataSource, pas de Box<dyn>
/// - Les tests injectent une source en mémoire sans réseau
pub trait DataSource {
    /// Snapshot live : jours navigables + série et trades du jour courant
    async fn fetch_snapshot(&self) -> Result<Snapshot>;

    /// Jour historique ; Ok(None) = pas de données pour ce jour
    /// (journée sans activité, résultat valide et non une erreur)
    async fn fetch_day(&self, day_key: &str) -> Result<Option<DayData>>;
}
