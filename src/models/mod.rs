// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod day;    // Cache par jour et helpers de clés de jour
pub mod market; // Points de prix, trades, snapshot

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazychart::models::market::PricePoint;
// On peut faire : use lazychart::models::PricePoint;
pub use day::{day_label, DayCache};
pub use market::{DayData, PricePoint, Snapshot, Trade, TradeSide};
