// ============================================================================
// Structures : PricePoint, Trade, DayData
// ============================================================================
// Représente les données de marché affichées par le graphique :
// la série de prix (price-over-time) et les trades exécutés (buy/sell)
//
// CONCEPTS RUST :
// 1. i64 pour les timestamps : millisecondes epoch (assez jusqu'en l'an ~292M)
// 2. f64 pour les prix : précision suffisante, jamais arrondi en interne
// 3. Enum TradeSide : le compilateur force à gérer Buy ET Sell
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Un point de la série de prix
///
/// CONCEPT RUST : Derive Copy
/// - Deux f64/i64 : copie triviale, pas besoin de clone() explicite
/// - Immutable une fois reçu : aucun setter, on remplace la série entière
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Timestamp en millisecondes epoch (UTC)
    pub timestamp: i64,

    /// Prix à cet instant
    pub price: f64,
}

impl PricePoint {
    /// Crée un nouveau point de prix
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Convertit le timestamp en DateTime<Utc>
    ///
    /// CONCEPT RUST : Option
    /// - from_timestamp_millis retourne None pour un timestamp hors limites
    /// - On ne panique jamais sur des données venues du réseau
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Côté d'un trade : achat ou vente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    /// Achat (marqueur vert/cyan sur le graphique)
    Buy,
    /// Vente (marqueur rouge/magenta sur le graphique)
    Sell,
}

impl TradeSide {
    /// Label court pour l'affichage (tooltip, logs)
    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// Un trade exécuté, affiché comme marqueur par-dessus la courbe
///
/// Indépendant de la série de prix : un trade peut tomber entre deux points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Timestamp en millisecondes epoch (UTC)
    pub timestamp: i64,

    /// Prix d'exécution
    pub price: f64,

    /// Achat ou vente
    pub side: TradeSide,

    /// Montant du trade (affichage uniquement, jamais utilisé en calcul)
    pub value: f64,
}

impl Trade {
    /// Crée un nouveau trade
    pub fn new(timestamp: i64, price: f64, side: TradeSide, value: f64) -> Self {
        Self {
            timestamp,
            price,
            side,
            value,
        }
    }
}

/// Les données complètes d'une journée : série de prix + trades
///
/// CONCEPT RUST : Composition
/// - C'est l'unité de cache du carousel : une entrée par jour
/// - Une journée sans activité est représentée par des Vec vides (pas une erreur)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayData {
    /// Série de prix, triée par timestamp croissant
    pub prices: Vec<PricePoint>,

    /// Trades de la journée
    pub trades: Vec<Trade>,
}

impl DayData {
    /// Crée des données de journée
    pub fn new(prices: Vec<PricePoint>, trades: Vec<Trade>) -> Self {
        Self { prices, trades }
    }

    /// Vérifie si la journée est vide (aucun prix)
    ///
    /// Des trades sans série de prix ne sont pas affichables :
    /// le graphique n'a pas de bornes sans au moins un point
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Snapshot "live" retourné par le backend
///
/// Contient la liste des jours navigables en plus des données du jour courant
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Jours navigables, triés croissants ("YYYY-MM-DD")
    /// Par convention, le dernier est le jour "live"
    pub available_days: Vec<String>,

    /// Clé du jour courant côté backend
    pub current_day: String,

    /// Données du jour courant
    pub data: DayData,
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_point_datetime() {
        let point = PricePoint::new(1_700_000_000_000, 42.5);
        let dt = point.datetime().unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_trade_side_labels() {
        assert_eq!(TradeSide::Buy.label(), "BUY");
        assert_eq!(TradeSide::Sell.label(), "SELL");
    }

    #[test]
    fn test_day_data_empty() {
        // Vide par défaut
        assert!(DayData::default().is_empty());

        // Des trades seuls ne rendent pas la journée affichable
        let trades_only = DayData::new(
            Vec::new(),
            vec![Trade::new(1_000, 100.0, TradeSide::Buy, 50.0)],
        );
        assert!(trades_only.is_empty());

        let with_prices = DayData::new(vec![PricePoint::new(1_000, 100.0)], Vec::new());
        assert!(!with_prices.is_empty());
    }
}
