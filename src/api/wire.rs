// ============================================================================
// Wire : formats JSON du backend et normalisation
// ============================================================================
// Le backend peut envoyer des noms de champs abrégés ("t"/"p") ou complets
// ("timestamp"/"price"). Ce module est le SEUL endroit qui connaît les deux
// orthographes : tout est normalisé ici en types canoniques (models), rien
// en aval ne voit jamais la forme wire
//
// CONCEPTS RUST :
// 1. #[serde(alias = "...")] : accepte plusieurs noms pour un même champ
// 2. #[serde(default)] : un array absent devient un Vec vide (payload
//    incomplet = données vides, jamais un crash du renderer)
// 3. Option sur les champs : une ligne incomplète est sautée avec un warn,
//    pas propagée comme erreur
// ============================================================================

use serde::Deserialize;
use tracing::warn;

use crate::models::{DayData, PricePoint, Snapshot, Trade, TradeSide};

// ============================================================================
// Structures wire (miroir du JSON, jamais exposées hors de api/)
// ============================================================================

/// Un point de prix tel que reçu sur le réseau
///
/// Champs en Option : une ligne sans timestamp ou sans prix est sautée
#[derive(Debug, Deserialize)]
pub(crate) struct WirePoint {
    #[serde(alias = "t")]
    timestamp: Option<i64>,
    #[serde(alias = "p")]
    price: Option<f64>,
}

/// Un trade tel que reçu sur le réseau
#[derive(Debug, Deserialize)]
pub(crate) struct WireTrade {
    #[serde(alias = "t")]
    timestamp: Option<i64>,
    #[serde(alias = "p")]
    price: Option<f64>,
    side: Option<TradeSide>,
    /// Montant affiché dans le tooltip ; 0 si absent
    #[serde(default)]
    value: f64,
}

/// Snapshot live : jours navigables + données du jour courant
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSnapshot {
    #[serde(default)]
    available_days: Vec<String>,
    #[serde(default)]
    current_day: String,
    #[serde(default)]
    prices: Vec<WirePoint>,
    #[serde(default)]
    trades: Vec<WireTrade>,
}

/// Données d'un jour historique
#[derive(Debug, Deserialize)]
pub(crate) struct WireDay {
    #[serde(default)]
    prices: Vec<WirePoint>,
    #[serde(default)]
    trades: Vec<WireTrade>,
}

// ============================================================================
// Normalisation wire -> modèles canoniques
// ============================================================================

/// Convertit les points wire en PricePoint, triés par timestamp croissant
///
/// CONCEPT RUST : filter_map
/// - Les lignes incomplètes sont sautées (comptées puis loguées), le reste
///   de la série reste exploitable
fn normalize_points(wire: Vec<WirePoint>) -> Vec<PricePoint> {
    let total = wire.len();

    let mut points: Vec<PricePoint> = wire
        .into_iter()
        .filter_map(|w| match (w.timestamp, w.price) {
            (Some(t), Some(p)) => Some(PricePoint::new(t, p)),
            _ => None,
        })
        .collect();

    let skipped = total - points.len();
    if skipped > 0 {
        warn!(skipped, total, "Skipped price points with missing fields");
    }

    // Le renderer suppose une série croissante ; on trie par sécurité
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Convertit les trades wire en Trade
fn normalize_trades(wire: Vec<WireTrade>) -> Vec<Trade> {
    let total = wire.len();

    let trades: Vec<Trade> = wire
        .into_iter()
        .filter_map(|w| match (w.timestamp, w.price, w.side) {
            (Some(t), Some(p), Some(side)) => Some(Trade::new(t, p, side, w.value)),
            _ => None,
        })
        .collect();

    let skipped = total - trades.len();
    if skipped > 0 {
        warn!(skipped, total, "Skipped trades with missing fields");
    }

    trades
}

/// Normalise un snapshot wire complet
pub(crate) fn snapshot_from_wire(wire: WireSnapshot) -> Snapshot {
    Snapshot {
        available_days: wire.available_days,
        current_day: wire.current_day,
        data: DayData::new(normalize_points(wire.prices), normalize_trades(wire.trades)),
    }
}

/// Normalise les données d'un jour historique
pub(crate) fn day_from_wire(wire: WireDay) -> DayData {
    DayData::new(normalize_points(wire.prices), normalize_trades(wire.trades))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviated_field_names() {
        let json = r#"{"prices": [{"t": 1000, "p": 100.5}], "trades": []}"#;
        let wire: WireDay = serde_json::from_str(json).unwrap();
        let data = day_from_wire(wire);

        assert_eq!(data.prices, vec![PricePoint::new(1000, 100.5)]);
    }

    #[test]
    fn test_full_field_names() {
        let json = r#"{
            "prices": [{"timestamp": 1000, "price": 100.5}],
            "trades": [{"timestamp": 2000, "price": 101.0, "side": "buy", "value": 50.0}]
        }"#;
        let wire: WireDay = serde_json::from_str(json).unwrap();
        let data = day_from_wire(wire);

        assert_eq!(data.prices, vec![PricePoint::new(1000, 100.5)]);
        assert_eq!(
            data.trades,
            vec![Trade::new(2000, 101.0, TradeSide::Buy, 50.0)]
        );
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        // Payload incomplet : jamais de crash, des séquences vides
        let wire: WireDay = serde_json::from_str("{}").unwrap();
        let data = day_from_wire(wire);
        assert!(data.prices.is_empty());
        assert!(data.trades.is_empty());
    }

    #[test]
    fn test_incomplete_rows_skipped() {
        let json = r#"{"prices": [{"t": 1000}, {"t": 2000, "p": 50.0}, {"p": 60.0}]}"#;
        let wire: WireDay = serde_json::from_str(json).unwrap();
        let data = day_from_wire(wire);

        // Seule la ligne complète survit
        assert_eq!(data.prices, vec![PricePoint::new(2000, 50.0)]);
    }

    #[test]
    fn test_points_sorted_after_normalization() {
        let json = r#"{"prices": [{"t": 3000, "p": 3.0}, {"t": 1000, "p": 1.0}, {"t": 2000, "p": 2.0}]}"#;
        let wire: WireDay = serde_json::from_str(json).unwrap();
        let data = day_from_wire(wire);

        let timestamps: Vec<i64> = data.prices.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
    }

    #[test]
    fn test_snapshot_camel_case_fields() {
        let json = r#"{
            "availableDays": ["2024-03-14", "2024-03-15"],
            "currentDay": "2024-03-15",
            "prices": [{"t": 1000, "p": 100.0}]
        }"#;
        let wire: WireSnapshot = serde_json::from_str(json).unwrap();
        let snapshot = snapshot_from_wire(wire);

        assert_eq!(snapshot.available_days.len(), 2);
        assert_eq!(snapshot.current_day, "2024-03-15");
        assert_eq!(snapshot.data.prices.len(), 1);
        assert!(snapshot.data.trades.is_empty());
    }

    #[test]
    fn test_trade_without_side_skipped() {
        let json = r#"{"trades": [{"t": 1000, "p": 100.0, "value": 5.0}]}"#;
        let wire: WireDay = serde_json::from_str(json).unwrap();
        assert!(day_from_wire(wire).trades.is_empty());
    }
}
