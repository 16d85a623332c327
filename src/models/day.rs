// ============================================================================
// Structure : DayCache
// ============================================================================
// Cache par jour des données de marché déjà récupérées
//
// CONCEPTS RUST :
// 1. HashMap<String, DayData> : lookup par clé de jour ("YYYY-MM-DD")
// 2. Ownership : le cache possède les données, les lecteurs empruntent (&)
// 3. Pas d'éviction : le nombre de jours est borné par le calendrier publié
//    par le backend, donc la mémoire reste petite
// ============================================================================

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::DayData;

/// Cache par jour, append-only par clé, durée de vie du process
///
/// Les jours historiques sont des snapshots immuables : une fois en cache,
/// on ne refait jamais d'appel réseau pour eux. Seul le jour live est
/// réécrit à chaque poll (il change tant que la journée n'est pas finie).
#[derive(Debug, Default)]
pub struct DayCache {
    entries: HashMap<String, DayData>,
}

impl DayCache {
    /// Crée un cache vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Récupère les données d'un jour (None si jamais fetché)
    pub fn get(&self, day_key: &str) -> Option<&DayData> {
        self.entries.get(day_key)
    }

    /// Vérifie si un jour est en cache
    pub fn contains(&self, day_key: &str) -> bool {
        self.entries.contains_key(day_key)
    }

    /// Insère ou remplace l'entrée d'un jour
    ///
    /// CONCEPT RUST : String vs &str
    /// - Prend un &str et alloue la clé seulement à l'insertion
    /// - L'appelant garde sa string
    pub fn insert(&mut self, day_key: &str, data: DayData) {
        self.entries.insert(day_key.to_string(), data);
    }

    /// Insère seulement si le jour n'est pas déjà en cache
    ///
    /// Utilisé pour les fetches historiques : ils ne doivent jamais
    /// écraser le slot du jour live (réécrit par le polling uniquement)
    pub fn insert_if_absent(&mut self, day_key: &str, data: DayData) {
        self.entries.entry(day_key.to_string()).or_insert(data);
    }

    /// Nombre de jours en cache
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Vérifie si le cache est vide
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Helpers : formatage des clés de jour
// ============================================================================

/// Formate une clé de jour ("2024-03-15") en label lisible ("Fri 15 Mar")
///
/// CONCEPT RUST : Fallback gracieux
/// - Une clé mal formée venue du backend ne doit pas faire paniquer l'UI
/// - On affiche alors la clé brute telle quelle
pub fn day_label(day_key: &str) -> String {
    match NaiveDate::parse_from_str(day_key, "%Y-%m-%d") {
        Ok(date) => date.format("%a %d %b").to_string(),
        Err(_) => day_key.to_string(),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;

    fn sample_day(price: f64) -> DayData {
        DayData::new(vec![PricePoint::new(1_000, price)], Vec::new())
    }

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = DayCache::new();
        assert!(cache.is_empty());
        assert!(!cache.contains("2024-03-15"));

        cache.insert("2024-03-15", sample_day(100.0));
        assert!(cache.contains("2024-03-15"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("2024-03-15").unwrap().prices[0].price, 100.0);
    }

    #[test]
    fn test_cache_insert_overwrites() {
        // Le jour live est réécrit à chaque poll
        let mut cache = DayCache::new();
        cache.insert("2024-03-15", sample_day(100.0));
        cache.insert("2024-03-15", sample_day(110.0));
        assert_eq!(cache.get("2024-03-15").unwrap().prices[0].price, 110.0);
    }

    #[test]
    fn test_cache_insert_if_absent_preserves() {
        // Un fetch historique ne doit pas écraser le slot live
        let mut cache = DayCache::new();
        cache.insert("2024-03-15", sample_day(100.0));
        cache.insert_if_absent("2024-03-15", sample_day(50.0));
        assert_eq!(cache.get("2024-03-15").unwrap().prices[0].price, 100.0);

        cache.insert_if_absent("2024-03-14", sample_day(90.0));
        assert_eq!(cache.get("2024-03-14").unwrap().prices[0].price, 90.0);
    }

    #[test]
    fn test_day_label() {
        assert_eq!(day_label("2024-03-15"), "Fri 15 Mar");
        // Clé mal formée : affichée brute, pas de panic
        assert_eq!(day_label("pas-une-date"), "pas-une-date");
    }
}
