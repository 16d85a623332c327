// ============================================================================
// Scale : mapping linéaire données <-> pixels
// ============================================================================
// La couche "géométrie pure" du graphique : bornes, projection prix->y et
// temps->x (et leurs inverses exactes), pas de ticks "ronds", formatage
//
// Aucune dépendance au terminal : tout est testable sans surface de rendu
//
// CONCEPTS RUST :
// 1. Types valeurs Copy : Bounds et PlotRect se passent sans allocation
// 2. f64 partout : la précision pixel vient du mapping, pas d'arrondis cachés
// 3. Guards sur les plages dégénérées : jamais de division par zéro
// ============================================================================

use chrono::DateTime;

use crate::models::PricePoint;

/// Étendue de prix substituée quand la série est plate (range == 0)
///
/// Une série dont tous les prix sont égaux doit quand même produire des
/// bornes exploitables : ligne plate au milieu du graphique
pub const FLAT_RANGE_FALLBACK: f64 = 1.0;

/// Marge verticale ajoutée aux bornes de prix (±5% du range)
pub const PRICE_PADDING_RATIO: f64 = 0.05;

/// Garde-fou sur les boucles de génération de ticks
const MAX_TICKS: usize = 256;

// ============================================================================
// Bounds : bornes dérivées de la série courante
// ============================================================================

/// Bornes du domaine affiché, recalculées à chaque set_data
///
/// Jamais stockées comme vérité : toujours dérivées de la série courante
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_price: f64,
    pub max_price: f64,
    pub min_time: i64,
    pub max_time: i64,
}

impl Bounds {
    /// Calcule les bornes depuis une série de prix
    ///
    /// CONCEPT RUST : Iterator avec fold
    /// - fold() pour calculer min/max en un seul passage
    /// - Retourne None si la série est vide (état "no data", pas une erreur)
    pub fn from_points(points: &[PricePoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let (min_raw, max_raw) = points.iter().fold(
            (f64::MAX, f64::MIN),
            |(min, max), p| (min.min(p.price), max.max(p.price)),
        );
        let (min_time, max_time) = points.iter().fold(
            (i64::MAX, i64::MIN),
            |(min, max), p| (min.min(p.timestamp), max.max(p.timestamp)),
        );

        // Plage plate (un seul point, ou tous les prix égaux) : on substitue
        // une étendue fixe avant de calculer la marge, sinon division par zéro
        let mut range = max_raw - min_raw;
        if range.abs() < f64::EPSILON {
            range = FLAT_RANGE_FALLBACK;
        }

        // Marge de 5% pour que la courbe ne touche pas les bords
        let pad = range * PRICE_PADDING_RATIO;

        // Même garde côté temps : un point unique a min_time == max_time
        let max_time = if max_time == min_time {
            min_time + 1
        } else {
            max_time
        };

        Some(Self {
            min_price: min_raw - pad,
            max_price: max_raw + pad,
            min_time,
            max_time,
        })
    }

    /// Étendue de prix affichée (toujours > 0 par construction)
    pub fn price_range(&self) -> f64 {
        self.max_price - self.min_price
    }

    /// Étendue de temps affichée en millisecondes (toujours > 0)
    pub fn time_range(&self) -> i64 {
        self.max_time - self.min_time
    }
}

// ============================================================================
// PlotRect : rectangle de tracé en pixels
// ============================================================================

/// Le rectangle intérieur où la courbe est tracée (surface moins les marges)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    /// Vérifie si un point écran est dans le rectangle de tracé
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.left
            && px <= self.left + self.width
            && py >= self.top
            && py <= self.top + self.height
    }

    /// Bord droit du rectangle
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bord bas du rectangle
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

// ============================================================================
// LinearScale : projection linéaire inversible
// ============================================================================

/// Projection linéaire (prix, temps) <-> (y, x) sur un PlotRect
///
/// Les quatre fonctions sont des inverses exactes deux à deux : le hit-testing
/// du tooltip repose dessus (inverser la position du pointeur vers un timestamp)
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    pub plot: PlotRect,
    pub bounds: Bounds,
}

impl LinearScale {
    /// Crée une projection sur un rectangle et des bornes donnés
    pub fn new(plot: PlotRect, bounds: Bounds) -> Self {
        Self { plot, bounds }
    }

    /// Prix -> ordonnée pixel (y croît vers le bas, les prix vers le haut)
    pub fn price_to_y(&self, price: f64) -> f64 {
        let ratio = (price - self.bounds.min_price) / self.bounds.price_range();
        self.plot.top + self.plot.height * (1.0 - ratio)
    }

    /// Ordonnée pixel -> prix (inverse exacte de price_to_y)
    pub fn y_to_price(&self, y: f64) -> f64 {
        let ratio = 1.0 - (y - self.plot.top) / self.plot.height;
        self.bounds.min_price + self.bounds.price_range() * ratio
    }

    /// Timestamp (ms) -> abscisse pixel
    pub fn time_to_x(&self, timestamp: i64) -> f64 {
        let ratio = (timestamp - self.bounds.min_time) as f64 / self.bounds.time_range() as f64;
        self.plot.left + self.plot.width * ratio
    }

    /// Abscisse pixel -> timestamp en ms (inverse exacte de time_to_x)
    ///
    /// Retourne un f64 : le hit-testing compare des distances, pas des clés
    pub fn x_to_time(&self, x: f64) -> f64 {
        let ratio = (x - self.plot.left) / self.plot.width;
        self.bounds.min_time as f64 + self.bounds.time_range() as f64 * ratio
    }
}

// ============================================================================
// Ticks "ronds" pour les axes
// ============================================================================

/// Calcule un pas de graduation "humain" (1, 2, 5, 10, 20, 50, 100...)
///
/// Algorithme : pas brut = range / cible, puis on arrondit la mantisse
/// normalisée au plus proche de {1, 2, 5, 10}
/// (seuils : ≤1.5→1, ≤3→2, ≤7→5, sinon→10)
///
/// Exemples : nice_step(47.0, 5) == 10.0 ; nice_step(4.0, 5) == 1.0
pub fn nice_step(range: f64, target_count: usize) -> f64 {
    if range <= 0.0 || target_count == 0 {
        return FLAT_RANGE_FALLBACK;
    }

    let rough = range / target_count as f64;
    let magnitude = 10f64.powf(rough.log10().floor());
    let normalized = rough / magnitude;

    let snapped = if normalized <= 1.5 {
        1.0
    } else if normalized <= 3.0 {
        2.0
    } else if normalized <= 7.0 {
        5.0
    } else {
        10.0
    };

    snapped * magnitude
}

/// Génère les graduations de prix (valeurs rondes dans les bornes)
pub fn price_ticks(bounds: &Bounds, target_count: usize) -> Vec<f64> {
    let step = nice_step(bounds.price_range(), target_count);

    // Première graduation ronde >= min_price
    let mut value = (bounds.min_price / step).ceil() * step;
    let mut ticks = Vec::new();

    while value <= bounds.max_price && ticks.len() < MAX_TICKS {
        ticks.push(value);
        value += step;
    }

    ticks
}

/// Pas des graduations de temps selon l'étendue affichée
///
/// La densité s'adapte au range : demi-heures sous 2h, heures sous 6h,
/// sinon toutes les 4 heures
pub fn time_tick_step_ms(time_range_ms: i64) -> i64 {
    const MINUTE: i64 = 60 * 1000;
    const HOUR: i64 = 60 * MINUTE;

    if time_range_ms < 2 * HOUR {
        30 * MINUTE
    } else if time_range_ms < 6 * HOUR {
        HOUR
    } else {
        4 * HOUR
    }
}

/// Génère les graduations de temps (timestamps ronds dans les bornes)
pub fn time_ticks(bounds: &Bounds) -> Vec<i64> {
    let step = time_tick_step_ms(bounds.time_range());

    // Premier timestamp aligné sur le pas (minuit epoch est aligné,
    // donc les ticks tombent sur des heures rondes)
    let mut t = ((bounds.min_time + step - 1) / step) * step;
    let mut ticks = Vec::new();

    while t <= bounds.max_time && ticks.len() < MAX_TICKS {
        ticks.push(t);
        t += step;
    }

    ticks
}

// ============================================================================
// Formatage (présentation uniquement, jamais de perte côté données)
// ============================================================================

/// Formate un prix pour l'affichage
///
/// Règle : >= 10 000 -> "$12.3k" ; sinon dollars entiers groupés "$1,234"
pub fn format_price(price: f64) -> String {
    if price >= 10_000.0 {
        format!("${:.1}k", price / 1_000.0)
    } else if price < 0.0 {
        format!("-{}", format_price(-price))
    } else {
        format!("${}", group_thousands(price.round() as u64))
    }
}

/// Groupe un entier par milliers avec des virgules (1234567 -> "1,234,567")
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}

/// Formate un timestamp ms pour une graduation de l'axe X ("14:30")
pub fn format_tick_time(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => String::from("--:--"),
    }
}

/// Formate un timestamp ms pour le tooltip ("14:30:05")
pub fn format_tooltip_time(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => String::from("--:--:--"),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bounds() -> Bounds {
        Bounds::from_points(&[
            PricePoint::new(0, 100.0),
            PricePoint::new(60_000, 120.0),
            PricePoint::new(120_000, 110.0),
        ])
        .unwrap()
    }

    fn sample_scale() -> LinearScale {
        let plot = PlotRect {
            left: 10.0,
            top: 5.0,
            width: 200.0,
            height: 100.0,
        };
        LinearScale::new(plot, sample_bounds())
    }

    #[test]
    fn test_bounds_padding() {
        let bounds = sample_bounds();
        // Range brut 20, marge 5% = 1.0 de chaque côté
        assert!((bounds.min_price - 99.0).abs() < 1e-9);
        assert!((bounds.max_price - 121.0).abs() < 1e-9);
        assert_eq!(bounds.min_time, 0);
        assert_eq!(bounds.max_time, 120_000);
    }

    #[test]
    fn test_bounds_empty_series() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_flat_series_no_division_by_zero() {
        // Tous les prix égaux : range zéro, on substitue l'étendue fixe
        let points = vec![
            PricePoint::new(0, 50.0),
            PricePoint::new(1_000, 50.0),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert!(bounds.price_range() > 0.0);

        // La ligne plate doit rester projetable au milieu du graphique
        let plot = PlotRect {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 50.0,
        };
        let scale = LinearScale::new(plot, bounds);
        let y = scale.price_to_y(50.0);
        assert!(y.is_finite());
        assert!((y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_single_point() {
        let bounds = Bounds::from_points(&[PricePoint::new(5_000, 42.0)]).unwrap();
        assert!(bounds.price_range() > 0.0);
        assert!(bounds.time_range() > 0);
    }

    #[test]
    fn test_price_roundtrip() {
        let scale = sample_scale();
        for price in [99.0, 100.0, 110.5, 121.0] {
            let back = scale.y_to_price(scale.price_to_y(price));
            assert!(
                (back - price).abs() < 1e-9,
                "roundtrip {} -> {}",
                price,
                back
            );
        }
    }

    #[test]
    fn test_time_roundtrip() {
        let scale = sample_scale();
        for t in [0i64, 30_000, 60_000, 120_000] {
            let back = scale.x_to_time(scale.time_to_x(t));
            assert!((back - t as f64).abs() < 1e-6, "roundtrip {} -> {}", t, back);
        }
    }

    #[test]
    fn test_price_axis_orientation() {
        // Le prix max est en haut (y petit), le prix min en bas (y grand)
        let scale = sample_scale();
        let y_max = scale.price_to_y(scale.bounds.max_price);
        let y_min = scale.price_to_y(scale.bounds.min_price);
        assert!((y_max - scale.plot.top).abs() < 1e-9);
        assert!((y_min - scale.plot.bottom()).abs() < 1e-9);
    }

    #[test]
    fn test_nice_step_examples() {
        // rough = 9.4, magnitude 1, mantisse 9.4 -> branche "else -> 10"
        assert_eq!(nice_step(47.0, 5), 10.0);
        // rough = 0.8, magnitude 0.1, mantisse 8 -> 10 * 0.1 = 1
        assert!((nice_step(4.0, 5) - 1.0).abs() < 1e-9);
        // rough = 20, mantisse 2 -> 2 * 10 = 20
        assert!((nice_step(100.0, 5) - 20.0).abs() < 1e-9);
        // Plage invalide : fallback, pas de NaN
        assert_eq!(nice_step(0.0, 5), FLAT_RANGE_FALLBACK);
    }

    #[test]
    fn test_price_ticks_inside_bounds() {
        let bounds = sample_bounds();
        let ticks = price_ticks(&bounds, 5);
        assert!(!ticks.is_empty());
        for tick in &ticks {
            assert!(*tick >= bounds.min_price && *tick <= bounds.max_price);
        }
        // Pas "rond" : range 22 / 5 = 4.4 -> snap 5
        assert!((ticks[1] - ticks[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_tick_density() {
        const HOUR: i64 = 3_600_000;
        // Sous 2h : demi-heures
        assert_eq!(time_tick_step_ms(HOUR), 30 * 60 * 1000);
        // Sous 6h : heures
        assert_eq!(time_tick_step_ms(3 * HOUR), HOUR);
        // Sinon : toutes les 4 heures
        assert_eq!(time_tick_step_ms(12 * HOUR), 4 * HOUR);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(12_345.0), "$12.3k");
        assert_eq!(format_price(10_000.0), "$10.0k");
        assert_eq!(format_price(9_999.4), "$9,999");
        assert_eq!(format_price(1_234.0), "$1,234");
        assert_eq!(format_price(42.6), "$43");
    }

    #[test]
    fn test_format_tick_time() {
        // 1970-01-01 01:30:00 UTC
        assert_eq!(format_tick_time(90 * 60 * 1000), "01:30");
        assert_eq!(format_tooltip_time(90 * 60 * 1000 + 5_000), "01:30:05");
    }
}
