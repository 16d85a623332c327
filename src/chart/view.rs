// ============================================================================
// ChartView : le composant graphique
// ============================================================================
// Possède la surface de dessin (en pixels), la série courante et les trades ;
// projette le domaine (prix, temps) vers l'espace pixel et inversement ;
// construit la scène par couches ; répond aux hit-tests pour le tooltip
//
// Aucune connaissance de la provenance des données ni de la navigation :
// le contrat d'entrée est set_data, point final
//
// CONCEPTS RUST :
// 1. Configuration injectée au constructeur (marges, dimensions, rayons)
//    plutôt que de l'état global : tout est testable sans terminal
// 2. Reconstruction atomique : la scène est rebâtie entière puis remplacée,
//    jamais d'état de frame partiel observable
// ============================================================================

use crate::chart::scale::{
    format_price, format_tick_time, format_tooltip_time, price_ticks, time_ticks, Bounds,
    LinearScale, PlotRect,
};
use crate::chart::scene::{
    ClipRect, FillKind, GridLine, Layer, Point, Scene, TimeTick, TradeMarker, Tendency,
};
use crate::models::{PricePoint, Trade, TradeSide};

/// Configuration du graphique, injectée au constructeur
#[derive(Debug, Clone, Copy)]
pub struct ChartConfig {
    /// Marge haute en pixels (au-dessus du tracé)
    pub padding_top: f64,
    /// Marge droite en pixels (labels de prix + tag)
    pub padding_right: f64,
    /// Marge basse en pixels (labels d'heures)
    pub padding_bottom: f64,
    /// Marge gauche en pixels
    pub padding_left: f64,
    /// Nombre cible de graduations de prix
    pub price_tick_target: usize,
    /// Rayon de détection des trades pour le tooltip (pixels écran)
    pub trade_hit_radius: f64,
    /// Épaisseur du trait de la courbe
    pub line_width: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            padding_top: 4.0,
            padding_right: 16.0,
            padding_bottom: 8.0,
            padding_left: 2.0,
            price_tick_target: 5,
            trade_hit_radius: 15.0,
            line_width: 2.0,
        }
    }
}

/// Trade attaché à un tooltip (side + montant, affichage uniquement)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipTrade {
    pub side: TradeSide,
    pub value: f64,
}

/// Payload du tooltip produit par un hit-test réussi
///
/// Toujours prix + heure formatée ; le trade est ajouté seulement si un
/// marqueur est à portée du pointeur
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Point de la série le plus proche du pointeur (position écran)
    pub at: Point,
    /// Prix du point, formaté pour l'affichage
    pub price_label: String,
    /// Heure du point, formatée pour l'affichage
    pub time_label: String,
    /// Trade à portée du pointeur, s'il y en a un
    pub trade: Option<TooltipTrade>,
}

/// Le composant graphique : série + projection + scène + hit-testing
pub struct ChartView {
    config: ChartConfig,
    width_px: f64,
    height_px: f64,

    prices: Vec<PricePoint>,
    trades: Vec<Trade>,

    /// Bornes dérivées de la série courante (None si série vide)
    bounds: Option<Bounds>,
    /// Prix du premier point de la série courante (None si série vide)
    /// Définit la séparation vert/rouge et la couleur du tag de prix
    baseline: Option<f64>,

    scene: Scene,
    tooltip: Option<Tooltip>,
}

impl ChartView {
    /// Crée une vue avec ses dimensions initiales en pixels
    pub fn new(config: ChartConfig, width_px: f64, height_px: f64) -> Self {
        Self {
            config,
            width_px,
            height_px,
            prices: Vec::new(),
            trades: Vec::new(),
            bounds: None,
            baseline: None,
            scene: Scene::Empty,
            tooltip: None,
        }
    }

    /// Remplace la série affichée, recalcule bornes et baseline, reconstruit
    /// la scène entière
    ///
    /// Une série vide produit l'état "no data" (placeholder explicite),
    /// quel que soit le contenu des trades — ce n'est pas une erreur
    pub fn set_data(&mut self, prices: Vec<PricePoint>, trades: Vec<Trade>) {
        self.bounds = Bounds::from_points(&prices);
        self.baseline = prices.first().map(|p| p.price);
        self.prices = prices;
        self.trades = trades;

        // Un set_data invalide le tooltip : l'ancien point n'existe plus
        self.tooltip = None;

        self.rebuild_scene();
    }

    /// Recalcule les dimensions de la surface et re-rend avec les données
    /// existantes
    ///
    /// Synchrone et idempotent : deux resize identiques produisent la même
    /// scène
    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        self.width_px = width_px;
        self.height_px = height_px;
        self.rebuild_scene();
    }

    /// La scène courante, à rasteriser par la couche de présentation
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Le tooltip courant (None si le pointeur est sorti ou loin de tout)
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Dimensions de la surface en pixels
    pub fn surface_size(&self) -> (f64, f64) {
        (self.width_px, self.height_px)
    }

    /// Rectangle intérieur du tracé (surface moins les marges)
    pub fn plot_rect(&self) -> PlotRect {
        PlotRect {
            left: self.config.padding_left,
            top: self.config.padding_top,
            width: (self.width_px - self.config.padding_left - self.config.padding_right)
                .max(1.0),
            height: (self.height_px - self.config.padding_top - self.config.padding_bottom)
                .max(1.0),
        }
    }

    /// La projection courante (None si pas de données)
    fn scale(&self) -> Option<LinearScale> {
        self.bounds.map(|b| LinearScale::new(self.plot_rect(), b))
    }

    // ========================================================================
    // Hit-testing pour le tooltip
    // ========================================================================

    /// Hit-test du pointeur contre la série et les marqueurs de trades
    ///
    /// Hors du rectangle de tracé : efface le tooltip. Sinon : inverse
    /// l'abscisse vers un timestamp, scan linéaire du point le plus proche
    /// en temps (égalité -> premier trouvé), puis recherche indépendante du
    /// premier trade à portée en distance écran. Aucun effet sur les données
    pub fn pointer_move(&mut self, px: f64, py: f64) -> Option<&Tooltip> {
        let scale = match self.scale() {
            Some(s) => s,
            None => {
                self.tooltip = None;
                return None;
            }
        };

        if !scale.plot.contains(px, py) {
            self.tooltip = None;
            return None;
        }

        let nearest = match self.nearest_point(&scale, px) {
            Some(p) => p,
            None => {
                self.tooltip = None;
                return None;
            }
        };

        let trade = self.trade_near(&scale, px, py);

        self.tooltip = Some(Tooltip {
            at: Point::new(scale.time_to_x(nearest.timestamp), scale.price_to_y(nearest.price)),
            price_label: format_price(nearest.price),
            time_label: format_tooltip_time(nearest.timestamp),
            trade,
        });
        self.tooltip.as_ref()
    }

    /// Le pointeur a quitté la surface : efface le tooltip
    pub fn pointer_leave(&mut self) {
        self.tooltip = None;
    }

    /// Point de la série au temps le plus proche de l'abscisse du pointeur
    ///
    /// Scan linéaire : les séries sont petites (une journée), pas besoin de
    /// recherche binaire. Le `<` strict garde le premier en cas d'égalité
    fn nearest_point(&self, scale: &LinearScale, px: f64) -> Option<PricePoint> {
        let target = scale.x_to_time(px);

        let mut best: Option<PricePoint> = None;
        let mut best_dist = f64::MAX;

        for point in &self.prices {
            let dist = (point.timestamp as f64 - target).abs();
            if dist < best_dist {
                best_dist = dist;
                best = Some(*point);
            }
        }

        best
    }

    /// Premier trade à portée du pointeur en distance écran (euclidienne)
    fn trade_near(&self, scale: &LinearScale, px: f64, py: f64) -> Option<TooltipTrade> {
        let radius = self.config.trade_hit_radius;

        for trade in &self.trades {
            let tx = scale.time_to_x(trade.timestamp);
            let ty = scale.price_to_y(trade.price);
            let dist = ((px - tx).powi(2) + (py - ty).powi(2)).sqrt();

            if dist <= radius {
                return Some(TooltipTrade {
                    side: trade.side,
                    value: trade.value,
                });
            }
        }

        None
    }

    // ========================================================================
    // Construction de la scène
    // ========================================================================

    /// Reconstruit la scène entière depuis la série courante
    ///
    /// La scène est construite dans une variable locale puis affectée d'un
    /// coup : le rendu ne voit jamais d'état intermédiaire
    fn rebuild_scene(&mut self) {
        let scale = match self.scale() {
            Some(s) => s,
            None => {
                self.scene = Scene::Empty;
                return;
            }
        };

        // baseline est Some dès que bounds l'est (même condition : série non vide)
        let baseline = match self.baseline {
            Some(b) => b,
            None => {
                self.scene = Scene::Empty;
                return;
            }
        };
        let baseline_y = scale.price_to_y(baseline);

        let mut layers = Vec::with_capacity(8);

        // 1. Grille de prix aux pas "ronds"
        layers.push(Layer::Grid(
            price_ticks(&scale.bounds, self.config.price_tick_target)
                .into_iter()
                .map(|price| GridLine {
                    y: scale.price_to_y(price),
                    label: format_price(price),
                })
                .collect(),
        ));

        // 2. Baseline en pointillés au prix du premier point
        layers.push(Layer::Baseline {
            y: baseline_y,
            price: baseline,
        });

        // 3. + 4. Remplissage vert/rouge entre baseline et courbe
        // Deux zones clippées indépendamment, pas un seul dégradé :
        // un croisement raide de la baseline ne bave pas de l'autre côté
        let curve: Vec<Point> = self
            .prices
            .iter()
            .map(|p| Point::new(scale.time_to_x(p.timestamp), scale.price_to_y(p.price)))
            .collect();

        let polygon = fill_polygon(&curve, baseline_y);
        layers.push(Layer::Fill {
            kind: FillKind::AboveBaseline,
            polygon: polygon.clone(),
            clip: ClipRect {
                top: scale.plot.top,
                bottom: baseline_y,
            },
        });
        layers.push(Layer::Fill {
            kind: FillKind::BelowBaseline,
            polygon,
            clip: ClipRect {
                top: baseline_y,
                bottom: scale.plot.bottom(),
            },
        });

        // 5. La courbe de prix (au-dessus des remplissages)
        layers.push(Layer::PriceLine {
            points: curve,
            width: self.config.line_width,
        });

        // 6. Axe du temps, densité adaptée à l'étendue affichée
        layers.push(Layer::TimeAxis(
            time_ticks(&scale.bounds)
                .into_iter()
                .map(|t| TimeTick {
                    x: scale.time_to_x(t),
                    label: format_tick_time(t),
                })
                .collect(),
        ));

        // 7. Marqueurs de trades
        layers.push(Layer::Trades(
            self.trades
                .iter()
                .map(|t| TradeMarker {
                    at: Point::new(scale.time_to_x(t.timestamp), scale.price_to_y(t.price)),
                    side: t.side,
                })
                .collect(),
        ));

        // 8. Tag du prix courant au bord droit, vert/rouge selon la baseline
        if let Some(last) = self.prices.last() {
            let tendency = if last.price >= baseline {
                Tendency::Up
            } else {
                Tendency::Down
            };
            layers.push(Layer::PriceTag {
                y: scale.price_to_y(last.price),
                label: format_price(last.price),
                tendency,
            });
        }

        self.scene = Scene::Chart { layers };
    }
}

/// Construit le polygone de remplissage : la courbe puis le retour le long
/// de la baseline (dernier x -> premier x)
fn fill_polygon(curve: &[Point], baseline_y: f64) -> Vec<Point> {
    let mut polygon = curve.to_vec();
    if let (Some(first), Some(last)) = (curve.first(), curve.last()) {
        polygon.push(Point::new(last.x, baseline_y));
        polygon.push(Point::new(first.x, baseline_y));
    }
    polygon
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trade;

    fn view_with(prices: Vec<PricePoint>, trades: Vec<Trade>) -> ChartView {
        let config = ChartConfig {
            padding_top: 0.0,
            padding_right: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            ..ChartConfig::default()
        };
        let mut view = ChartView::new(config, 200.0, 100.0);
        view.set_data(prices, trades);
        view
    }

    fn rising_series() -> Vec<PricePoint> {
        vec![
            PricePoint::new(0, 100.0),
            PricePoint::new(50_000, 105.0),
            PricePoint::new(100_000, 110.0),
        ]
    }

    #[test]
    fn test_empty_data_renders_placeholder() {
        // Série vide : état "no data", jamais de panic, même avec des trades
        let view = view_with(
            Vec::new(),
            vec![Trade::new(1_000, 100.0, TradeSide::Buy, 10.0)],
        );
        assert!(view.scene().is_empty());
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn test_layer_order() {
        let view = view_with(rising_series(), Vec::new());
        let layers = view.scene().layers();

        // Grille en premier, tag de prix en dernier (toujours visible)
        assert!(matches!(layers.first(), Some(Layer::Grid(_))));
        assert!(matches!(layers.last(), Some(Layer::PriceTag { .. })));

        // Les deux zones de remplissage sont présentes et clippées
        let fills: Vec<_> = layers
            .iter()
            .filter(|l| matches!(l, Layer::Fill { .. }))
            .collect();
        assert_eq!(fills.len(), 2);
    }

    #[test]
    fn test_rising_series_tags_up() {
        // Baseline 100, dernier prix 110 : tag "up" (vert)
        let view = view_with(rising_series(), Vec::new());
        let tag = view
            .scene()
            .layers()
            .iter()
            .find_map(|l| match l {
                Layer::PriceTag { tendency, .. } => Some(*tendency),
                _ => None,
            })
            .unwrap();
        assert_eq!(tag, Tendency::Up);
    }

    #[test]
    fn test_falling_series_tags_down() {
        let view = view_with(
            vec![PricePoint::new(0, 110.0), PricePoint::new(100, 100.0)],
            Vec::new(),
        );
        let tag = view
            .scene()
            .layers()
            .iter()
            .find_map(|l| match l {
                Layer::PriceTag { tendency, .. } => Some(*tendency),
                _ => None,
            })
            .unwrap();
        assert_eq!(tag, Tendency::Down);
    }

    #[test]
    fn test_pointer_on_exact_point() {
        let mut view = view_with(rising_series(), Vec::new());

        // Position écran exacte du point du milieu
        let scale = view.scale().unwrap();
        let px = scale.time_to_x(50_000);
        let py = scale.price_to_y(105.0);

        let tooltip = view.pointer_move(px, py).unwrap();
        assert!((tooltip.at.x - px).abs() < 1e-9);
        assert!((tooltip.at.y - py).abs() < 1e-9);
        assert_eq!(tooltip.price_label, format_price(105.0));
        assert!(tooltip.trade.is_none());
    }

    #[test]
    fn test_pointer_outside_plot_clears_tooltip() {
        let mut view = view_with(rising_series(), Vec::new());

        let scale = view.scale().unwrap();
        assert!(view
            .pointer_move(scale.time_to_x(50_000), scale.price_to_y(105.0))
            .is_some());

        // Hors du rectangle : tooltip effacé
        assert!(view.pointer_move(-10.0, -10.0).is_none());
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn test_trade_within_radius_attached() {
        let trades = vec![Trade::new(50_000, 105.0, TradeSide::Sell, 250.0)];
        let mut view = view_with(rising_series(), trades);

        let scale = view.scale().unwrap();
        let tx = scale.time_to_x(50_000);
        let ty = scale.price_to_y(105.0);

        // Pile sur le marqueur : trade attaché
        let tooltip = view.pointer_move(tx, ty).unwrap();
        let trade = tooltip.trade.unwrap();
        assert_eq!(trade.side, TradeSide::Sell);
        assert!((trade.value - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_trade_beyond_radius_ignored() {
        // Rayon de détection 15px : un pointeur à 20px ne matche pas
        let trades = vec![Trade::new(50_000, 105.0, TradeSide::Buy, 250.0)];
        let mut view = view_with(rising_series(), trades);

        let scale = view.scale().unwrap();
        let tx = scale.time_to_x(50_000);
        let ty = scale.price_to_y(105.0);

        let tooltip = view.pointer_move(tx + 20.0, ty).unwrap();
        assert!(tooltip.trade.is_none());
    }

    #[test]
    fn test_pointer_leave_clears_tooltip() {
        let mut view = view_with(rising_series(), Vec::new());
        let scale = view.scale().unwrap();
        view.pointer_move(scale.time_to_x(0), scale.price_to_y(100.0));
        assert!(view.tooltip().is_some());

        view.pointer_leave();
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn test_resize_rebuilds_with_existing_data() {
        let mut view = view_with(rising_series(), Vec::new());
        view.resize(400.0, 200.0);

        assert_eq!(view.surface_size(), (400.0, 200.0));
        assert!(!view.scene().is_empty());

        // Idempotent : deux resize identiques, même scène
        let first = view.scene().clone();
        view.resize(400.0, 200.0);
        assert_eq!(&first, view.scene());
    }

    #[test]
    fn test_set_data_invalidates_tooltip() {
        let mut view = view_with(rising_series(), Vec::new());
        let scale = view.scale().unwrap();
        view.pointer_move(scale.time_to_x(0), scale.price_to_y(100.0));
        assert!(view.tooltip().is_some());

        // Nouvelle série : l'ancien point n'existe plus
        view.set_data(rising_series(), Vec::new());
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn test_flat_series_still_renders() {
        // Tous les prix égaux : pas de division par zéro, scène complète
        let view = view_with(
            vec![PricePoint::new(0, 50.0), PricePoint::new(1_000, 50.0)],
            Vec::new(),
        );
        assert!(!view.scene().is_empty());
    }
}
