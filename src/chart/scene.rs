// ============================================================================
// Scene : primitives de dessin du graphique
// ============================================================================
// La sortie de ChartView : une liste ordonnée de couches à dessiner,
// entièrement en coordonnées pixel, sans aucune référence au terminal
//
// CONCEPT : Séparation géométrie / présentation
// - ChartView produit une Scene ; src/ui/chart.rs la rasterise en ratatui
// - Permet de tester le rendu (couches, couleurs, positions) sans surface
//
// CONCEPT RUST : Enums avec données
// - Chaque couche porte exactement les données dont elle a besoin
// - L'ordre du Vec<Layer> est l'ordre de dessin (les dernières au-dessus)
// ============================================================================

use crate::models::TradeSide;

/// Point en coordonnées pixel de la surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle de clipping en pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub top: f64,
    pub bottom: f64,
}

/// Sens d'une zone de remplissage par rapport à la baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    /// Au-dessus de la baseline (vert)
    AboveBaseline,
    /// En-dessous de la baseline (rouge)
    BelowBaseline,
}

/// Tendance du prix courant par rapport à la baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tendency {
    /// Dernier prix >= baseline (tag vert)
    Up,
    /// Dernier prix < baseline (tag rouge)
    Down,
}

/// Une ligne de grille horizontale avec son label de prix
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub y: f64,
    pub label: String,
}

/// Une graduation de l'axe X avec son label d'heure
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    pub x: f64,
    pub label: String,
}

/// Marqueur de trade : halo + anneau coloré par side + point central
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeMarker {
    pub at: Point,
    pub side: TradeSide,
}

/// Une couche du graphique
///
/// L'ordre de rendu est celui du Vec dans Scene : grille en premier,
/// tag de prix courant en dernier (toujours visible)
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// Lignes de grille horizontales aux pas de prix "ronds"
    Grid(Vec<GridLine>),

    /// Baseline en pointillés au prix du premier point
    Baseline { y: f64, price: f64 },

    /// Zone remplie entre la baseline et la courbe, clippée d'un seul côté
    ///
    /// Deux couches indépendantes (Above puis Below) plutôt qu'un seul
    /// dégradé : pas de débordement de couleur aux croisements raides
    Fill {
        kind: FillKind,
        /// Polygone : courbe de prix puis retour le long de la baseline
        polygon: Vec<Point>,
        clip: ClipRect,
    },

    /// La courbe de prix elle-même (trait 2px, jointures arrondies)
    PriceLine { points: Vec<Point>, width: f64 },

    /// Graduations de l'axe X (heures)
    TimeAxis(Vec<TimeTick>),

    /// Marqueurs de trades par-dessus la courbe
    Trades(Vec<TradeMarker>),

    /// Tag du prix courant, épinglé au bord droit à la hauteur du dernier prix
    PriceTag {
        y: f64,
        label: String,
        tendency: Tendency,
    },
}

/// Scène complète produite par un set_data / resize
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    /// État "pas de données" : placeholder explicite, ni axes ni courbe
    /// C'est un état de rendu terminal à part entière, pas une erreur
    Empty,

    /// Graphique complet, couches dans l'ordre de dessin
    Chart { layers: Vec<Layer> },
}

impl Scene {
    /// Vérifie si la scène est l'état vide
    pub fn is_empty(&self) -> bool {
        matches!(self, Scene::Empty)
    }

    /// Accès aux couches (vide pour l'état Empty)
    pub fn layers(&self) -> &[Layer] {
        match self {
            Scene::Empty => &[],
            Scene::Chart { layers } => layers,
        }
    }
}
