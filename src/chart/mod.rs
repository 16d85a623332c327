// ============================================================================
// Module : chart
// ============================================================================
// Le pipeline de rendu du graphique, découpé en trois couches :
// - scale : géométrie pure (bornes, projections, ticks, formatage)
// - scene : primitives de dessin produites par la vue
// - view  : ChartView (set_data / resize / hit-testing / construction scène)
//
// Tout ce module est indépendant du terminal : la rasterisation vit dans ui/
// ============================================================================

pub mod scale; // Projection linéaire données <-> pixels
pub mod scene; // Primitives de dessin par couches
pub mod view;  // Le composant ChartView

// Re-exports pour simplifier les imports
pub use scale::{Bounds, LinearScale, PlotRect};
pub use scene::{Layer, Scene, Tendency};
pub use view::{ChartConfig, ChartView, Tooltip};
