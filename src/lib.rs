// ============================================================================
// LazyChart - Library
// ============================================================================
// Expose les modules publics pour les tests et le binaire
// ============================================================================

pub mod api;      // Source de données (trait + client HTTP + wire)
pub mod app;      // État global de l'application
pub mod carousel; // Contrôleur de navigation par jour
pub mod chart;    // Géométrie et scène du graphique
pub mod config;   // Réglages (URL, cadences)
pub mod models;   // Structures de données
pub mod ui;       // Interface utilisateur (ratatui)
