// ============================================================================
// Module : ui
// ============================================================================
// La couche de présentation : tout ce qui connaît ratatui/crossterm.
// La géométrie du graphique (projections, scène, hit-testing) vit dans
// chart/ et n'importe jamais rien d'ici
// ============================================================================

pub mod carousel_bar; // Barre de navigation par jour (statut + indicateurs)
pub mod chart;        // Rasterisation de la scène sur un canvas braille
pub mod events;       // Gestion des événements clavier/souris

pub use events::{Event, EventHandler};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::App;
use crate::carousel::Status;
use crate::ui::chart::ChartPalette;

/// Découpe l'écran : barre du carousel en haut, graphique en dessous
pub fn layout(frame_area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(carousel_bar::BAR_HEIGHT), // Barre carousel
            Constraint::Min(0),                           // Graphique
        ])
        .split(frame_area);
    (chunks[0], chunks[1])
}

/// Dessine l'écran entier depuis l'état de l'application
pub fn render(frame: &mut Frame, app: &App) {
    let (bar_area, chart_area) = layout(frame.size());

    let ui = app.carousel.ui_state();
    let connection_lost = app.carousel.status() == Status::Waiting;
    carousel_bar::render_bar(frame, &ui, connection_lost, bar_area);

    let palette = ChartPalette::default();
    let title = if app.is_awaiting_quit_confirmation() {
        String::from("press q again to quit")
    } else {
        ui.day_label.clone()
    };

    chart::render_chart(
        frame,
        app.carousel.chart().scene(),
        app.carousel.chart().tooltip(),
        &palette,
        &title,
        chart_area,
    );
}
