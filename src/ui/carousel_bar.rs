// ============================================================================
// Carousel bar - Barre de navigation par jour
// ============================================================================
// Affiche l'état dérivé du carousel : jour affiché, statut live/historique,
// flèches de navigation (grisées aux bords), et la bande d'indicateurs
// (un point par jour, le jour courant surligné, cliquable)
//
// CONCEPT : UI dérivée
// - Tout vient de CarouselUi, recalculé par le contrôleur ; cette couche
//   ne possède aucun état
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::carousel::CarouselUi;

/// Hauteur du panneau (2 lignes de contenu + bordures)
pub const BAR_HEIGHT: u16 = 4;

/// Colonne (relative à l'intérieur) du premier indicateur
const DOTS_START_COLUMN: u16 = 1;
/// Espacement entre indicateurs (en cellules)
const DOTS_SPACING: u16 = 2;

/// Dessine la barre du carousel
pub fn render_bar(frame: &mut Frame, ui: &CarouselUi, connection_lost: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" lazychart ");

    // Ligne 1 : navigation + jour + statut
    let prev_style = if ui.prev_enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let next_style = if ui.next_enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let status_color = if connection_lost {
        Color::Red
    } else if ui.status_label == "LIVE" {
        Color::Green
    } else {
        Color::Yellow
    };

    let header = Line::from(vec![
        Span::styled(" ◀ ", prev_style),
        Span::styled(
            ui.day_label.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▶ ", next_style),
        Span::raw("  "),
        Span::styled(
            format!("● {}", ui.status_label),
            Style::default().fg(status_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   [←/→] days  [r] refresh  [q] quit"),
    ]);

    // Ligne 2 : un indicateur par jour, le courant surligné
    let mut dots: Vec<Span> = vec![Span::raw(" ")];
    for i in 0..ui.day_count {
        let dot = if i == ui.current_index {
            Span::styled("●", Style::default().fg(Color::Cyan))
        } else {
            Span::styled("○", Style::default().fg(Color::DarkGray))
        };
        dots.push(dot);
        dots.push(Span::raw(" "));
    }

    let paragraph = Paragraph::new(vec![header, Line::from(dots)])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

/// Indice de l'indicateur sous un clic souris, s'il y en a un
///
/// Le layout des points est déterministe (colonne de départ + espacement) :
/// on inverse la position du clic vers un index, puis l'appelant navigue
pub fn dot_index_at(ui: &CarouselUi, area: Rect, column: u16, row: u16) -> Option<usize> {
    // Les indicateurs sont sur la deuxième ligne intérieure
    let dots_row = area.y.checked_add(2)?;
    if row != dots_row {
        return None;
    }

    let start = area.x.checked_add(1)?.checked_add(DOTS_START_COLUMN)?;
    if column < start {
        return None;
    }

    let offset = column - start;
    if offset % DOTS_SPACING != 0 {
        // Entre deux points
        return None;
    }

    let index = (offset / DOTS_SPACING) as usize;
    if index < ui.day_count {
        Some(index)
    } else {
        None
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ui() -> CarouselUi {
        CarouselUi {
            day_label: String::from("Fri 15 Mar"),
            status_label: "LIVE",
            prev_enabled: true,
            next_enabled: false,
            day_count: 3,
            current_index: 2,
        }
    }

    #[test]
    fn test_dot_index_at_hits() {
        let ui = sample_ui();
        let area = Rect::new(0, 0, 40, BAR_HEIGHT);

        // Points en colonnes 2, 4, 6 sur la ligne 2
        assert_eq!(dot_index_at(&ui, area, 2, 2), Some(0));
        assert_eq!(dot_index_at(&ui, area, 4, 2), Some(1));
        assert_eq!(dot_index_at(&ui, area, 6, 2), Some(2));
    }

    #[test]
    fn test_dot_index_at_misses() {
        let ui = sample_ui();
        let area = Rect::new(0, 0, 40, BAR_HEIGHT);

        // Mauvaise ligne
        assert_eq!(dot_index_at(&ui, area, 2, 1), None);
        // Entre deux points
        assert_eq!(dot_index_at(&ui, area, 3, 2), None);
        // Au-delà du dernier point
        assert_eq!(dot_index_at(&ui, area, 8, 2), None);
        // Avant le premier
        assert_eq!(dot_index_at(&ui, area, 0, 2), None);
    }
}
