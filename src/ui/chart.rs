// ============================================================================
// Chart - Rasterisation de la scène dans le terminal
// ============================================================================
// Traduit la Scene produite par ChartView (primitives en pixels) en dessin
// ratatui sur un canvas braille. C'est la SEULE couche qui connaît ratatui :
// la géométrie vit dans chart/, jamais ici
//
// CONCEPTS RATATUI :
// 1. Canvas widget : dessin libre (lignes, cercles, points) en coordonnées
//    flottantes, rasterisé en points braille (2x4 points par cellule)
// 2. ctx.layer() : commence une nouvelle couche, dessinée par-dessus
// 3. ctx.print() : place du texte aux coordonnées du canvas
//
// CONCEPT : Espace pixel
// - La scène a y croissant vers le BAS (convention écran) ; le canvas
//   ratatui a y croissant vers le HAUT : on inverse à la frontière
// - La densité braille (2x4 points par cellule) joue le rôle du device
//   pixel ratio de la surface
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::chart::scene::{FillKind, Layer, Point, Scene, TradeMarker};
use crate::chart::{Tendency, Tooltip};
use crate::models::TradeSide;

/// Points braille par cellule en largeur
pub const DOTS_PER_CELL_X: f64 = 2.0;
/// Points braille par cellule en hauteur
pub const DOTS_PER_CELL_Y: f64 = 4.0;

/// Palette du graphique (présentation uniquement)
#[derive(Debug, Clone, Copy)]
pub struct ChartPalette {
    /// Courbe et zone au-dessus de la baseline
    pub up: Color,
    /// Zone sous la baseline, tag en baisse
    pub down: Color,
    /// Lignes de grille et labels d'axes
    pub grid: Color,
    /// Baseline en pointillés
    pub baseline: Color,
    /// La courbe de prix
    pub line: Color,
    /// Halo des marqueurs de trades
    pub halo: Color,
    /// Anneau des achats
    pub buy: Color,
    /// Anneau des ventes
    pub sell: Color,
    /// Texte du tooltip
    pub tooltip: Color,
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self {
            up: Color::Green,
            down: Color::Red,
            grid: Color::DarkGray,
            baseline: Color::Gray,
            line: Color::Cyan,
            halo: Color::DarkGray,
            buy: Color::Green,
            sell: Color::Magenta,
            tooltip: Color::Yellow,
        }
    }
}

// ============================================================================
// Mapping cellules terminal <-> pixels de la surface
// ============================================================================

/// Rectangle intérieur d'une zone bordée (le canvas vit dedans)
fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Dimensions de la surface en pixels pour une zone de panneau donnée
pub fn surface_size(area: Rect) -> (f64, f64) {
    let plot = inner(area);
    (
        plot.width as f64 * DOTS_PER_CELL_X,
        plot.height as f64 * DOTS_PER_CELL_Y,
    )
}

/// Convertit une position souris (cellules) en pixels de la surface
///
/// None si la souris est hors du panneau : l'appelant efface le tooltip
pub fn pixel_at(area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    let plot = inner(area);
    if column < plot.x
        || column >= plot.x + plot.width
        || row < plot.y
        || row >= plot.y + plot.height
    {
        return None;
    }

    // Centre de la cellule visée, en points braille
    Some((
        ((column - plot.x) as f64 + 0.5) * DOTS_PER_CELL_X,
        ((row - plot.y) as f64 + 0.5) * DOTS_PER_CELL_Y,
    ))
}

// ============================================================================
// Rendu du panneau graphique
// ============================================================================

/// Dessine le panneau graphique : la scène, puis le tooltip par-dessus
pub fn render_chart(
    frame: &mut Frame,
    scene: &Scene,
    tooltip: Option<&Tooltip>,
    palette: &ChartPalette,
    title: &str,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", title));

    // État "no data" : placeholder explicite, ni axes ni courbe
    if scene.is_empty() {
        render_no_data(frame, block, area);
        return;
    }

    let (width, height) = surface_size(area);

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for layer in scene.layers() {
                paint_layer(ctx, layer, palette, width, height);
                ctx.layer();
            }
            if let Some(tip) = tooltip {
                paint_tooltip(ctx, tip, palette, width, height);
            }
        });

    frame.render_widget(canvas, area);
}

/// Placeholder quand il n'y a aucune donnée à afficher
///
/// C'est un état de rendu normal (journée sans activité), pas une erreur
fn render_no_data(frame: &mut Frame, block: Block, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No data for this day",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[r] retry  [←/→] other days",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Peinture des couches
// ============================================================================

/// Inverse l'ordonnée : scène (y vers le bas) -> canvas (y vers le haut)
fn flip(y: f64, height: f64) -> f64 {
    height - y
}

/// Dessine une couche de la scène
fn paint_layer(ctx: &mut Context, layer: &Layer, palette: &ChartPalette, width: f64, height: f64) {
    match layer {
        Layer::Grid(lines) => {
            for line in lines {
                let y = flip(line.y, height);
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: y,
                    x2: width,
                    y2: y,
                    color: palette.grid,
                });
                // Label de prix au bord droit, sur la ligne
                ctx.print(
                    (width - 12.0).max(0.0),
                    y,
                    Line::styled(line.label.clone(), Style::default().fg(palette.grid)),
                );
            }
        }

        Layer::Baseline { y, .. } => {
            // Pointillés : segments de 4px espacés de 4px
            let y = flip(*y, height);
            let mut x = 0.0;
            while x < width {
                ctx.draw(&CanvasLine {
                    x1: x,
                    y1: y,
                    x2: (x + 4.0).min(width),
                    y2: y,
                    color: palette.baseline,
                });
                x += 8.0;
            }
        }

        Layer::Fill { kind, polygon, clip } => {
            // Rasterisation par colonnes : pour chaque x entier, remplit
            // la verticale entre la baseline et la courbe, bornée au clip.
            // Le polygone se termine par les deux points de retour baseline
            if polygon.len() < 3 {
                return;
            }
            let curve = &polygon[..polygon.len() - 2];
            let baseline_y = polygon[polygon.len() - 1].y;
            let color = match kind {
                FillKind::AboveBaseline => palette.up,
                FillKind::BelowBaseline => palette.down,
            };

            for segment in curve.windows(2) {
                paint_fill_segment(ctx, &segment[0], &segment[1], baseline_y, clip.top, clip.bottom, color, height);
            }
        }

        Layer::PriceLine { points, width: stroke } => {
            // Trait "2px" : la polyligne dessinée deux fois, décalée d'un
            // point braille vertical
            for offset in 0..(stroke.round().max(1.0) as usize) {
                let dy = offset as f64;
                for segment in points.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: segment[0].x,
                        y1: flip(segment[0].y + dy, height),
                        x2: segment[1].x,
                        y2: flip(segment[1].y + dy, height),
                        color: palette.line,
                    });
                }
            }
        }

        Layer::TimeAxis(ticks) => {
            for tick in ticks {
                // Petite marque verticale en bas + label d'heure
                ctx.draw(&CanvasLine {
                    x1: tick.x,
                    y1: 0.0,
                    x2: tick.x,
                    y2: 2.0,
                    color: palette.grid,
                });
                ctx.print(
                    (tick.x - 5.0).max(0.0),
                    1.0,
                    Line::styled(tick.label.clone(), Style::default().fg(palette.grid)),
                );
            }
        }

        Layer::Trades(markers) => {
            for marker in markers {
                paint_trade_marker(ctx, marker, palette, height);
            }
        }

        Layer::PriceTag { y, label, tendency } => {
            let color = match tendency {
                Tendency::Up => palette.up,
                Tendency::Down => palette.down,
            };
            ctx.print(
                (width - 12.0).max(0.0),
                flip(*y, height),
                Line::styled(format!("▶{}", label), Style::default().fg(color)),
            );
        }
    }
}

/// Remplit les colonnes d'un segment de courbe entre baseline et courbe
#[allow(clippy::too_many_arguments)]
fn paint_fill_segment(
    ctx: &mut Context,
    a: &Point,
    b: &Point,
    baseline_y: f64,
    clip_top: f64,
    clip_bottom: f64,
    color: Color,
    height: f64,
) {
    let (left, right) = if a.x <= b.x { (a, b) } else { (b, a) };
    let span = (right.x - left.x).max(f64::EPSILON);

    let mut x = left.x.ceil();
    while x <= right.x {
        // Interpolation linéaire de la courbe à cette colonne
        let t = (x - left.x) / span;
        let curve_y = left.y + (right.y - left.y) * t;

        // Verticale [courbe, baseline], clampée à la zone de clip
        let y0 = curve_y.min(baseline_y).max(clip_top);
        let y1 = curve_y.max(baseline_y).min(clip_bottom);

        if y0 < y1 {
            ctx.draw(&CanvasLine {
                x1: x,
                y1: flip(y0, height),
                x2: x,
                y2: flip(y1, height),
                color,
            });
        }
        x += 1.0;
    }
}

/// Dessine un marqueur de trade : halo + anneau coloré par side + point
fn paint_trade_marker(ctx: &mut Context, marker: &TradeMarker, palette: &ChartPalette, height: f64) {
    let x = marker.at.x;
    let y = flip(marker.at.y, height);

    // Halo extérieur (glow)
    ctx.draw(&Circle {
        x,
        y,
        radius: 6.0,
        color: palette.halo,
    });

    // Anneau coloré par side
    let ring = match marker.side {
        TradeSide::Buy => palette.buy,
        TradeSide::Sell => palette.sell,
    };
    ctx.draw(&Circle {
        x,
        y,
        radius: 3.0,
        color: ring,
    });

    // Point central
    ctx.draw(&Points {
        coords: &[(x, y)],
        color: Color::White,
    });
}

/// Dessine le tooltip : point surligné + texte à côté
fn paint_tooltip(ctx: &mut Context, tip: &Tooltip, palette: &ChartPalette, width: f64, height: f64) {
    let x = tip.at.x;
    let y = flip(tip.at.y, height);

    // Point de la série surligné
    ctx.draw(&Circle {
        x,
        y,
        radius: 2.0,
        color: palette.tooltip,
    });

    // Toujours prix + heure ; side et montant ajoutés si un trade a matché
    let mut text = format!("{} @ {}", tip.price_label, tip.time_label);
    if let Some(trade) = &tip.trade {
        text.push_str(&format!("  {} {}", trade.side.label(), crate::chart::scale::format_price(trade.value)));
    }

    // À droite du point, rabattu à gauche près du bord
    let text_width = text.chars().count() as f64 * DOTS_PER_CELL_X;
    let tx = if x + 4.0 + text_width > width {
        (x - 4.0 - text_width).max(0.0)
    } else {
        x + 4.0
    };

    ctx.print(
        tx,
        (y + 4.0).min(height),
        Line::styled(text, Style::default().fg(palette.tooltip)),
    );
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_uses_braille_density() {
        let area = Rect::new(0, 0, 42, 12);
        // Bordures : 40x10 cellules intérieures, 2x4 points par cellule
        assert_eq!(surface_size(area), (80.0, 40.0));
    }

    #[test]
    fn test_pixel_at_inside_and_outside() {
        let area = Rect::new(0, 0, 42, 12);

        // Première cellule intérieure : centre en points braille
        assert_eq!(pixel_at(area, 1, 1), Some((1.0, 2.0)));

        // Sur la bordure ou dehors : None
        assert_eq!(pixel_at(area, 0, 0), None);
        assert_eq!(pixel_at(area, 41, 5), None);
        assert_eq!(pixel_at(area, 100, 100), None);
    }

    #[test]
    fn test_flip_is_involutive() {
        assert_eq!(flip(flip(12.5, 40.0), 40.0), 12.5);
    }
}
