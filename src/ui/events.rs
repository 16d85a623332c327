// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier/souris et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : convertir les événements crossterm en événements app
// 3. Non-blocking I/O avec timeout : poll() borne l'attente, le timeout
//    devient le tick régulier de la boucle (polling, animations)
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Souris déplacée (position en cellules terminal)
    MouseMove { column: u16, row: u16 },

    /// Clic gauche (position en cellules terminal)
    MouseClick { column: u16, row: u16 },

    /// Le terminal a changé de taille
    Resize { columns: u16, rows: u16 },

    /// Tick régulier (polling, rafraîchissement)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    /// Crée un nouveau gestionnaire d'événements
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// Si rien n'arrive sous 250ms, retourne Event::Tick : c'est lui qui
    /// cadence le contrôleur (échéances de poll vérifiées à chaque tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    // Sur certains OS, on reçoit Press ET Release :
                    // on ne garde que Press pour éviter les doublons
                    if key.kind == KeyEventKind::Press {
                        Ok(Event::Key(key))
                    } else {
                        Ok(Event::Tick)
                    }
                }

                CrosstermEvent::Mouse(mouse) => Ok(convert_mouse(mouse)),

                CrosstermEvent::Resize(columns, rows) => Ok(Event::Resize { columns, rows }),

                // Autres événements (focus, paste) ignorés
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Convertit un événement souris crossterm
///
/// Seuls le déplacement (tooltip) et le clic gauche (indicateurs) nous
/// intéressent ; le reste est un Tick
fn convert_mouse(mouse: MouseEvent) -> Event {
    match mouse.kind {
        MouseEventKind::Moved => Event::MouseMove {
            column: mouse.column,
            row: mouse.row,
        },
        MouseEventKind::Down(MouseButton::Left) => Event::MouseClick {
            column: mouse.column,
            row: mouse.row,
        },
        _ => Event::Tick,
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Vérifie si l'événement est "jour précédent" : flèche gauche ou 'h' (vim)
pub fn is_prev_day_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H'))
    } else {
        false
    }
}

/// Vérifie si l'événement est "jour suivant" : flèche droite ou 'l' (vim)
pub fn is_next_day_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'r' (rafraîchir le jour affiché)
pub fn is_refresh_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
    } else {
        false
    }
}

/// Extrait un saut direct vers un indicateur : '1'..'9' -> index 0..8
pub fn day_digit_from_event(event: &Event) -> Option<usize> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            if let Some(digit) = c.to_digit(10) {
                if digit >= 1 {
                    return Some((digit - 1) as usize);
                }
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), event::KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key('q')));
        assert!(!is_quit_event(&key('a')));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_day_navigation_events() {
        assert!(is_prev_day_event(&key('h')));
        assert!(is_prev_day_event(&Event::Key(KeyEvent::new(
            KeyCode::Left,
            event::KeyModifiers::empty()
        ))));
        assert!(is_next_day_event(&key('l')));
        assert!(!is_next_day_event(&key('h')));
    }

    #[test]
    fn test_day_digit_from_event() {
        assert_eq!(day_digit_from_event(&key('1')), Some(0));
        assert_eq!(day_digit_from_event(&key('9')), Some(8));
        // '0' n'est pas un indicateur
        assert_eq!(day_digit_from_event(&key('0')), None);
        assert_eq!(day_digit_from_event(&key('x')), None);
    }
}
