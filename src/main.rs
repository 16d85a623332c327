// ============================================================================
// LazyChart - Carousel de graphiques de prix journaliers
// ============================================================================
// Programme TUI qui affiche un graphique de prix avec marqueurs de trades,
// et navigue entre les jours disponibles via un carousel
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour appels API
// 4. Command/outcome : le contrôleur pur décide, le worker exécute
// ============================================================================

use std::io;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Rect;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use lazychart::api::client::HttpSource;
use lazychart::api::DataSource;
use lazychart::app::App;
use lazychart::carousel::{CarouselController, FetchCommand, FetchOutcome};
use lazychart::chart::{ChartConfig, ChartView};
use lazychart::config::Config;
use lazychart::ui::{self, events::EventHandler, render};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Tracing : framework moderne de logging structuré
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/lazychart/logs/lazychart.log
/// - macOS : ~/Library/Application Support/lazychart/logs/lazychart.log
/// - Windows : C:\Users\<user>\AppData\Local\lazychart\logs\lazychart.log
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/lazychart/logs/lazychart.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=lazychart=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("lazychart")
        .join("logs");

    // Crée le répertoire s'il n'existe pas
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Configure la rotation quotidienne des logs
    // CONCEPT : Log rotation
    // - Rotation::DAILY : nouveau fichier chaque jour
    // - Évite que les logs deviennent trop gros
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazychart.log");

    // Configure le subscriber (receveur de logs)
    // CONCEPT : Builder pattern avec layers
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: lazychart::api::client)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour async)
                .with_line_number(true),
        )
        .with(
            // Filtre les logs par niveau
            // CONCEPT : EnvFilter
            // - RUST_LOG=debug : tous les logs debug+
            // - Par défaut : debug pour lazychart, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazychart=debug,info".into()),
        )
        .init();

    // Premier log : confirme que le logging est initialisé
    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================
// CONCEPT RUST : Async dans sync
// - main() est synchrone (pour TUI)
// - Mais on a besoin d'async pour les appels HTTP
// - Solution : un worker thread avec son propre runtime tokio
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging FIRST
    // CONCEPT : Logging avant tout le reste
    // - Si init échoue, on affiche l'erreur et continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyChart starting up");

    // Configuration depuis l'environnement (LAZYCHART_URL, etc.)
    let config = Config::from_env();
    let source = HttpSource::new(&config.base_url)?;

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Dimensionne la surface de dessin initiale depuis la taille du terminal
    // Le contrôleur et la vue raisonnent en pixels braille,
    // la conversion cellules → pixels vit dans ui::chart
    let screen = terminal.size()?;
    let (_, chart_area) = ui::layout(screen);
    let (width, height) = ui::chart::surface_size(chart_area);

    let chart = ChartView::new(ChartConfig::default(), width, height);
    let controller = CarouselController::new(chart, config.poll_interval, config.retry_interval);
    let mut app = App::new(controller);

    // Crée les channels pour communication avec le worker
    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : pour envoyer les commandes de fetch au worker
    // - outcome_tx/rx : pour recevoir les résultats du worker
    let (command_tx, command_rx) = mpsc::channel::<FetchCommand>();
    let (outcome_tx, outcome_rx) = mpsc::channel::<FetchOutcome>();

    // Lance le worker thread en arrière-plan
    info!("Spawning background worker thread");
    spawn_background_worker(source, command_rx, outcome_tx);

    // Premier fetch : snapshot complet (jours disponibles + jour courant)
    let _ = command_tx.send(app.carousel.start(Instant::now()));

    // Crée le gestionnaire d'événements
    let events = EventHandler::new();

    // Exécute l'event loop
    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, command_tx, outcome_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui exécute les fetch HTTP
// - Reçoit des FetchCommand via un channel (command_rx)
// - Renvoie des FetchOutcome via un autre channel (outcome_tx)
// - Le contrôleur reste pur : il ne voit jamais reqwest ni tokio
// ============================================================================

/// Worker thread qui exécute les fetch en arrière-plan
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - Générique sur DataSource : le worker marche avec n'importe quelle source
fn spawn_background_worker<S>(
    source: S,
    command_rx: mpsc::Receiver<FetchCommand>,
    outcome_tx: mpsc::Sender<FetchOutcome>,
) where
    S: DataSource + Send + 'static,
{
    std::thread::spawn(move || {
        // Crée un runtime tokio pour ce thread
        // CONCEPT : Runtime per-thread
        // - Chaque thread peut avoir son propre runtime
        // - Permet d'exécuter du code async dans un thread standard
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        // Boucle de traitement des commandes
        // CONCEPT : Command processing loop
        // - Attend une commande sur command_rx
        // - block_on() bloque le thread worker (pas l'UI)
        // - L'outcome reprend les métadonnées de la commande (clé, génération)
        //   pour que le contrôleur puisse détecter les complétions périmées
        loop {
            match command_rx.recv() {
                Ok(command) => {
                    debug!(?command, "Worker received command");

                    let outcome = match command {
                        FetchCommand::Latest => FetchOutcome::Latest {
                            result: runtime.block_on(source.fetch_snapshot()),
                        },
                        FetchCommand::Day { day_key, generation } => {
                            let result = runtime.block_on(source.fetch_day(&day_key));
                            FetchOutcome::Day {
                                day_key,
                                generation,
                                result,
                            }
                        }
                    };

                    if outcome_tx.send(outcome).is_err() {
                        // L'event loop a fermé son receiver, plus personne à servir
                        info!("Worker thread exiting (outcome channel closed)");
                        break;
                    }
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Worker thread exiting (command channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Game Loop / Event Loop Pattern
// - Loop infinie : while app.is_running()
// - À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Tick du contrôleur (échéances de poll et de retry)
// ============================================================================

/// Exécute la boucle principale de l'application
///
/// Le contrôleur est le seul à décider des fetch : l'event loop se contente
/// de transmettre les commandes au worker et de lui rapporter les outcomes
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: mpsc::Sender<FetchCommand>,
    outcome_rx: mpsc::Receiver<FetchOutcome>,
) -> Result<()> {
    loop {
        if !app.is_running() {
            break;
        }

        // ========================================
        // 0. OUTCOMES : Applique les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - try_recv() ne bloque pas (contrairement à recv())
        // - On draine tout ce qui est arrivé depuis la dernière itération
        loop {
            match outcome_rx.try_recv() {
                Ok(outcome) => app.carousel.apply_outcome(outcome, Instant::now()),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        let screen = terminal.size()?;
        if let Ok(event) = events.next() {
            handle_event(app, event, &command_tx, screen);
        }

        // ========================================
        // 3. TICK : Échéances du contrôleur
        // ========================================
        // Poll live et retry après erreur vivent dans le contrôleur
        if let Some(command) = app.carousel.tick(Instant::now()) {
            let _ = command_tx.send(command);
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Sépare la logique de gestion des événements
// - Toute navigation passe par le contrôleur, qui peut émettre une commande
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Guard clauses (if) pour filtrer les événements
/// - Les commandes émises par le contrôleur partent vers le worker
fn handle_event(
    app: &mut App,
    event: lazychart::ui::events::Event,
    command_tx: &mpsc::Sender<FetchCommand>,
    screen: Rect,
) {
    // Importe les helpers pour vérifier les événements
    use lazychart::ui::events::{
        day_digit_from_event, is_escape_event, is_next_day_event, is_prev_day_event,
        is_quit_event, is_refresh_event, Event,
    };

    let (bar_area, chart_area) = ui::layout(screen);

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Touche 'q' : quit confirmation two-step
            // CONCEPT : Two-step confirmation pour éviter les quits accidentels
            // - Première pression : active confirm_quit
            // - Deuxième pression : quit réel
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // ← ou 'h' : jour précédent (plus ancien)
        Event::Key(_) if is_prev_day_event(&event) => {
            app.cancel_quit(); // Annule la confirmation si active
            debug!("User navigated to previous day");
            if let Some(command) = app.carousel.navigate_prev() {
                let _ = command_tx.send(command);
            }
        }

        // → ou 'l' : jour suivant (plus récent)
        Event::Key(_) if is_next_day_event(&event) => {
            app.cancel_quit();
            debug!("User navigated to next day");
            if let Some(command) = app.carousel.navigate_next() {
                let _ = command_tx.send(command);
            }
        }

        // 'r' : re-fetch du jour affiché (bypass du cache en historique)
        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            info!("User requested refresh");
            if let Some(command) = app.carousel.refresh_current() {
                let _ = command_tx.send(command);
            }
        }

        // '1'-'9' : saut direct vers un jour du carousel
        Event::Key(_) if day_digit_from_event(&event).is_some() => {
            app.cancel_quit();
            if let Some(index) = day_digit_from_event(&event) {
                debug!(index, "User jumped to day by digit");
                if let Some(command) = app.carousel.navigate_to(index) {
                    let _ = command_tx.send(command);
                }
            }
        }

        // ESC : annule la confirmation de quit et ferme le tooltip
        Event::Key(_) if is_escape_event(&event) => {
            app.cancel_quit();
            app.carousel.chart_mut().pointer_leave();
        }

        // Survol souris : tooltip sur le point le plus proche du curseur
        Event::MouseMove { column, row } => {
            match ui::chart::pixel_at(chart_area, column, row) {
                Some((px, py)) => {
                    app.carousel.chart_mut().pointer_move(px, py);
                }
                None => app.carousel.chart_mut().pointer_leave(),
            }
        }

        // Clic sur un point du carousel : navigation directe vers ce jour
        Event::MouseClick { column, row } => {
            let ui_state = app.carousel.ui_state();
            if let Some(index) = ui::carousel_bar::dot_index_at(&ui_state, bar_area, column, row) {
                debug!(index, "User clicked carousel dot");
                if let Some(command) = app.carousel.navigate_to(index) {
                    let _ = command_tx.send(command);
                }
            }
        }

        // Redimensionnement : recalcule la surface de dessin du graphique
        Event::Resize { columns, rows } => {
            let (_, new_chart_area) = ui::layout(Rect::new(0, 0, columns, rows));
            let (width, height) = ui::chart::surface_size(new_chart_area);
            debug!(width, height, "Terminal resized");
            app.carousel.chart_mut().resize(width, height);
        }

        Event::Tick => {
            // Tick régulier : le polling vit dans carousel.tick(), rien ici
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// - Crossterm gère tout ça de manière cross-platform
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
///
/// CONCEPT RUST : Error propagation avec ?
/// - Chaque opération peut échouer
/// - ? propage automatiquement les erreurs
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Active le raw mode
    enable_raw_mode()?;

    // Configure le terminal
    // CONCEPT : Alternate screen
    // - Écran secondaire qui ne pollue pas l'historique
    // - Quand on quitte, l'écran précédent est restauré
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture // Souris requise pour le tooltip et le clic carousel
    )?;

    // Crée le backend crossterm
    let backend = CrosstermBackend::new(stdout);

    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// CONCEPT : Cleanup et RAII
/// - Appelé dans main() même en cas d'erreur
/// - Restaure le terminal pour ne pas le laisser cassé
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    // Désactive le raw mode
    disable_raw_mode()?;

    // Restaure le terminal
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    // Affiche le curseur
    terminal.show_cursor()?;

    Ok(())
}
