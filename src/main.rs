mod app;
mod components;
mod draw;
mod keys;
mod routes;
mod state;
mod ui;

use crate::app::App;
use crate::routes::Route;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use ggforge_api::client::GgForgeApi;
use ggforge_api::fixtures::Fixtures;
use log::{LevelFilter, info, warn};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(initial_path) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    let settings = AppSettings::load();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let level = settings.log_level.unwrap_or(LevelFilter::Info);
    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);

    let fixtures = load_fixtures(&settings);
    let client = GgForgeApi::new(settings.api_url.clone()).with_media_base(settings.media_base());
    info!("backend at {}, media at {}", client.base_url(), client.media_base());

    let app = Arc::new(Mutex::new(App::new(settings, fixtures)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Open the page named on the command line, then draw it
    let requests = app.lock().await.open(Route::parse(&initial_path));
    for request in requests {
        let _ = network_req_tx.send(request).await;
    }
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

/// Returns the initial path to open, or `None` when the process should exit.
fn handle_cli_args() -> Option<String> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Some("/".to_string());
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("ggforge {}", env!("CARGO_PKG_VERSION"));
            None
        }
        path if path.starts_with('/') && args.next().is_none() => Some(path.to_string()),
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "ggforge - terminal client for the GGForge tournament platform

Usage:
  ggforge [PATH]        open PATH first, e.g. /tournament/1 (default /)
  ggforge --help
  ggforge --version

Environment:
  GGFORGE_API_URL      Backend base URL (default http://127.0.0.1:5000/api)
  GGFORGE_MEDIA_URL    Base URL for avatars and images (default: the API URL)
  GGFORGE_USER_ID      Signed-in user id, for match management
  GGFORGE_ADMIN        1/true to manage every match
  GGFORGE_LOG          Log level: error, warn, info, debug, trace
  GGFORGE_FIXTURES     Path to a JSON snapshot replacing the sample data

Settings are also read from $XDG_CONFIG_HOME/ggforge/settings.json."
}

fn load_fixtures(settings: &AppSettings) -> Fixtures {
    let Some(path) = settings.fixtures_path.as_deref() else {
        return Fixtures::sample();
    };
    match Fixtures::load_json(path, settings.media_base()) {
        Ok(fixtures) => {
            info!("loaded fixtures from {path}");
            fixtures
        }
        Err(e) => {
            warn!("{e}; using the sample data");
            Fixtures::sample()
        }
    }
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted | UiEvent::Resize => true,
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }
    app.lock().await.on_network_response(response);
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::Hide,
        terminal::EnterAlternateScreen,
        terminal::Clear(terminal::ClearType::All)
    )?;
    terminal::enable_raw_mode()
}

/// Also called from the panic hook; errors are ignored.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::All),
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
