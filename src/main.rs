use std::fs::{self, OpenOptions};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn, Level};

use gwscope::app::{App, InputMode, StatusLevel};
use gwscope::config;
use gwscope::core::{action_for_key, search_route};
use gwscope::domain::Route;
use gwscope::infrastructure::channel::ChannelConfig;
use gwscope::infrastructure::{
    ApiEndpoints, HttpExplorerApi, RuntimeBridge, RuntimeCommand, WorkerConfig,
};
use gwscope::ui;

#[derive(Debug, Parser)]
#[command(
    name = "gwscope",
    version,
    about = "gwscope: a terminal explorer for Godwoken"
)]
struct Args {
    /// Page to open: a path like /account/0x..?tab=erc20, a block number, or a hash
    route: Option<String>,

    /// GraphQL endpoint
    #[arg(long)]
    graphql: Option<String>,

    /// REST API base URL
    #[arg(long)]
    api: Option<String>,

    /// Live channel websocket URL
    #[arg(long)]
    socket: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = config::load();
    if let Some(graphql) = args.graphql.clone() {
        config.endpoints.graphql = graphql;
    }
    if let Some(api) = args.api.clone() {
        config.endpoints.api = api;
    }
    if let Some(socket) = args.socket.clone() {
        config.endpoints.socket = socket;
    }
    info!(graphql = %config.endpoints.graphql, api = %config.endpoints.api, "starting gwscope");

    let api = HttpExplorerApi::new(&ApiEndpoints {
        graphql: config.endpoints.graphql.clone(),
        api: config.endpoints.api.clone(),
    })
    .context("failed to build the explorer client")?;
    let settings = config.session_settings();
    let runtime = RuntimeBridge::new(
        Arc::new(api),
        WorkerConfig {
            channel: ChannelConfig::new(config.endpoints.socket.clone()),
            page_size: settings.page_size,
        },
    )?;

    let mut app = App::new(settings, config::exports_dir());
    if let Some(input) = args.route.as_deref() {
        app.navigate(initial_route(input));
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, &runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

/// Logs go to a file so they never tear the alternate screen
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let file = config::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_max_level(level)
            .init(),
        None => tracing_subscriber::fmt()
            .with_writer(io::sink)
            .with_max_level(level)
            .init(),
    }
}

fn initial_route(input: &str) -> Route {
    if input.starts_with('/') {
        if let Ok(route) = Route::parse(input) {
            return route;
        }
        warn!(%input, "unparseable route, searching instead");
    }
    search_route(input.trim_start_matches('/'))
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: &RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick(Instant::now());
            last_tick = Instant::now();
        }

        pump_background(&mut app, runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        app.handle_event(event, Instant::now());
    }

    for cmd in app.take_commands() {
        if let Err(err) = runtime.send(cmd) {
            app.set_status(format!("Runtime unavailable: {err}"), StatusLevel::Error);
        }
    }

    if let Some(text) = app.take_clipboard() {
        copy_to_clipboard(app, &text);
    }
}

fn copy_to_clipboard(app: &mut App, text: &str) {
    use arboard::Clipboard;

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(text).is_err() {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => {
            let action = action_for_key(key);
            app.apply_action(action);
        }
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}
