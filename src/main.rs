mod app;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod ui;

use app::{App, InputMode};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::{CityProvider, ConfiguredLocation, FakeCityProvider, FakeForecastProvider};
use error::{Result, SkyViewError};
use logic::{ForecastSession, Providers, SessionOptions};
use models::{ContentState, DailyForecast, Forecast, OperatingState, WeatherUnit};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::components::{SearchBar, StateMessage, SuggestionList};
use ui::screens::{nav_bar, DetailedScreen, SimpleScreen};
use ui::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        init_logging(&cli, None);
        Config::setup_interactive()?;
        return Ok(());
    }

    // Load configuration
    let config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `skyview init` to create a fresh config");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Cities { ref filter }) => {
            init_logging(&cli, None);
            print_cities(filter.as_deref()).await
        }
        Some(Commands::Forecast {
            ref city,
            imperial,
            detailed,
            json,
        }) => {
            init_logging(&cli, None);
            print_forecast(&config, city, imperial, detailed, json).await
        }
        Some(Commands::Init) | None => {
            // Keep log output off the alternate screen
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(Config::log_path()?)?;
            init_logging(&cli, Some(log_file));
            run_tui(config).await
        }
    }
}

fn init_logging(cli: &Cli, log_file: Option<std::fs::File>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level()));

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
    }
}

fn build_providers(config: &Config) -> Providers {
    let mut forecasts = FakeForecastProvider::new(config.forecast.days);
    if let Some(seed) = config.forecast.seed {
        forecasts = forecasts.with_seed(seed);
    }

    Providers {
        cities: Arc::new(FakeCityProvider::new()),
        forecasts: Arc::new(forecasts),
        location: Arc::new(ConfiguredLocation::new(config.location.clone())),
    }
}

fn session_options(config: &Config) -> SessionOptions {
    let mut options = SessionOptions::new(&config.session.seed_city, &config.timings);
    options.unit = config.session.unit;
    options.content = config.session.content;
    options
}

async fn print_cities(filter: Option<&str>) -> Result<()> {
    let cities = FakeCityProvider::new().list_cities(filter).await?;
    if cities.is_empty() {
        println!("No matching cities");
    }
    for city in cities {
        println!("{}", city);
    }
    Ok(())
}

async fn print_forecast(
    config: &Config,
    city: &str,
    imperial: bool,
    detailed: bool,
    json: bool,
) -> Result<()> {
    let mut options = session_options(config);
    // Nothing to debounce without a UI
    options.settle_delay = Duration::ZERO;
    let session = ForecastSession::start(build_providers(config), options);
    if imperial {
        session.set_weather_unit(WeatherUnit::Imperial);
    }
    if detailed {
        session.set_content_state(ContentState::Detailed);
    }

    session
        .select_city(city, false)
        .await
        .map_err(|e| SkyViewError::ProviderUnavailable(e.to_string()))?;

    let view = session.snapshot();
    if let Some(error) = view.last_error {
        return Err(error);
    }
    let Some(forecast) = view.forecast else {
        return Err(SkyViewError::CityNotFound(city.to_string()));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(forecast.as_ref())?);
        return Ok(());
    }

    print!("{}", format_forecast(&forecast, view.unit, view.content));
    Ok(())
}

fn format_day(day: &DailyForecast, unit: WeatherUnit) -> String {
    format!(
        "{:<12} {} {:<14} {:>6}  ({} / {})  rain {:>3}%  wind {:>2} km/h",
        day.label(),
        day.weather.symbol(),
        day.weather.as_str(),
        unit.format(day.temperature),
        unit.format_compressed(day.min_temperature),
        unit.format_compressed(day.max_temperature),
        day.precipitation_probability,
        day.wind_speed,
    )
}

fn format_forecast(forecast: &Forecast, unit: WeatherUnit, content: ContentState) -> String {
    let mut out = format!("{}\n", forecast.city);

    match content {
        ContentState::Detailed => {
            for day in &forecast.daily {
                out.push_str(&format_day(day, unit));
                out.push('\n');
            }
        }
        ContentState::Simple => {
            if let Some(day) = forecast.first_daily() {
                out.push_str(&format_day(day, unit));
                out.push('\n');
                for hour in day.hourly.iter().step_by(3) {
                    out.push_str(&format!(
                        "  {} {} {}\n",
                        hour.label(),
                        hour.weather.symbol(),
                        unit.format_compressed(hour.temperature)
                    ));
                }
            }
        }
    }
    out
}

/// Starts the session and kicks off the first forecast: the located city
/// when location lookup is enabled, the default city otherwise.
fn start_app(config: &Config) -> App {
    let session = ForecastSession::start(build_providers(config), session_options(config));
    let mut app = App::new(session);

    if config.location.enabled {
        app.locate();
    } else {
        app.session.load_default_city();
        app.set_status("Location lookup is disabled, showing the default city");
    }
    app
}

async fn run_tui(config: Config) -> Result<()> {
    let mut app = start_app(&config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.refresh();
        terminal.draw(|f| draw(f, app))?;

        // Poll on a timeout so session updates and animations keep flowing
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        } else {
            app.on_tick();
        }

        // Let spawned session tasks run between frames
        tokio::task::yield_now().await;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(8),    // Body
            Constraint::Length(1), // Status
            Constraint::Length(1), // Nav
        ])
        .split(area);

    let view = &app.view;
    let searching = app.input_mode == InputMode::Search;
    let query = if searching {
        app.search.buffer.as_str()
    } else {
        view.query.as_str()
    };
    f.render_widget(
        SearchBar::new(query, view.unit, view.content).focused(searching),
        chunks[0],
    );

    match (view.state, view.forecast.as_deref()) {
        (OperatingState::Running, Some(forecast)) => match view.content {
            ContentState::Simple => f.render_widget(
                SimpleScreen::new(forecast, view.selected.as_ref(), view.unit, app.tick),
                chunks[1],
            ),
            ContentState::Detailed => f.render_widget(
                DetailedScreen::new(forecast, view.selected.as_ref(), view.unit),
                chunks[1],
            ),
        },
        (state, _) => f.render_widget(StateMessage::new(state, app.tick), chunks[1]),
    }

    let status = match app.status_message {
        Some(ref message) if view.last_error.is_some() => {
            Span::styled(message.as_str(), Theme::error())
        }
        Some(ref message) => Span::styled(message.as_str(), Theme::warning()),
        None => Span::styled(format!("{}", view.state), Theme::dim()),
    };
    f.render_widget(Paragraph::new(status), chunks[2]);
    f.render_widget(Paragraph::new(nav_bar(app.input_mode)), chunks[3]);

    if searching && !app.search.buffer.trim().is_empty() {
        let list = SuggestionList::new(app.suggestions(), app.search.selected_index);
        let height = list.height().min(chunks[1].height);
        let dropdown = Rect {
            x: chunks[0].x + 2,
            y: chunks[1].y,
            width: chunks[0].width.saturating_sub(4).min(40),
            height,
        };
        f.render_widget(list, dropdown);
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.input_mode {
        InputMode::Search => match key.code {
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Enter => app.confirm_search(),
            KeyCode::Up => app.search.prev(),
            KeyCode::Down => {
                let count = app.suggestions().len();
                app.search.next(count);
            }
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) => app.type_char(c),
            _ => {}
        },
        InputMode::Browse => match key.code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Char('/') => app.start_search(),
            KeyCode::Left => app.prev_day(),
            KeyCode::Right => app.next_day(),
            KeyCode::Char('d') => app.toggle_content(),
            KeyCode::Char('u') => app.toggle_unit(),
            KeyCode::Char('l') => app.locate(),
            KeyCode::Esc => app.clear_status(),
            _ => {}
        },
    }
}
