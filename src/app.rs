use crate::error::SkyViewError;
use crate::logic::{ForecastSession, SessionSnapshot};
use crate::models::{ContentState, DailyForecast, Forecast, OperatingState, WeatherUnit};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

pub struct SearchState {
    pub buffer: String,
    pub selected_index: usize,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            selected_index: 0,
        }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

/// One receiver per published session field
struct SessionWatch {
    state: watch::Receiver<OperatingState>,
    content: watch::Receiver<ContentState>,
    unit: watch::Receiver<WeatherUnit>,
    query: watch::Receiver<String>,
    cities: watch::Receiver<Vec<String>>,
    forecast: watch::Receiver<Option<Arc<Forecast>>>,
    selected: watch::Receiver<Option<DailyForecast>>,
    last_error: watch::Receiver<Option<SkyViewError>>,
}

impl SessionWatch {
    fn new(session: &ForecastSession) -> Self {
        Self {
            state: session.state(),
            content: session.content_state(),
            unit: session.weather_unit(),
            query: session.search_query(),
            cities: session.cities(),
            forecast: session.forecast(),
            selected: session.selected_daily_forecast(),
            last_error: session.last_error(),
        }
    }
}

/// Copies the latest value into `slot` if the sender published since the
/// last pull.
fn pull<T: Clone>(rx: &mut watch::Receiver<T>, slot: &mut T) -> bool {
    if !rx.has_changed().unwrap_or(false) {
        return false;
    }
    *slot = rx.borrow_and_update().clone();
    true
}

pub struct App {
    pub session: ForecastSession,
    pub view: SessionSnapshot,
    pub input_mode: InputMode,
    pub search: SearchState,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Frame counter driving spinner and weather animations
    pub tick: u64,
    watch: SessionWatch,
}

impl App {
    pub fn new(session: ForecastSession) -> Self {
        let watch = SessionWatch::new(&session);
        let view = session.snapshot();
        Self {
            session,
            view,
            input_mode: InputMode::Browse,
            search: SearchState::new(),
            should_quit: false,
            status_message: None,
            tick: 0,
            watch,
        }
    }

    /// Pulls every field published since the last call. Returns true when
    /// anything changed.
    pub fn refresh(&mut self) -> bool {
        let watch = &mut self.watch;
        let view = &mut self.view;
        let mut changed = pull(&mut watch.state, &mut view.state);
        changed |= pull(&mut watch.content, &mut view.content);
        changed |= pull(&mut watch.unit, &mut view.unit);
        changed |= pull(&mut watch.query, &mut view.query);
        changed |= pull(&mut watch.cities, &mut view.cities);
        changed |= pull(&mut watch.forecast, &mut view.forecast);
        changed |= pull(&mut watch.selected, &mut view.selected);

        if pull(&mut watch.last_error, &mut view.last_error) {
            changed = true;
            if let Some(ref error) = view.last_error {
                self.status_message = Some(error.to_string());
            }
        }
        changed
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search.buffer = self.view.query.clone();
        self.search.selected_index = 0;
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Browse;
    }

    pub fn type_char(&mut self, c: char) {
        self.search.buffer.push(c);
        self.search_changed();
    }

    pub fn backspace(&mut self) {
        self.search.buffer.pop();
        self.search_changed();
    }

    fn search_changed(&mut self) {
        self.search.selected_index = 0;
        self.session.search_city(self.search.buffer.clone());
    }

    /// Suggestions are only meaningful while they answer the typed query
    pub fn suggestions(&self) -> &[String] {
        if self.view.query == self.search.buffer {
            &self.view.cities
        } else {
            &[]
        }
    }

    /// Selects the highlighted suggestion, or the typed text when there is none.
    pub fn confirm_search(&mut self) {
        let city = self
            .suggestions()
            .get(self.search.selected_index)
            .cloned()
            .or_else(|| {
                let typed = self.search.buffer.trim();
                (!typed.is_empty()).then(|| typed.to_string())
            });

        if let Some(city) = city {
            tracing::debug!("Selecting {}", city);
            self.clear_status();
            self.session.set_state(OperatingState::Loading);
            self.session.select_city(city, false);
            self.input_mode = InputMode::Browse;
        }
    }

    pub fn locate(&mut self) {
        self.clear_status();
        self.session.locate();
    }

    pub fn next_day(&mut self) {
        self.shift_day(1);
    }

    pub fn prev_day(&mut self) {
        self.shift_day(-1);
    }

    fn shift_day(&mut self, delta: isize) {
        let Some(forecast) = self.view.forecast.as_ref() else {
            return;
        };
        let current = self
            .view
            .selected
            .as_ref()
            .and_then(|d| forecast.position_of(d))
            .unwrap_or(0);
        let target = current.saturating_add_signed(delta);

        if let Some(day) = forecast.daily.get(target) {
            self.session.select_daily_forecast(day.clone());
        }
    }

    pub fn toggle_content(&mut self) {
        self.session.toggle_content_state();
    }

    pub fn toggle_unit(&mut self) {
        self.session.toggle_weather_unit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationConfig;
    use crate::datasources::{ConfiguredLocation, FakeCityProvider, FakeForecastProvider};
    use crate::logic::{Providers, SessionOptions};
    use crate::models::{ContentState, WeatherUnit};
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        let session = ForecastSession::start(
            Providers {
                cities: Arc::new(FakeCityProvider::new()),
                forecasts: Arc::new(FakeForecastProvider::new(5).with_seed(3)),
                location: Arc::new(ConfiguredLocation::new(LocationConfig::default())),
            },
            SessionOptions::default(),
        );
        App::new(session)
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn search_selection_bounds() {
        let mut state = SearchState::new();
        state.prev();
        assert_eq!(state.selected_index, 0);
        state.next(2);
        state.next(2);
        assert_eq!(state.selected_index, 1);
        state.next(0);
        assert_eq!(state.selected_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_updates_suggestions() {
        let mut app = app();
        app.start_search();
        for c in "par".chars() {
            app.type_char(c);
        }
        wait(1).await;

        assert!(app.refresh());
        assert_eq!(app.view.query, "par");
        assert_eq!(app.suggestions(), ["Paris".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn confirming_a_suggestion_loads_the_forecast() {
        let mut app = app();
        app.start_search();
        for c in "tok".chars() {
            app.type_char(c);
        }
        wait(1).await;
        app.refresh();

        app.confirm_search();
        assert_eq!(app.input_mode, InputMode::Browse);
        wait(200).await;
        app.refresh();

        assert_eq!(app.view.query, "Tokyo");
        assert_eq!(app.view.state, OperatingState::Running);
        assert_eq!(app.view.forecast.as_ref().map(|f| f.daily.len()), Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn day_navigation_stays_in_range() {
        let mut app = app();
        app.session.select_city("Rome", false).await.unwrap();
        app.refresh();
        let forecast = app.view.forecast.clone().unwrap();

        app.prev_day();
        app.refresh();
        assert_eq!(app.view.selected.as_ref(), Some(&forecast.daily[0]));

        for _ in 0..10 {
            app.next_day();
            app.refresh();
        }
        assert_eq!(app.view.selected.as_ref(), forecast.daily.last());
    }

    #[tokio::test(start_paused = true)]
    async fn toggles_go_through_the_session() {
        let mut app = app();
        app.toggle_unit();
        app.toggle_content();
        app.refresh();
        assert_eq!(app.view.unit, WeatherUnit::Imperial);
        assert_eq!(app.view.content, ContentState::Detailed);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_confirm_does_nothing() {
        let mut app = app();
        app.start_search();
        app.confirm_search();
        assert_eq!(app.input_mode, InputMode::Search);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_reports_only_new_publishes() {
        let mut app = app();
        wait(1).await;
        app.refresh();
        assert!(!app.refresh());

        app.toggle_unit();
        assert!(app.refresh());
        assert_eq!(app.view.unit, WeatherUnit::Imperial);
        assert!(!app.refresh());
    }
}
