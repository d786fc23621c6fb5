//! Presentation state for one forecast browsing session.
//!
//! Every field is published through its own `watch` channel. Intents publish
//! synchronous changes immediately and run delays and provider calls on
//! spawned tasks. Each asynchronous publish is tagged with a generation
//! number, so work that a newer intent has superseded is dropped instead of
//! overwriting newer state.

use crate::config::TimingsConfig;
use crate::datasources::{CityProvider, ForecastProvider, LocationProvider};
use crate::error::SkyViewError;
use crate::models::{ContentState, DailyForecast, Forecast, OperatingState, WeatherUnit};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub seed_city: String,
    pub unit: WeatherUnit,
    pub content: ContentState,
    pub location_error_grace: Duration,
    pub location_fix_delay: Duration,
    pub settle_delay: Duration,
}

impl SessionOptions {
    pub fn new(seed_city: &str, timings: &TimingsConfig) -> Self {
        Self {
            seed_city: seed_city.to_string(),
            unit: WeatherUnit::Metric,
            content: ContentState::Simple,
            location_error_grace: timings.location_error_grace(),
            location_fix_delay: timings.location_fix_delay(),
            settle_delay: timings.settle_delay(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new("London", &TimingsConfig::default())
    }
}

/// Providers backing a session
#[derive(Clone)]
pub struct Providers {
    pub cities: Arc<dyn CityProvider>,
    pub forecasts: Arc<dyn ForecastProvider>,
    pub location: Arc<dyn LocationProvider>,
}

/// Consistent copy of every published field, for rendering
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: OperatingState,
    pub content: ContentState,
    pub unit: WeatherUnit,
    pub query: String,
    pub cities: Vec<String>,
    pub forecast: Option<Arc<Forecast>>,
    pub selected: Option<DailyForecast>,
    pub last_error: Option<SkyViewError>,
}

#[derive(Default)]
struct Generations {
    state: AtomicU64,
    query: AtomicU64,
    city: AtomicU64,
    search: AtomicU64,
}

fn advance(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

fn is_current(counter: &AtomicU64, generation: u64) -> bool {
    counter.load(Ordering::SeqCst) == generation
}

struct Inner {
    providers: Providers,
    options: SessionOptions,
    generations: Generations,
    /// Held while a city generation is issued and while a loaded forecast
    /// and its first day are published, so the pair always lands together.
    load_lock: Mutex<()>,
    state: watch::Sender<OperatingState>,
    content: watch::Sender<ContentState>,
    unit: watch::Sender<WeatherUnit>,
    query: watch::Sender<String>,
    cities: watch::Sender<Vec<String>>,
    forecast: watch::Sender<Option<Arc<Forecast>>>,
    selected: watch::Sender<Option<DailyForecast>>,
    last_error: watch::Sender<Option<SkyViewError>>,
}

/// Handle to a session. Cheap to clone; all clones drive the same state.
#[derive(Clone)]
pub struct ForecastSession {
    inner: Arc<Inner>,
}

impl ForecastSession {
    /// Starts a session in `Loading` and fetches suggestions for the seed
    /// city. Must be called inside a Tokio runtime.
    pub fn start(providers: Providers, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(OperatingState::Loading);
        let (content, _) = watch::channel(options.content);
        let (unit, _) = watch::channel(options.unit);
        let (query, _) = watch::channel(String::new());
        let (cities, _) = watch::channel(Vec::new());
        let (forecast, _) = watch::channel(None);
        let (selected, _) = watch::channel(None);
        let (last_error, _) = watch::channel(None);

        let session = Self {
            inner: Arc::new(Inner {
                providers,
                options,
                generations: Generations::default(),
                load_lock: Mutex::new(()),
                state,
                content,
                unit,
                query,
                cities,
                forecast,
                selected,
                last_error,
            }),
        };

        let seed = session.inner.options.seed_city.clone();
        session.fetch_cities(seed);
        session
    }

    pub fn set_state(&self, new_state: OperatingState) {
        self.inner.set_state(new_state);
    }

    pub fn set_content_state(&self, content: ContentState) {
        self.inner.content.send_replace(content);
    }

    pub fn toggle_content_state(&self) {
        let content = self.inner.content.borrow().toggled();
        self.set_content_state(content);
    }

    pub fn set_weather_unit(&self, unit: WeatherUnit) {
        self.inner.unit.send_replace(unit);
    }

    pub fn toggle_weather_unit(&self) {
        let unit = self.inner.unit.borrow().toggled();
        self.set_weather_unit(unit);
    }

    /// Publishes `day` as the selected day. The caller picks `day` from the
    /// loaded forecast; it is not validated.
    pub fn select_daily_forecast(&self, day: DailyForecast) {
        self.inner.selected.send_replace(Some(day));
    }

    /// Publishes the raw query. A blank query returns the session to `Idle`;
    /// any other query refreshes the suggestion list on a spawned task.
    pub fn search_city(&self, query: impl Into<String>) -> Option<JoinHandle<()>> {
        let query = query.into();
        advance(&self.inner.generations.query);
        self.inner.query.send_replace(query.clone());

        if query.trim().is_empty() {
            self.inner.set_state(OperatingState::Idle);
            return None;
        }

        Some(self.fetch_cities(query))
    }

    /// Loads the forecast for `city` and makes it the current one.
    ///
    /// A city coming from a location fix is registered with the city
    /// provider first. If another `select_city` call starts before this one
    /// finishes, this call's forecast, selection and state changes are
    /// dropped.
    pub fn select_city(&self, city: impl Into<String>, from_location: bool) -> JoinHandle<()> {
        let city = city.into();
        let city_generation = self.inner.begin_load();
        let query_generation = advance(&self.inner.generations.query);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            inner
                .run_select_city(city, from_location, city_generation, query_generation)
                .await;
        })
    }

    /// Resolves the device location and loads its forecast.
    pub fn locate(&self) -> JoinHandle<()> {
        self.inner.set_state(OperatingState::Loading);
        let session = self.clone();

        tokio::spawn(async move {
            match session.inner.providers.location.locate().await {
                Ok(Some(city)) => {
                    if let Err(e) = session.select_city(city, true).await {
                        tracing::error!("City selection task failed: {}", e);
                    }
                }
                Ok(None) => {
                    tracing::info!("No location fix, falling back to manual search");
                    session.inner.set_state(OperatingState::LocationError);
                }
                Err(e) => {
                    // Location services off: back to whatever the query shows
                    tracing::warn!("Location lookup failed: {}", e);
                    let inner = &session.inner;
                    inner.last_error.send_replace(Some(e));
                    inner.set_state(inner.fallback_state());
                }
            }
        })
    }

    /// Loads the city provider's default city.
    pub fn load_default_city(&self) -> JoinHandle<()> {
        self.inner.set_state(OperatingState::Loading);
        let session = self.clone();

        tokio::spawn(async move {
            match session.inner.providers.cities.default_city().await {
                Ok(city) => {
                    if let Err(e) = session.select_city(city, false).await {
                        tracing::error!("City selection task failed: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Default city lookup failed: {}", e);
                    session.inner.recover(e);
                }
            }
        })
    }

    fn fetch_cities(&self, filter: String) -> JoinHandle<()> {
        let generation = advance(&self.inner.generations.search);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            match inner.providers.cities.list_cities(Some(&filter)).await {
                Ok(cities) => {
                    let count = cities.len();
                    let search = &inner.generations.search;
                    if publish_if(&inner.cities, search, generation, cities) {
                        tracing::trace!("{} suggestions for {:?}", count, filter);
                    }
                }
                Err(e) => tracing::warn!("City suggestions for {:?} failed: {}", filter, e),
            }
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = &self.inner;
        SessionSnapshot {
            state: *inner.state.borrow(),
            content: *inner.content.borrow(),
            unit: *inner.unit.borrow(),
            query: inner.query.borrow().clone(),
            cities: inner.cities.borrow().clone(),
            forecast: inner.forecast.borrow().clone(),
            selected: inner.selected.borrow().clone(),
            last_error: inner.last_error.borrow().clone(),
        }
    }

    pub fn state(&self) -> watch::Receiver<OperatingState> {
        self.inner.state.subscribe()
    }

    pub fn content_state(&self) -> watch::Receiver<ContentState> {
        self.inner.content.subscribe()
    }

    pub fn weather_unit(&self) -> watch::Receiver<WeatherUnit> {
        self.inner.unit.subscribe()
    }

    pub fn search_query(&self) -> watch::Receiver<String> {
        self.inner.query.subscribe()
    }

    pub fn cities(&self) -> watch::Receiver<Vec<String>> {
        self.inner.cities.subscribe()
    }

    pub fn forecast(&self) -> watch::Receiver<Option<Arc<Forecast>>> {
        self.inner.forecast.subscribe()
    }

    pub fn selected_daily_forecast(&self) -> watch::Receiver<Option<DailyForecast>> {
        self.inner.selected.subscribe()
    }

    pub fn last_error(&self) -> watch::Receiver<Option<SkyViewError>> {
        self.inner.last_error.subscribe()
    }
}

/// Publishes only while `generation` is still the latest one issued by
/// `counter`. The check runs under the channel's write lock.
fn publish_if<T>(tx: &watch::Sender<T>, counter: &AtomicU64, generation: u64, value: T) -> bool {
    tx.send_if_modified(|slot| {
        if !is_current(counter, generation) {
            return false;
        }
        *slot = value;
        true
    })
}

impl Inner {
    fn set_state(self: &Arc<Self>, new_state: OperatingState) {
        let generation = advance(&self.generations.state);
        tracing::debug!("State -> {}", new_state);
        self.state.send_replace(new_state);

        if new_state == OperatingState::LocationError {
            let inner = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(inner.options.location_error_grace).await;
                let fallback = inner.fallback_state();
                if publish_if(&inner.state, &inner.generations.state, generation, fallback) {
                    tracing::debug!("Location error grace period over, state -> {}", fallback);
                }
            });
        }
    }

    /// `Running` when there is something to show for the current query,
    /// `Idle` otherwise.
    fn fallback_state(&self) -> OperatingState {
        if self.query.borrow().trim().is_empty() {
            OperatingState::Idle
        } else {
            OperatingState::Running
        }
    }

    fn recover(self: &Arc<Self>, error: SkyViewError) {
        self.last_error.send_replace(Some(error));
        let state = if self.forecast.borrow().is_some() {
            self.fallback_state()
        } else {
            OperatingState::Idle
        };
        self.set_state(state);
    }

    fn lock_loads(&self) -> std::sync::MutexGuard<'_, ()> {
        self.load_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_load(&self) -> u64 {
        let _guard = self.lock_loads();
        advance(&self.generations.city)
    }

    /// Publishes `forecast` with its first day selected and clears the last
    /// error, unless a newer load has started.
    fn publish_load(&self, city_generation: u64, forecast: Forecast) -> bool {
        let _guard = self.lock_loads();
        if !is_current(&self.generations.city, city_generation) {
            return false;
        }

        let first = forecast.first_daily().cloned();
        self.forecast.send_replace(Some(Arc::new(forecast)));
        self.selected.send_replace(first);
        self.last_error.send_replace(None);
        true
    }

    async fn run_select_city(
        self: Arc<Self>,
        city: String,
        from_location: bool,
        city_generation: u64,
        query_generation: u64,
    ) {
        if from_location {
            tokio::time::sleep(self.options.location_fix_delay).await;
            if let Err(e) = self.providers.cities.add_city(&city).await {
                tracing::warn!("Could not register located city {}: {}", city, e);
                if is_current(&self.generations.city, city_generation) {
                    self.recover(e);
                }
                return;
            }
        }

        publish_if(
            &self.query,
            &self.generations.query,
            query_generation,
            city.clone(),
        );
        tokio::time::sleep(self.options.settle_delay).await;

        let forecast = match self.providers.forecasts.get_forecast(&city).await {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::warn!("Forecast for {} failed: {}", city, e);
                if is_current(&self.generations.city, city_generation) {
                    self.recover(e);
                }
                return;
            }
        };

        let today = forecast.first_daily().map(|d| d.weather);
        if !self.publish_load(city_generation, forecast) {
            tracing::debug!("Dropping superseded forecast for {}", city);
            return;
        }

        if let Some(weather) = today {
            tracing::info!(
                "Loaded forecast for {} ({}, {})",
                city,
                weather,
                weather.animation()
            );
        }
        if is_current(&self.generations.city, city_generation) {
            self.set_state(OperatingState::Running);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::{ConfiguredLocation, FakeCityProvider, FakeForecastProvider};
    use crate::config::LocationConfig;
    use crate::error::{Result, SkyViewError};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    const GRACE: Duration = Duration::from_millis(3000);

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn forecasts() -> FakeForecastProvider {
        FakeForecastProvider::new(7).with_seed(11).starting(start_date())
    }

    fn location(city: Option<&str>) -> Arc<ConfiguredLocation> {
        Arc::new(ConfiguredLocation::new(LocationConfig {
            enabled: true,
            city: city.map(str::to_string),
        }))
    }

    struct Harness {
        session: ForecastSession,
        cities: Arc<FakeCityProvider>,
    }

    fn harness_with(
        forecasts: Arc<dyn ForecastProvider>,
        location: Arc<dyn LocationProvider>,
    ) -> Harness {
        let cities = Arc::new(FakeCityProvider::new());
        let session = ForecastSession::start(
            Providers {
                cities: cities.clone(),
                forecasts,
                location,
            },
            SessionOptions::default(),
        );
        Harness { session, cities }
    }

    fn harness() -> Harness {
        harness_with(Arc::new(forecasts()), location(None))
    }

    /// Serves forecasts after a per-city delay
    struct SlowForecasts {
        inner: FakeForecastProvider,
        slow_city: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl ForecastProvider for SlowForecasts {
        async fn get_forecast(&self, city: &str) -> Result<Forecast> {
            if city == self.slow_city {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.get_forecast(city).await
        }
    }

    struct BrokenForecasts;

    #[async_trait]
    impl ForecastProvider for BrokenForecasts {
        async fn get_forecast(&self, _city: &str) -> Result<Forecast> {
            Err(SkyViewError::ProviderUnavailable("backend offline".into()))
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn initial_state() {
        let h = harness();
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.state, OperatingState::Loading);
        assert_eq!(snapshot.content, ContentState::Simple);
        assert_eq!(snapshot.unit, WeatherUnit::Metric);
        assert!(snapshot.query.is_empty());
        assert!(snapshot.forecast.is_none());
        assert!(snapshot.selected.is_none());

        settle().await;
        assert_eq!(h.session.snapshot().cities, vec!["London".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn location_error_reverts_to_idle_without_query() {
        let h = harness();
        h.session.set_state(OperatingState::LocationError);
        assert_eq!(*h.session.state().borrow(), OperatingState::LocationError);

        tokio::time::sleep(GRACE - Duration::from_millis(1)).await;
        assert_eq!(*h.session.state().borrow(), OperatingState::LocationError);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*h.session.state().borrow(), OperatingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn location_error_reverts_to_running_with_query() {
        let h = harness();
        h.session.search_city("Par");
        h.session.set_state(OperatingState::LocationError);

        tokio::time::sleep(GRACE + Duration::from_millis(1)).await;
        assert_eq!(*h.session.state().borrow(), OperatingState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn later_set_state_supersedes_location_error_revert() {
        let h = harness();
        h.session.set_state(OperatingState::LocationError);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        h.session.set_state(OperatingState::Loading);

        tokio::time::sleep(GRACE).await;
        assert_eq!(*h.session.state().borrow(), OperatingState::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_intents_do_not_cancel_revert() {
        let h = harness();
        h.session.set_state(OperatingState::LocationError);
        h.session.set_content_state(ContentState::Detailed);
        h.session.set_weather_unit(WeatherUnit::Imperial);

        tokio::time::sleep(GRACE + Duration::from_millis(1)).await;
        assert_eq!(*h.session.state().borrow(), OperatingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn select_city_loads_first_day() {
        let h = harness();
        h.session.select_city("Paris", false).await.unwrap();

        let snapshot = h.session.snapshot();
        let expected = forecasts().get_forecast("Paris").await.unwrap();
        assert_eq!(snapshot.query, "Paris");
        assert_eq!(snapshot.state, OperatingState::Running);
        assert_eq!(snapshot.selected.as_ref(), expected.first_daily());
        assert_eq!(snapshot.forecast.as_deref(), Some(&expected));
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn select_city_publishes_query_before_fetch() {
        let h = harness();
        let handle = h.session.select_city("Rome", false);
        settle().await;
        assert_eq!(h.session.snapshot().query, "Rome");
        assert!(h.session.snapshot().forecast.is_none());

        handle.await.unwrap();
        assert!(h.session.snapshot().forecast.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn located_city_is_registered_once() {
        let h = harness();
        let before = h.cities.len().await;

        h.session.select_city("Reykjavik", true).await.unwrap();
        h.session.select_city("Reykjavik", true).await.unwrap();

        let known = h.cities.list_cities(None).await.unwrap();
        assert_eq!(known.len(), before + 1);
        assert_eq!(known.iter().filter(|c| *c == "Reykjavik").count(), 1);
        assert_eq!(h.session.snapshot().state, OperatingState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn located_city_waits_for_fix_delay() {
        let h = harness();
        let _handle = h.session.select_city("Oslo", true);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(h.session.snapshot().query.is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(h.session.snapshot().query, "Oslo");
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_select_city_does_not_overwrite() {
        let slow = SlowForecasts {
            inner: forecasts(),
            slow_city: "Tokyo",
            delay: Duration::from_secs(5),
        };
        let h = harness_with(Arc::new(slow), location(None));

        let tokyo = h.session.select_city("Tokyo", false);
        let lima = h.session.select_city("Lima", false);
        lima.await.unwrap();
        tokyo.await.unwrap();

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.query, "Lima");
        assert_eq!(snapshot.forecast.map(|f| f.city.clone()).as_deref(), Some("Lima"));
    }

    #[tokio::test(start_paused = true)]
    async fn select_daily_forecast_only_changes_selection() {
        let h = harness();
        h.session.select_city("Paris", false).await.unwrap();
        let before = h.session.snapshot();
        let forecast = before.forecast.clone().unwrap();

        h.session.select_daily_forecast(forecast.daily[3].clone());
        let after = h.session.snapshot();

        assert_eq!(after.selected.as_ref(), Some(&forecast.daily[3]));
        assert_eq!(after.state, before.state);
        assert_eq!(after.content, before.content);
        assert_eq!(after.unit, before.unit);
        assert_eq!(after.query, before.query);
        assert_eq!(after.cities, before.cities);
        assert_eq!(after.forecast, before.forecast);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_search_goes_idle_and_keeps_selection() {
        let h = harness();
        h.session.select_city("Paris", false).await.unwrap();
        let selected = h.session.snapshot().selected;

        assert!(h.session.search_city("").is_none());
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.state, OperatingState::Idle);
        assert!(snapshot.query.is_empty());
        assert_eq!(snapshot.selected, selected);
    }

    #[tokio::test(start_paused = true)]
    async fn search_publishes_filtered_suggestions() {
        let h = harness();
        settle().await;
        let state = h.session.snapshot().state;

        h.session.search_city("san").unwrap().await.unwrap();
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.query, "san");
        assert_eq!(snapshot.cities, vec!["San Francisco", "San Diego"]);
        assert_eq!(snapshot.state, state);
    }

    #[tokio::test(start_paused = true)]
    async fn search_during_located_select_keeps_typed_query() {
        let h = harness();
        let handle = h.session.select_city("Oslo", true);
        tokio::time::sleep(Duration::from_millis(500)).await;
        h.session.search_city("Ber");

        handle.await.unwrap();
        assert_eq!(h.session.snapshot().query, "Ber");
        // Registration and the forecast load are still completed
        assert!(h.cities.list_cities(Some("Oslo")).await.unwrap().contains(&"Oslo".to_string()));
        assert!(h.session.snapshot().forecast.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn content_toggle_round_trip_leaves_other_fields() {
        let h = harness();
        h.session.search_city("Madrid");
        h.session.set_weather_unit(WeatherUnit::Imperial);

        h.session.set_content_state(ContentState::Detailed);
        assert_eq!(h.session.snapshot().content, ContentState::Detailed);
        h.session.set_content_state(ContentState::Simple);

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.content, ContentState::Simple);
        assert_eq!(snapshot.unit, WeatherUnit::Imperial);
        assert_eq!(snapshot.query, "Madrid");
    }

    #[tokio::test(start_paused = true)]
    async fn toggles() {
        let h = harness();
        h.session.toggle_weather_unit();
        h.session.toggle_content_state();
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.unit, WeatherUnit::Imperial);
        assert_eq!(snapshot.content, ContentState::Detailed);
    }

    #[tokio::test(start_paused = true)]
    async fn forecast_failure_reports_and_goes_idle() {
        let h = harness_with(Arc::new(BrokenForecasts), location(None));
        h.session.select_city("Paris", false).await.unwrap();

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.state, OperatingState::Idle);
        assert!(snapshot.forecast.is_none());
        assert!(matches!(
            snapshot.last_error,
            Some(SkyViewError::ProviderUnavailable(ref m)) if m == "backend offline"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn locate_with_fix_selects_located_city() {
        let h = harness_with(Arc::new(forecasts()), location(Some("Reykjavik")));
        h.session.locate().await.unwrap();

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.query, "Reykjavik");
        assert_eq!(snapshot.state, OperatingState::Running);
        assert!(h
            .cities
            .list_cities(None)
            .await
            .unwrap()
            .contains(&"Reykjavik".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn locate_without_fix_shows_location_error() {
        let h = harness();
        h.session.locate().await.unwrap();
        assert_eq!(h.session.snapshot().state, OperatingState::LocationError);

        tokio::time::sleep(GRACE + Duration::from_millis(1)).await;
        assert_eq!(h.session.snapshot().state, OperatingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn locate_with_services_disabled_goes_idle() {
        let disabled = Arc::new(ConfiguredLocation::new(LocationConfig {
            enabled: false,
            city: None,
        }));
        let h = harness_with(Arc::new(forecasts()), disabled);
        h.session.locate().await.unwrap();

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.state, OperatingState::Idle);
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn load_default_city() {
        let h = harness();
        h.session.load_default_city().await.unwrap();
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.query, "San Francisco");
        assert_eq!(snapshot.state, OperatingState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn locate_with_services_disabled_keeps_typed_query_running() {
        let disabled = Arc::new(ConfiguredLocation::new(LocationConfig {
            enabled: false,
            city: None,
        }));
        let h = harness_with(Arc::new(forecasts()), disabled);
        h.session.search_city("Par");
        h.session.locate().await.unwrap();

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.state, OperatingState::Running);
        assert_eq!(snapshot.query, "Par");
        assert!(matches!(
            snapshot.last_error,
            Some(SkyViewError::LocationUnavailable(_))
        ));
    }

    /// Answers one filter slowly, everything else immediately
    struct SlowCities {
        inner: FakeCityProvider,
        slow_filter: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl CityProvider for SlowCities {
        async fn list_cities(&self, filter: Option<&str>) -> Result<Vec<String>> {
            if filter == Some(self.slow_filter) {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.list_cities(filter).await
        }

        async fn default_city(&self) -> Result<String> {
            self.inner.default_city().await
        }

        async fn add_city(&self, name: &str) -> Result<()> {
            self.inner.add_city(name).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stale_suggestions_are_dropped() {
        let session = ForecastSession::start(
            Providers {
                cities: Arc::new(SlowCities {
                    inner: FakeCityProvider::new(),
                    slow_filter: "Lon",
                    delay: Duration::from_secs(2),
                }),
                forecasts: Arc::new(forecasts()),
                location: location(None),
            },
            SessionOptions::default(),
        );

        let lon = session.search_city("Lon").unwrap();
        let par = session.search_city("Par").unwrap();
        par.await.unwrap();
        assert_eq!(session.snapshot().cities, vec!["Paris"]);

        lon.await.unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.query, "Par");
        assert_eq!(snapshot.cities, vec!["Paris"]);
    }

    fn assert_selection_in_forecast(snapshot: &SessionSnapshot) {
        if let Some(ref selected) = snapshot.selected {
            let forecast = snapshot.forecast.as_ref().expect("selection without forecast");
            assert!(forecast.daily.contains(selected));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stale_load_publishes_nothing() {
        let h = harness();
        let stale = h.session.inner.begin_load();
        h.session.inner.begin_load();

        let forecast = forecasts().get_forecast("Paris").await.unwrap();
        assert!(!h.session.inner.publish_load(stale, forecast));

        let snapshot = h.session.snapshot();
        assert!(snapshot.forecast.is_none());
        assert!(snapshot.selected.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_newer_load_keeps_selection_in_forecast() {
        struct FailsFor(&'static str, FakeForecastProvider);

        #[async_trait]
        impl ForecastProvider for FailsFor {
            async fn get_forecast(&self, city: &str) -> Result<Forecast> {
                if city == self.0 {
                    return Err(SkyViewError::CityNotFound(city.to_string()));
                }
                self.1.get_forecast(city).await
            }
        }

        let h = harness_with(Arc::new(FailsFor("Atlantis", forecasts())), location(None));
        h.session.select_city("Paris", false).await.unwrap();
        let lima = h.session.select_city("Lima", false);
        let atlantis = h.session.select_city("Atlantis", false);
        lima.await.unwrap();
        atlantis.await.unwrap();

        let snapshot = h.session.snapshot();
        assert_selection_in_forecast(&snapshot);
        assert_eq!(snapshot.forecast.map(|f| f.city.clone()).as_deref(), Some("Paris"));
        assert_eq!(snapshot.state, OperatingState::Running);
        assert!(matches!(snapshot.last_error, Some(SkyViewError::CityNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn field_receivers_see_each_change() {
        let h = harness();
        let mut unit = h.session.weather_unit();
        let mut selected = h.session.selected_daily_forecast();
        let mut query = h.session.search_query();

        h.session.set_weather_unit(WeatherUnit::Imperial);
        assert!(unit.has_changed().unwrap());
        assert_eq!(*unit.borrow_and_update(), WeatherUnit::Imperial);
        assert!(!query.has_changed().unwrap());

        h.session.select_city("Rome", false).await.unwrap();
        assert!(query.has_changed().unwrap());
        assert!(selected.has_changed().unwrap());
        assert!(!unit.has_changed().unwrap());
    }
}
