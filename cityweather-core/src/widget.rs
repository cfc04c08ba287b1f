//! The search widget: validate input, fetch once, render or report, go idle.

use tokio::sync::watch;

use crate::{
    error::WeatherError,
    model::{CityQuery, Observation},
    provider::WeatherProvider,
    render,
};

/// Whether a lookup is in flight. The flags a front end toggles are derived
/// from this, so they cannot disagree with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyState {
    #[default]
    Idle,
    Busy,
}

impl BusyState {
    /// The trigger's normal label ("Search").
    pub fn label_visible(self) -> bool {
        self == BusyState::Idle
    }

    /// The spinner shown in place of the label.
    pub fn loader_visible(self) -> bool {
        self == BusyState::Busy
    }

    pub fn trigger_enabled(self) -> bool {
        self == BusyState::Idle
    }
}

/// What the result area currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Empty,
    Error(String),
    Weather {
        observation: Observation,
        html: String,
    },
}

#[derive(Debug)]
pub struct Widget {
    provider: Box<dyn WeatherProvider>,
    view: View,
    busy: watch::Sender<BusyState>,
}

impl Widget {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        let (busy, _) = watch::channel(BusyState::Idle);
        Self {
            provider,
            view: View::Empty,
            busy,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn busy_state(&self) -> BusyState {
        *self.busy.borrow()
    }

    /// Observe busy-state changes, e.g. to draw a spinner while a lookup runs.
    pub fn subscribe(&self) -> watch::Receiver<BusyState> {
        self.busy.subscribe()
    }

    /// Run one search for `input`. Taking `&mut self` keeps a second search
    /// from starting while this one is outstanding.
    pub async fn submit(&mut self, input: &str) -> &View {
        self.view = View::Empty;

        let city = match CityQuery::parse(input) {
            Ok(city) => city,
            Err(err) => {
                self.view = View::Error(err.user_message());
                return &self.view;
            }
        };

        self.busy.send_replace(BusyState::Busy);
        let result = self.lookup(&city).await;
        self.busy.send_replace(BusyState::Idle);

        self.view = match result {
            Ok((observation, html)) => View::Weather { observation, html },
            Err(err) => {
                tracing::info!(%city, error = %err, "weather lookup failed");
                View::Error(err.user_message())
            }
        };

        &self.view
    }

    async fn lookup(&self, city: &CityQuery) -> Result<(Observation, String), WeatherError> {
        let observation = self.provider.current(city).await?;
        let html = render::render_html(&observation)?;
        Ok((observation, html))
    }
}
