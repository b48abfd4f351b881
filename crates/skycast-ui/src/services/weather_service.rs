//! Weather backend: async aggregation off the caller's thread.
//! Results are sent via mpsc, tagged with the generation of the request that produced them.

use std::sync::mpsc;

use skycast_weather::{LocationQuery, SharedAggregator, WeatherView};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Error type for weather operations
#[derive(Debug, Clone)]
pub enum WeatherError {
    /// The aggregation failed
    Fetch(skycast_weather::WeatherError),
    /// A search was submitted without a city
    EmptyQuery,
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherError::Fetch(e) => write!(f, "Weather error: {}", e),
            WeatherError::EmptyQuery => write!(f, "Search query is empty"),
        }
    }
}

impl std::error::Error for WeatherError {}

/// What a view asks the aggregator for
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    /// Home screen; `None` means the default city
    Home(Option<LocationQuery>),
    /// Search screen, with the typed city
    Search(String),
}

/// Messages sent from async operations back to the view
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of one aggregation
    FetchDone {
        generation: u64,
        result: Result<WeatherView, WeatherError>,
    },
}

/// Spawns one aggregation on `handle`.
///
/// Sends `FetchDone` when complete. If `token` is cancelled first, the task
/// stops at its next await and sends nothing.
pub fn request_fetch(
    handle: &Handle,
    tx: &mpsc::Sender<WeatherServiceMessage>,
    aggregator: SharedAggregator,
    request: FetchRequest,
    generation: u64,
    token: CancellationToken,
) {
    let tx = tx.clone();

    handle.spawn(async move {
        let fetch = async {
            match &request {
                FetchRequest::Home(query) => aggregator.aggregate(query.as_ref()).await,
                FetchRequest::Search(city) => aggregator.aggregate_search(city).await,
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(generation, "Weather fetch cancelled");
            }
            result = fetch => {
                if let Err(e) = &result {
                    tracing::error!("Failed to fetch weather: {}", e);
                }
                let _ = tx.send(WeatherServiceMessage::FetchDone {
                    generation,
                    result: result.map_err(WeatherError::Fetch),
                });
            }
        }
    });
}

/// One view's request slot: at most one live request at a time.
///
/// Starting a request cancels the previous one and bumps the generation;
/// results from older generations are dropped on receipt.
pub struct WeatherRequests {
    handle: Handle,
    shutdown: CancellationToken,
    tx: mpsc::Sender<WeatherServiceMessage>,
    rx: mpsc::Receiver<WeatherServiceMessage>,
    generation: u64,
    cancel_token: Option<CancellationToken>,
    in_flight: bool,
}

impl WeatherRequests {
    /// Request tokens are children of `shutdown`, so cancelling it stops every live request.
    pub fn new(handle: Handle, shutdown: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            handle,
            shutdown,
            tx,
            rx,
            generation: 0,
            cancel_token: None,
            in_flight: false,
        }
    }

    /// Supersedes any live request. Returns the new generation.
    pub fn start(&mut self, aggregator: SharedAggregator, request: FetchRequest) -> u64 {
        self.cancel();
        self.generation += 1;

        let token = self.shutdown.child_token();
        tracing::debug!(generation = self.generation, ?request, "Starting weather fetch");
        request_fetch(
            &self.handle,
            &self.tx,
            aggregator,
            request,
            self.generation,
            token.clone(),
        );

        self.cancel_token = Some(token);
        self.in_flight = true;
        self.generation
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.in_flight = false;
    }

    /// Non-blocking. Returns the result of the current generation, if it has arrived.
    pub fn try_recv(&mut self) -> Option<Result<WeatherView, WeatherError>> {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                WeatherServiceMessage::FetchDone { generation, result } => {
                    if generation != self.generation || !self.in_flight {
                        tracing::debug!(generation, "Ignoring stale weather result");
                        continue;
                    }
                    self.in_flight = false;
                    self.cancel_token = None;
                    return Some(result);
                }
            }
        }
        None
    }

    /// False once the request finished, was cancelled, or the app shut down.
    pub fn in_flight(&self) -> bool {
        self.in_flight && !self.shutdown.is_cancelled()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for WeatherRequests {
    fn drop(&mut self) {
        self.cancel();
    }
}
