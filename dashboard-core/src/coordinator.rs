//! Background fetches reconciled onto a single owner task.
//!
//! Every dispatch spawns one short-lived worker task. The worker calls the
//! [`WeatherSource`] and sends exactly one [`FetchMessage`] on an unbounded
//! channel; it never touches dashboard state. The owner drains the channel
//! on a fixed interval and applies every queued message, in arrival order,
//! before sleeping again.
//!
//! There is no cancellation and no coalescing. Two requests for the same
//! city both run to completion and both results are applied, in whatever
//! order the network returns them.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    time::MissedTickBehavior,
};

use crate::{
    comparison::{self, ComparisonRow},
    error::{FetchResult, WeatherError},
    model::{CurrentPayload, FetchRequest, ForecastPayload, RequestKind},
    provider::WeatherSource,
};

/// Poll period used when the caller has no preference.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one worker, tagged with what it was fetching.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchMessage {
    Current {
        city: String,
        result: FetchResult<CurrentPayload>,
    },
    Forecast {
        city: String,
        days: u32,
        result: FetchResult<ForecastPayload>,
    },
    /// Rows for the cities that could be fetched; failures are already
    /// dropped.
    Comparison {
        cities: Vec<String>,
        rows: Vec<ComparisonRow>,
    },
}

impl FetchMessage {
    /// The city a single-city message belongs to.
    pub fn city(&self) -> Option<&str> {
        match self {
            Self::Current { city, .. } | Self::Forecast { city, .. } => Some(city),
            Self::Comparison { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Current { result, .. } => result.is_ok(),
            Self::Forecast { result, .. } => result.is_ok(),
            Self::Comparison { rows, .. } => !rows.is_empty(),
        }
    }

    fn aborted(job: &Job) -> Self {
        match job {
            Job::Single(FetchRequest { city, kind }) => {
                let err = WeatherError::WorkerAborted(city.clone());
                let city = city.clone();
                match *kind {
                    RequestKind::Current => Self::Current {
                        city,
                        result: Err(err),
                    },
                    RequestKind::Forecast { days } => Self::Forecast {
                        city,
                        days,
                        result: Err(err),
                    },
                }
            }
            Job::Comparison(cities) => Self::Comparison {
                cities: cities.clone(),
                rows: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Job {
    Single(FetchRequest),
    Comparison(Vec<String>),
}

/// Sends the worker's message exactly once, even if the worker is dropped
/// or panics before it finishes.
struct Reply {
    tx: UnboundedSender<FetchMessage>,
    fallback: Option<FetchMessage>,
}

impl Reply {
    fn send(mut self, message: FetchMessage) {
        self.fallback = None;
        // The owner may already be gone; nothing left to update then.
        let _ = self.tx.send(message);
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if let Some(message) = self.fallback.take() {
            tracing::warn!(?message, "Worker stopped before reporting");
            let _ = self.tx.send(message);
        }
    }
}

pub struct FetchCoordinator {
    source: Arc<dyn WeatherSource>,
    tx: UnboundedSender<FetchMessage>,
    rx: UnboundedReceiver<FetchMessage>,
    poll_interval: Duration,
    pending: usize,
}

impl FetchCoordinator {
    pub fn new(source: Arc<dyn WeatherSource>, poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            tx,
            rx,
            poll_interval,
            pending: 0,
        }
    }

    /// Workers dispatched whose message has not been drained yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Spawn a worker for a single request. Must be called inside a tokio
    /// runtime.
    pub fn dispatch(&mut self, request: FetchRequest) {
        tracing::info!(city = %request.city, kind = ?request.kind, "Dispatching fetch");
        self.spawn(Job::Single(request));
    }

    pub fn dispatch_current(&mut self, city: impl Into<String>) {
        self.dispatch(FetchRequest::current(city));
    }

    pub fn dispatch_forecast(&mut self, city: impl Into<String>, days: u32) {
        self.dispatch(FetchRequest::forecast_days(city, days));
    }

    /// One worker fetching every city in turn.
    pub fn dispatch_comparison(&mut self, cities: Vec<String>) {
        tracing::info!(count = cities.len(), "Dispatching comparison");
        self.spawn(Job::Comparison(cities));
    }

    fn spawn(&mut self, job: Job) {
        let reply = Reply {
            tx: self.tx.clone(),
            fallback: Some(FetchMessage::aborted(&job)),
        };
        let source = Arc::clone(&self.source);
        self.pending += 1;

        tokio::spawn(async move {
            let message = run_job(source.as_ref(), job).await;
            reply.send(message);
        });
    }

    /// Take every message queued so far, oldest first, without waiting.
    pub fn drain(&mut self) -> Vec<FetchMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            messages.push(message);
        }
        messages
    }

    /// The poll loop: every tick, drain and apply all queued messages.
    /// Returns once every dispatched worker has been reconciled.
    pub async fn run_until_idle<F>(&mut self, mut apply: F)
    where
        F: FnMut(FetchMessage),
    {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.pending > 0 {
            ticker.tick().await;
            for message in self.drain() {
                apply(message);
            }
        }
    }
}

async fn run_job(source: &dyn WeatherSource, job: Job) -> FetchMessage {
    match job {
        Job::Single(FetchRequest { city, kind }) => match kind {
            RequestKind::Current => {
                let result = source.fetch_current(&city).await;
                FetchMessage::Current { city, result }
            }
            RequestKind::Forecast { days } => {
                let result = source.fetch_forecast(&city, days).await;
                FetchMessage::Forecast { city, days, result }
            }
        },
        Job::Comparison(cities) => {
            let rows = comparison::fetch_comparison(source, &cities).await;
            FetchMessage::Comparison { cities, rows }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Source with per-city latency; "Atlantis" is unknown, "Offline" fails
    /// in transport and "Crash" panics.
    #[derive(Debug, Default)]
    struct Scripted {
        latency_ms: HashMap<&'static str, u64>,
    }

    impl Scripted {
        fn with(latency: &[(&'static str, u64)]) -> Arc<Self> {
            Arc::new(Self {
                latency_ms: latency.iter().copied().collect(),
            })
        }

        async fn wait(&self, city: &str) {
            let ms = self.latency_ms.get(city).copied().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    #[async_trait]
    impl WeatherSource for Scripted {
        async fn fetch_current(&self, city: &str) -> FetchResult<CurrentPayload> {
            self.wait(city).await;
            match city {
                "Atlantis" => Err(WeatherError::CityNotFound(city.into())),
                "Offline" => Err(WeatherError::network(city, "connection refused")),
                "Crash" => panic!("worker blew up"),
                _ => Ok(CurrentPayload(fixtures::current(city, 12.0, 60, 1010, "few clouds"))),
            }
        }

        async fn fetch_forecast(&self, city: &str, _days: u32) -> FetchResult<ForecastPayload> {
            self.wait(city).await;
            Ok(ForecastPayload(fixtures::forecast(city, Vec::new())))
        }
    }

    fn coordinator(source: Arc<Scripted>) -> FetchCoordinator {
        FetchCoordinator::new(source, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn results_apply_in_completion_order() {
        let mut coord = coordinator(Scripted::with(&[("Paris", 500), ("Oslo", 50)]));

        coord.dispatch_current("Paris");
        coord.dispatch_current("Oslo");
        assert_eq!(coord.pending(), 2);

        let mut seen = Vec::new();
        coord
            .run_until_idle(|m| seen.push(m.city().map(String::from)))
            .await;

        assert_eq!(seen, [Some("Oslo".to_string()), Some("Paris".to_string())]);
        assert_eq!(coord.pending(), 0);
        assert!(coord.drain().is_empty());
    }

    #[tokio::test]
    async fn burst_is_retired_in_one_drain() {
        let mut coord = coordinator(Scripted::with(&[]));

        for city in ["Lima", "Oslo", "Kyoto"] {
            coord.dispatch_current(city);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut cities: Vec<String> = coord
            .drain()
            .iter()
            .filter_map(|m| m.city().map(String::from))
            .collect();
        cities.sort();

        assert_eq!(cities, ["Kyoto", "Lima", "Oslo"]);
        assert_eq!(coord.pending(), 0);
        assert!(coord.drain().is_empty());
    }

    #[tokio::test]
    async fn loop_survives_a_failure() {
        let mut coord = coordinator(Scripted::with(&[("Atlantis", 10), ("Oslo", 80)]));

        coord.dispatch_current("Atlantis");
        coord.dispatch_current("Oslo");

        let mut seen = Vec::new();
        coord.run_until_idle(|m| seen.push(m)).await;

        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            FetchMessage::Current {
                city: "Atlantis".into(),
                result: Err(WeatherError::CityNotFound("Atlantis".into())),
            }
        );
        assert!(seen[1].is_success());
        assert_eq!(seen[1].city(), Some("Oslo"));
    }

    #[tokio::test]
    async fn loop_survives_a_transport_failure() {
        let mut coord = coordinator(Scripted::with(&[("Offline", 10), ("Oslo", 80)]));

        coord.dispatch_current("Offline");
        coord.dispatch_current("Oslo");

        let mut seen = Vec::new();
        coord.run_until_idle(|m| seen.push(m)).await;

        assert_eq!(seen.len(), 2);
        let FetchMessage::Current {
            city,
            result: Err(err),
        } = &seen[0]
        else {
            panic!("expected a failed current fetch, got {:?}", seen[0]);
        };
        assert_eq!(city, "Offline");
        assert!(matches!(err, WeatherError::Network { .. }));
        assert!(err.is_transient());
        assert!(seen[1].is_success());
        assert_eq!(seen[1].city(), Some("Oslo"));

        coord.dispatch_current("Lima");
        let mut later = Vec::new();
        coord.run_until_idle(|m| later.push(m)).await;

        assert_eq!(later.len(), 1);
        assert!(later[0].is_success());
        assert_eq!(later[0].city(), Some("Lima"));
    }

    #[tokio::test]
    async fn panicking_worker_still_reports_once() {
        let mut coord = coordinator(Scripted::with(&[]));

        coord.dispatch_current("Crash");
        coord.dispatch_current("Oslo");

        let mut seen = Vec::new();
        coord.run_until_idle(|m| seen.push(m)).await;

        assert_eq!(seen.len(), 2);
        let crash = seen.iter().find(|m| m.city() == Some("Crash")).unwrap();
        assert_eq!(
            crash,
            &FetchMessage::Current {
                city: "Crash".into(),
                result: Err(WeatherError::WorkerAborted("Crash".into())),
            }
        );
    }

    #[tokio::test]
    async fn duplicate_requests_both_deliver() {
        let mut coord = coordinator(Scripted::with(&[]));

        coord.dispatch_current("Oslo");
        coord.dispatch_current("Oslo");

        let mut count = 0;
        coord.run_until_idle(|_| count += 1).await;
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn comparison_is_one_message() {
        let mut coord = coordinator(Scripted::with(&[("Oslo", 20), ("Lima", 20)]));

        coord.dispatch_comparison(vec!["Oslo".into(), "Atlantis".into(), "Lima".into()]);
        assert_eq!(coord.pending(), 1);

        let mut seen = Vec::new();
        coord.run_until_idle(|m| seen.push(m)).await;

        assert_eq!(seen.len(), 1);
        let FetchMessage::Comparison { cities, rows } = &seen[0] else {
            panic!("expected a comparison message, got {:?}", seen[0]);
        };
        assert_eq!(cities.len(), 3);
        let names: Vec<&str> = rows.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(names, ["Oslo", "Lima"]);
    }

    #[tokio::test]
    async fn forecast_message_keeps_day_count() {
        let mut coord = coordinator(Scripted::with(&[]));
        coord.dispatch(FetchRequest::forecast("Oslo"));

        let mut seen = Vec::new();
        coord.run_until_idle(|m| seen.push(m)).await;

        assert!(matches!(
            &seen[0],
            FetchMessage::Forecast {
                city,
                days: 5,
                result: Ok(_),
            } if city == "Oslo"
        ));
    }

    #[tokio::test]
    async fn idle_loop_returns_immediately() {
        let mut coord = coordinator(Scripted::with(&[]));
        let mut count = 0;
        coord.run_until_idle(|_| count += 1).await;
        assert_eq!(count, 0);
    }
}
