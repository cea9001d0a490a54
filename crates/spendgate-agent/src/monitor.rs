//! Debounced re-evaluation of a changing context
//!
//! A screen rebuilds its [`ValidationContext`] on every input change and hands
//! it to [`MonitorHandle::update`]. The monitor task waits until the input has
//! been quiet for the configured debounce, evaluates once, and publishes the
//! result on a watch channel. Level transitions are recorded as
//! [`DecisionEvent`]s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use spendgate_core::{PolicyEngine, ValidationContext, ValidationResult};

use crate::error::{AgentError, Result};
use crate::telemetry::{DecisionEvent, PolicyMetrics, TransitionTracker};

/// Default quiet period before re-evaluating
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Default capacity of the decision event queue
pub const DEFAULT_EVENT_QUEUE_SIZE: usize = 1000;

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Quiet period required before an update is evaluated
    pub debounce: Duration,

    /// Capacity of the decision event queue; events beyond it are dropped
    pub event_queue_size: usize,

    /// Profile label for metrics and events; defaults to the engine name
    pub profile: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            event_queue_size: DEFAULT_EVENT_QUEUE_SIZE,
            profile: None,
        }
    }
}

impl MonitorConfig {
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    /// Load configuration from environment variables
    ///
    /// Reads `SPENDGATE_DEBOUNCE_MS`, `SPENDGATE_EVENT_QUEUE_SIZE` and
    /// `SPENDGATE_PROFILE`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("SPENDGATE_DEBOUNCE_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                AgentError::invalid_input(format!(
                    "SPENDGATE_DEBOUNCE_MS must be an integer, got '{}'",
                    raw
                ))
            })?;
            config.debounce = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("SPENDGATE_EVENT_QUEUE_SIZE") {
            let size: usize = raw.trim().parse().map_err(|_| {
                AgentError::invalid_input(format!(
                    "SPENDGATE_EVENT_QUEUE_SIZE must be an integer, got '{}'",
                    raw
                ))
            })?;
            config.event_queue_size = size;
        }

        if let Some(profile) = lookup("SPENDGATE_PROFILE") {
            let profile = profile.trim();
            if !profile.is_empty() {
                config.profile = Some(profile.to_string());
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.event_queue_size == 0 {
            return Err(AgentError::invalid_input(
                "event queue size must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Builder for [`MonitorConfig`]
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce = debounce;
        self
    }

    pub fn event_queue_size(mut self, size: usize) -> Self {
        self.config.event_queue_size = size;
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config.profile = Some(profile.into());
        self
    }

    pub fn build(self) -> Result<MonitorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Evaluation state owned by the monitor task
struct MonitorState {
    engine: Arc<PolicyEngine>,
    profile: String,
    tracker: TransitionTracker,
    events: mpsc::Sender<DecisionEvent>,
    metrics: Option<Arc<PolicyMetrics>>,
}

impl MonitorState {
    fn evaluate(&mut self, context: &ValidationContext) -> ValidationResult {
        let started = Instant::now();
        let result = self.engine.evaluate(context);
        let elapsed = started.elapsed().as_secs_f64();

        tracing::debug!(
            profile = %self.profile,
            level = %result.level,
            rule = result.triggered_by.as_deref().unwrap_or("default"),
            "Evaluated context"
        );

        let previous = self.tracker.last_level();
        if let Some(metrics) = &self.metrics {
            metrics.record_evaluation(&self.profile, &result, elapsed);
        }

        if let Some(event) = self.tracker.observe(context, &result) {
            tracing::info!(
                profile = %event.profile,
                event_id = %event.event_id,
                "{}",
                event.summary()
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_transition(previous, event.level);
            }
            if let Err(e) = self.events.try_send(event) {
                tracing::warn!(profile = %self.profile, error = %e, "Dropped decision event");
            }
        }

        result
    }
}

/// Spawns monitor tasks
pub struct ValidationMonitor;

impl ValidationMonitor {
    /// Start monitoring `initial`; must be called inside a tokio runtime
    ///
    /// The initial context is evaluated before this returns, so
    /// [`MonitorHandle::latest`] is available immediately.
    pub fn spawn(
        engine: Arc<PolicyEngine>,
        config: MonitorConfig,
        initial: ValidationContext,
    ) -> MonitorHandle {
        Self::spawn_with_metrics(engine, config, initial, None)
    }

    /// Like [`ValidationMonitor::spawn`], recording every evaluation in `metrics`
    pub fn spawn_with_metrics(
        engine: Arc<PolicyEngine>,
        config: MonitorConfig,
        initial: ValidationContext,
        metrics: Option<Arc<PolicyMetrics>>,
    ) -> MonitorHandle {
        let profile = config
            .profile
            .clone()
            .unwrap_or_else(|| engine.name().to_string());
        let (events_tx, events_rx) = mpsc::channel(config.event_queue_size.max(1));

        let mut state = MonitorState {
            engine,
            tracker: TransitionTracker::new(profile.clone()),
            profile,
            events: events_tx,
            metrics,
        };

        let first = state.evaluate(&initial);
        let (input_tx, input_rx) = watch::channel(initial);
        let (output_tx, output_rx) = watch::channel(first);

        let task = tokio::spawn(run(state, config.debounce, input_rx, output_tx));

        MonitorHandle {
            input: input_tx,
            results: output_rx,
            events: events_rx,
            task,
        }
    }
}

async fn run(
    mut state: MonitorState,
    debounce: Duration,
    mut input: watch::Receiver<ValidationContext>,
    output: watch::Sender<ValidationResult>,
) {
    let mut closed = false;

    while !closed {
        if input.changed().await.is_err() {
            break;
        }

        // Wait for the input to settle
        loop {
            tokio::select! {
                changed = input.changed() => {
                    if changed.is_err() {
                        closed = true;
                        break;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let context = input.borrow_and_update().clone();
        let result = state.evaluate(&context);
        output.send_replace(result);
    }

    tracing::debug!(profile = %state.profile, "Monitor stopped");
}

/// Handle to a running monitor
pub struct MonitorHandle {
    input: watch::Sender<ValidationContext>,
    results: watch::Receiver<ValidationResult>,
    events: mpsc::Receiver<DecisionEvent>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Publish a new context for evaluation
    pub fn update(&self, context: ValidationContext) -> Result<()> {
        self.input
            .send(context)
            .map_err(|_| AgentError::InternalError("monitor task has stopped".to_string()))
    }

    /// Receiver for published results
    pub fn results(&self) -> watch::Receiver<ValidationResult> {
        self.results.clone()
    }

    /// Most recently published result
    pub fn latest(&self) -> ValidationResult {
        self.results.borrow().clone()
    }

    /// Drain the decision events queued so far
    pub fn take_events(&mut self) -> Vec<DecisionEvent> {
        drain(&mut self.events)
    }

    /// Wait for the next decision event
    pub async fn next_event(&mut self) -> Option<DecisionEvent> {
        self.events.recv().await
    }

    /// Stop the monitor and return any events not yet taken
    ///
    /// A context still inside its debounce window is evaluated before the
    /// task exits.
    pub async fn shutdown(self) -> Result<Vec<DecisionEvent>> {
        let MonitorHandle {
            input,
            mut events,
            task,
            ..
        } = self;

        drop(input);
        task.await
            .map_err(|e| AgentError::InternalError(format!("monitor task failed: {}", e)))?;
        Ok(drain(&mut events))
    }
}

fn drain(events: &mut mpsc::Receiver<DecisionEvent>) -> Vec<DecisionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
