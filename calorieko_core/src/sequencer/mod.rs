//! Timed state machines for the scale-pairing and meal-scan flows.
//!
//! Each flow is a reducer: `update(state, event)` returns the next state and
//! optionally a timer to arm. Time and randomness are injected:
//! - `Scheduler` performs (and may cancel) the waits
//! - `DecisionSource` settles the meal scan's success roll
//!
//! `run` ties them together and reports every state it passes through.

pub mod pairing;
pub mod scan;

use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use pairing::{PairingEvent, PairingMachine, PairingState};
pub use scan::{ScanEvent, ScanMachine, ScanState};

// ============================================================================
// Reducer Contract
// ============================================================================

/// A timer request: deliver `event` once `after` has elapsed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled<E> {
    pub after: Duration,
    pub event: E,
}

/// Result of feeding one event to a machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step<S, E> {
    pub state: S,
    pub next: Option<Scheduled<E>>,
}

impl<S, E> Step<S, E> {
    /// Settle in `state` with no pending timer
    pub fn stay(state: S) -> Self {
        Self { state, next: None }
    }

    /// Move to `state` and arm a timer for `event`
    pub fn after(state: S, after: Duration, event: E) -> Self {
        Self {
            state,
            next: Some(Scheduled { after, event }),
        }
    }
}

pub trait StateMachine {
    type State: Copy + Eq + Debug;
    type Event: Copy + Debug;

    fn initial(&self) -> Self::State;

    fn update(&mut self, state: Self::State, event: Self::Event) -> Step<Self::State, Self::Event>;

    fn is_terminal(&self, state: Self::State) -> bool;
}

// ============================================================================
// Scheduling
// ============================================================================

/// Performs the delays a machine asks for
pub trait Scheduler {
    /// Block until `delay` has passed; `Error::Cancelled` if aborted first
    fn wait(&mut self, delay: Duration) -> Result<()>;
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn wait(&mut self, delay: Duration) -> Result<()> {
        (**self).wait(delay)
    }
}

/// Shared flag used to abort pending waits (e.g. on screen teardown)
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wall-clock scheduler that sleeps in short slices so cancellation is prompt
#[derive(Clone, Debug)]
pub struct ThreadScheduler {
    token: CancelToken,
    slice: Duration,
}

impl ThreadScheduler {
    pub fn new(token: CancelToken) -> Self {
        Self {
            token,
            slice: Duration::from_millis(20),
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn wait(&mut self, delay: Duration) -> Result<()> {
        let deadline = Instant::now() + delay;
        loop {
            if self.token.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(self.slice.min(deadline - now));
        }
    }
}

/// Scheduler that returns immediately and records every requested delay
#[derive(Clone, Debug, Default)]
pub struct InstantScheduler {
    pub waited: Vec<Duration>,
}

impl InstantScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> Duration {
        self.waited.iter().sum()
    }
}

impl Scheduler for InstantScheduler {
    fn wait(&mut self, delay: Duration) -> Result<()> {
        self.waited.push(delay);
        Ok(())
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// Source of pass/fail outcomes for probabilistic transitions
pub trait DecisionSource {
    fn decide(&mut self, success_probability: f64) -> bool;
}

impl<D: DecisionSource + ?Sized> DecisionSource for Box<D> {
    fn decide(&mut self, success_probability: f64) -> bool {
        (**self).decide(success_probability)
    }
}

/// Always returns the same outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDecision(pub bool);

impl DecisionSource for FixedDecision {
    fn decide(&mut self, _success_probability: f64) -> bool {
        self.0
    }
}

/// Coin flip backed by `rand`
#[derive(Debug)]
pub struct RandomDecision {
    rng: StdRng,
}

impl RandomDecision {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible outcomes for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDecision {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionSource for RandomDecision {
    fn decide(&mut self, success_probability: f64) -> bool {
        let p = if success_probability.is_nan() {
            0.0
        } else {
            success_probability.clamp(0.0, 1.0)
        };
        self.rng.gen_bool(p)
    }
}

// ============================================================================
// Timings
// ============================================================================

/// Delays and odds for the scripted flows
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SequencerTimings {
    #[serde(default = "default_search_ms")]
    pub search_ms: u64,

    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,

    #[serde(default = "default_scale_ms")]
    pub scale_ms: u64,

    #[serde(default = "default_dish_ms")]
    pub dish_ms: u64,

    #[serde(default = "default_scan_success_probability")]
    pub scan_success_probability: f64,
}

fn default_search_ms() -> u64 {
    2000
}

fn default_connect_ms() -> u64 {
    1500
}

fn default_scale_ms() -> u64 {
    1500
}

fn default_dish_ms() -> u64 {
    2500
}

fn default_scan_success_probability() -> f64 {
    0.8
}

impl Default for SequencerTimings {
    fn default() -> Self {
        Self {
            search_ms: default_search_ms(),
            connect_ms: default_connect_ms(),
            scale_ms: default_scale_ms(),
            dish_ms: default_dish_ms(),
            scan_success_probability: default_scan_success_probability(),
        }
    }
}

impl SequencerTimings {
    pub fn validate(&self) -> Result<()> {
        let p = self.scan_success_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::Config(format!(
                "scan_success_probability must be within 0..=1, got {}",
                p
            )));
        }
        Ok(())
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_ms)
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn scale_delay(&self) -> Duration {
        Duration::from_millis(self.scale_ms)
    }

    pub fn dish_delay(&self) -> Duration {
        Duration::from_millis(self.dish_ms)
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Drive `machine` from its initial state until no timer is pending
///
/// `observe` sees the initial state and every state entered afterwards.
/// A cancelled wait aborts the run with `Error::Cancelled`.
pub fn run<M, S, F>(
    machine: &mut M,
    start: M::Event,
    scheduler: &mut S,
    mut observe: F,
) -> Result<M::State>
where
    M: StateMachine,
    S: Scheduler,
    F: FnMut(M::State),
{
    let mut state = machine.initial();
    observe(state);

    let mut step = machine.update(state, start);
    loop {
        if step.state != state {
            tracing::debug!("Sequencer transition {:?} -> {:?}", state, step.state);
            state = step.state;
            observe(state);
        }

        match step.next {
            None => break,
            Some(pending) => {
                scheduler.wait(pending.after)?;
                step = machine.update(state, pending.event);
            }
        }
    }

    if !machine.is_terminal(state) {
        tracing::warn!("Sequencer settled in non-terminal state {:?}", state);
    }

    Ok(state)
}
