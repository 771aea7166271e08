//! AI meal-scan flow.
//!
//! Idle -> DetectingScale -> DetectingDish -> Ready | Error. The final
//! outcome comes from the injected `DecisionSource`.

use super::{DecisionSource, RandomDecision, SequencerTimings, StateMachine, Step};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Idle,
    DetectingScale,
    DetectingDish,
    Ready,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanEvent {
    Start,
    ScaleDetected,
    DishAnalyzed,
    Reset,
}

#[derive(Debug)]
pub struct ScanMachine<D: DecisionSource = RandomDecision> {
    timings: SequencerTimings,
    decision: D,
}

impl<D: DecisionSource> ScanMachine<D> {
    pub fn new(timings: SequencerTimings, decision: D) -> Self {
        Self { timings, decision }
    }
}

impl<D: DecisionSource> StateMachine for ScanMachine<D> {
    type State = ScanState;
    type Event = ScanEvent;

    fn initial(&self) -> ScanState {
        ScanState::Idle
    }

    fn update(&mut self, state: ScanState, event: ScanEvent) -> Step<ScanState, ScanEvent> {
        match (state, event) {
            (_, ScanEvent::Reset) => Step::stay(ScanState::Idle),
            (ScanState::Idle | ScanState::Ready | ScanState::Error, ScanEvent::Start) => {
                Step::after(
                    ScanState::DetectingScale,
                    self.timings.scale_delay(),
                    ScanEvent::ScaleDetected,
                )
            }
            (ScanState::DetectingScale, ScanEvent::ScaleDetected) => Step::after(
                ScanState::DetectingDish,
                self.timings.dish_delay(),
                ScanEvent::DishAnalyzed,
            ),
            (ScanState::DetectingDish, ScanEvent::DishAnalyzed) => {
                if self.decision.decide(self.timings.scan_success_probability) {
                    tracing::info!("Meal scan recognised the dish");
                    Step::stay(ScanState::Ready)
                } else {
                    tracing::warn!("Meal scan could not recognise the dish");
                    Step::stay(ScanState::Error)
                }
            }
            (state, event) => {
                tracing::debug!("Scan ignores {:?} while {:?}", event, state);
                Step::stay(state)
            }
        }
    }

    fn is_terminal(&self, state: ScanState) -> bool {
        matches!(state, ScanState::Ready | ScanState::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{run, FixedDecision, InstantScheduler};

    fn scan_with(outcome: bool) -> (ScanState, Vec<ScanState>, InstantScheduler) {
        let mut machine = ScanMachine::new(SequencerTimings::default(), FixedDecision(outcome));
        let mut scheduler = InstantScheduler::new();
        let mut visited = Vec::new();
        let end = run(&mut machine, ScanEvent::Start, &mut scheduler, |s| {
            visited.push(s)
        })
        .unwrap();
        (end, visited, scheduler)
    }

    #[test]
    fn test_successful_scan() {
        let (end, visited, scheduler) = scan_with(true);

        assert_eq!(end, ScanState::Ready);
        assert_eq!(
            visited,
            vec![
                ScanState::Idle,
                ScanState::DetectingScale,
                ScanState::DetectingDish,
                ScanState::Ready
            ]
        );

        let timings = SequencerTimings::default();
        assert_eq!(
            scheduler.waited,
            vec![timings.scale_delay(), timings.dish_delay()]
        );
    }

    #[test]
    fn test_failed_scan() {
        let (end, visited, _) = scan_with(false);
        assert_eq!(end, ScanState::Error);
        assert_eq!(visited.last(), Some(&ScanState::Error));
    }

    #[test]
    fn test_retry_after_error() {
        let mut machine = ScanMachine::new(SequencerTimings::default(), FixedDecision(false));
        let step = machine.update(ScanState::Error, ScanEvent::Start);
        assert_eq!(step.state, ScanState::DetectingScale);
        assert_eq!(step.next.unwrap().event, ScanEvent::ScaleDetected);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut machine = ScanMachine::new(SequencerTimings::default(), FixedDecision(true));
        for state in [
            ScanState::Idle,
            ScanState::DetectingScale,
            ScanState::DetectingDish,
            ScanState::Ready,
            ScanState::Error,
        ] {
            let step = machine.update(state, ScanEvent::Reset);
            assert_eq!(step.state, ScanState::Idle);
            assert!(step.next.is_none());
        }
    }

    #[test]
    fn test_start_ignored_mid_scan() {
        let mut machine = ScanMachine::new(SequencerTimings::default(), FixedDecision(true));
        let step = machine.update(ScanState::DetectingDish, ScanEvent::Start);
        assert_eq!(step.state, ScanState::DetectingDish);
        assert!(step.next.is_none());
    }

    #[test]
    fn test_seeded_random_scan_is_reproducible() {
        let outcome = |seed| {
            let mut machine =
                ScanMachine::new(SequencerTimings::default(), RandomDecision::seeded(seed));
            run(
                &mut machine,
                ScanEvent::Start,
                &mut InstantScheduler::new(),
                |_| {},
            )
            .unwrap()
        };

        for seed in 0..10 {
            assert_eq!(outcome(seed), outcome(seed));
        }
    }
}
