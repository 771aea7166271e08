//! Smart-scale pairing flow: Searching -> Connecting -> Connected.

use super::{SequencerTimings, StateMachine, Step};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingState {
    Searching,
    Connecting,
    Connected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairingEvent {
    /// Begin scanning for the scale
    Start,
    /// Search timer fired
    DeviceFound,
    /// Connect timer fired
    LinkEstablished,
    /// Drop whatever is in progress and search again
    Restart,
}

#[derive(Clone, Debug, Default)]
pub struct PairingMachine {
    timings: SequencerTimings,
}

impl PairingMachine {
    pub fn new(timings: SequencerTimings) -> Self {
        Self { timings }
    }
}

impl StateMachine for PairingMachine {
    type State = PairingState;
    type Event = PairingEvent;

    fn initial(&self) -> PairingState {
        PairingState::Searching
    }

    fn update(&mut self, state: PairingState, event: PairingEvent) -> Step<PairingState, PairingEvent> {
        use PairingEvent::*;
        use PairingState::*;

        match (state, event) {
            (_, Restart) | (Searching, Start) => Step::after(
                Searching,
                self.timings.search_delay(),
                DeviceFound,
            ),
            (Searching, DeviceFound) => {
                tracing::info!("Scale found, connecting");
                Step::after(Connecting, self.timings.connect_delay(), LinkEstablished)
            }
            (Connecting, LinkEstablished) => {
                tracing::info!("Scale connected");
                Step::stay(Connected)
            }
            (state, event) => {
                tracing::debug!("Pairing ignores {:?} while {:?}", event, state);
                Step::stay(state)
            }
        }
    }

    fn is_terminal(&self, state: PairingState) -> bool {
        state == PairingState::Connected
    }
}
