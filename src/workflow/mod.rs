pub mod flow_controller;
pub mod flow_state;

pub use flow_controller::{FlowController, TriggerOutcome};
pub use flow_state::{FlowFailure, FlowKind, FlowOutcome, FlowState, OutcomeCategory, ResultView, Tone};
