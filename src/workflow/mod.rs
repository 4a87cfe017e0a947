//! Approval workflow: the role-gated lifecycle state machine.

pub mod state_machine;

pub use state_machine::{
    evaluate_transition, next_actions, Capability, TransitionRule, TRANSITION_TABLE,
};
