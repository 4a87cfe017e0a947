//! Timesheet approval and rate engine for casual academic work.
//!
//! This crate implements the casual-academic timesheet lifecycle for an
//! Australian university enterprise agreement: Schedule 1 rate resolution
//! (rate code, associated hours, amount) over a temporally versioned policy
//! snapshot, repeat-session eligibility, and a role-gated approval state
//! machine with an append-only approval history, exposed over a JSON API.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod error;
pub mod models;
pub mod policy;
pub mod service;
pub mod workflow;
