//! Core data models for the timesheet engine.
//!
//! This module contains all the domain models used throughout the engine.

mod approval;
mod timesheet;
mod user;

pub use approval::{ApprovalAction, ApprovalRecord, ApprovalStatus};
pub use timesheet::{Qualification, TaskType, Timesheet};
pub use user::{Actor, Role};
