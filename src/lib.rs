//! Burnout Tracker: client for the burnout Assessment API.
//!
//! Screens are explicit state machines over an injected [`api::AssessmentApi`]
//! and a shared [`identity::IdentityStore`]; [`cli`] drives them from a
//! terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod intake;
pub mod progress;
pub mod recovery;
pub mod result;
pub mod screen;
pub mod workflow;
