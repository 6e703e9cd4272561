//! Intake: the two-stage wizard that creates the identity and the first
//! assessment.

pub mod controls;
pub mod state;
pub mod wizard;

pub use controls::{Domain, ResponseField};
pub use state::IntakeStage;
pub use wizard::{IntakeAction, IntakeWizard};
