//! Recovery plan screen and its local completion checklist.

pub mod checklist;
pub mod manager;

pub use checklist::{Category, ChecklistKey, CompletionOverlay};
pub use manager::{
    ChecklistItem, DEFAULT_DISCLAIMER, Generation, PlanLookup, PlanView, RecoveryAction,
    RecoveryPlanManager, RecoveryState,
};
