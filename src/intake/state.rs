//! Intake state machine: which stage of the two-step wizard is active.

use serde::{Deserialize, Serialize};

/// Stages of the intake wizard.
///
/// Progresses linearly: CollectingProfile → CollectingResponses → Submitted.
/// A failed submission never advances; the stage keeps its inputs and an
/// error message instead. Restarting returns to CollectingProfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    #[default]
    CollectingProfile,
    CollectingResponses,
    Submitted,
}

impl IntakeStage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: IntakeStage) -> bool {
        use IntakeStage::*;
        matches!(
            (self, target),
            (CollectingProfile, CollectingResponses)
                | (CollectingResponses, Submitted)
                | (CollectingResponses, CollectingProfile)
                | (Submitted, CollectingProfile)
        )
    }

    /// Whether the wizard is done and has an assessment to hand off.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// The next stage in the forward progression, if any.
    pub fn next(&self) -> Option<IntakeStage> {
        use IntakeStage::*;
        match self {
            CollectingProfile => Some(CollectingResponses),
            CollectingResponses => Some(Submitted),
            Submitted => None,
        }
    }
}

impl std::fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CollectingProfile => "collecting_profile",
            Self::CollectingResponses => "collecting_responses",
            Self::Submitted => "submitted",
        };
        write!(f, "{s}")
    }
}
