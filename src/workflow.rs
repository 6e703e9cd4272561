//! Workflow controller: route guards over the identity store.

use crate::api::AssessmentId;
use crate::identity::IdentityStore;

/// Screens of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    /// Intake entry point.
    Assessment,
    Result(AssessmentId),
    Recovery,
    Progress,
}

impl Screen {
    /// Whether entering this screen needs an active identity.
    pub fn requires_identity(&self) -> bool {
        matches!(self, Self::Recovery | Self::Progress)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Assessment => "Assessment",
            Self::Result(_) => "Result",
            Self::Recovery => "Recovery Plan",
            Self::Progress => "Progress",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Result(id) => write!(f, "result/{id}"),
            other => f.write_str(&other.title().to_ascii_lowercase().replace(' ', "_")),
        }
    }
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Enter(Screen),
    RedirectToIntake,
}

impl Navigation {
    /// The screen that ends up shown.
    pub fn destination(self) -> Screen {
        match self {
            Self::Enter(screen) => screen,
            Self::RedirectToIntake => Screen::Assessment,
        }
    }
}

/// Pure guard: identity-gated screens redirect to intake when no identity is held.
pub fn guard<T>(target: Screen, identity: Option<&T>) -> Navigation {
    if target.requires_identity() && identity.is_none() {
        Navigation::RedirectToIntake
    } else {
        Navigation::Enter(target)
    }
}

/// Guard a navigation against the current contents of `store`.
pub fn navigate(target: Screen, store: &IdentityStore) -> Navigation {
    let nav = guard(target, store.get().as_ref());
    if nav == Navigation::RedirectToIntake {
        tracing::debug!("No identity held; redirecting to intake");
    }
    nav
}

/// Menu entries to show: identity-gated screens only appear once an identity exists.
pub fn menu(has_identity: bool) -> Vec<Screen> {
    let mut items = vec![Screen::Home, Screen::Assessment];
    if has_identity {
        items.push(Screen::Recovery);
        items.push(Screen::Progress);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserId;

    #[test]
    fn gated_screens_redirect_without_identity() {
        let none: Option<&UserId> = None;
        assert_eq!(guard(Screen::Recovery, none), Navigation::RedirectToIntake);
        assert_eq!(guard(Screen::Progress, none), Navigation::RedirectToIntake);
        assert_eq!(guard(Screen::Home, none), Navigation::Enter(Screen::Home));
        assert_eq!(
            guard(Screen::Assessment, none),
            Navigation::Enter(Screen::Assessment)
        );
    }

    #[test]
    fn gated_screens_enter_with_identity() {
        let id = UserId::new("1");
        assert_eq!(
            guard(Screen::Recovery, Some(&id)),
            Navigation::Enter(Screen::Recovery)
        );
        assert_eq!(
            guard(Screen::Progress, Some(&id)).destination(),
            Screen::Progress
        );
    }

    #[test]
    fn redirect_destination_is_intake() {
        assert_eq!(Navigation::RedirectToIntake.destination(), Screen::Assessment);
    }

    #[test]
    fn navigate_reads_store() {
        let store = IdentityStore::in_memory();
        assert_eq!(
            navigate(Screen::Progress, &store),
            Navigation::RedirectToIntake
        );
        store.set(UserId::new("5")).unwrap();
        assert_eq!(
            navigate(Screen::Progress, &store),
            Navigation::Enter(Screen::Progress)
        );
    }

    #[test]
    fn menu_hides_gated_entries() {
        assert_eq!(menu(false), vec![Screen::Home, Screen::Assessment]);
        assert_eq!(menu(true).len(), 4);
        assert!(menu(true).contains(&Screen::Recovery));
    }

    #[test]
    fn screen_display() {
        assert_eq!(Screen::Recovery.to_string(), "recovery_plan");
        assert_eq!(
            Screen::Result(AssessmentId::new("3")).to_string(),
            "result/3"
        );
    }
}
