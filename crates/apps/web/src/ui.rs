//! AR page panels
//!
//! The page carries a fixed set of elements; each state maps to which of
//! them are shown and which classes the body carries.

pub const ENTER_AR: &str = "enter-ar";
pub const ENTER_AR_INFO: &str = "enter-ar-info";
pub const UNSUPPORTED_INFO: &str = "unsupported-info";
pub const STABILIZATION: &str = "stabilization";
pub const SCALE_SLIDER: &str = "scale-slider";

/// Body class while a session is running
pub const AR_CLASS: &str = "ar";
/// Body class once hit-testing found a surface
pub const STABILIZED_CLASS: &str = "stabilized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArUiState {
    /// Capability query in flight
    #[default]
    Checking,
    EnterAr,
    InAr {
        stabilized: bool,
    },
    /// Capability missing or session request failed; terminal
    Unsupported,
}

/// Element visibility for one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    pub enter_ar: bool,
    pub enter_ar_info: bool,
    pub unsupported_info: bool,
    pub stabilization: bool,
}

impl PanelVisibility {
    /// `(element id, visible)` pairs in a stable order
    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            (ENTER_AR, self.enter_ar),
            (ENTER_AR_INFO, self.enter_ar_info),
            (UNSUPPORTED_INFO, self.unsupported_info),
            (STABILIZATION, self.stabilization),
        ]
    }
}

impl ArUiState {
    pub fn visibility(&self) -> PanelVisibility {
        match self {
            ArUiState::Checking => PanelVisibility {
                enter_ar: false,
                enter_ar_info: false,
                unsupported_info: false,
                stabilization: false,
            },
            ArUiState::EnterAr => PanelVisibility {
                enter_ar: true,
                enter_ar_info: true,
                unsupported_info: false,
                stabilization: false,
            },
            ArUiState::InAr { stabilized } => PanelVisibility {
                enter_ar: false,
                enter_ar_info: false,
                unsupported_info: false,
                stabilization: !stabilized,
            },
            ArUiState::Unsupported => PanelVisibility {
                enter_ar: false,
                enter_ar_info: false,
                unsupported_info: true,
                stabilization: false,
            },
        }
    }

    /// `(class, present)` pairs for the document body
    pub fn body_classes(&self) -> [(&'static str, bool); 2] {
        match self {
            ArUiState::InAr { stabilized } => [(AR_CLASS, true), (STABILIZED_CLASS, *stabilized)],
            _ => [(AR_CLASS, false), (STABILIZED_CLASS, false)],
        }
    }

    /// Apply a transition, refusing to leave the terminal state
    pub fn transition(self, next: ArUiState) -> ArUiState {
        match self {
            ArUiState::Unsupported => self,
            _ => next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_prompt_outside_session() {
        let enter = ArUiState::EnterAr.visibility();
        assert!(enter.enter_ar && enter.enter_ar_info);
        assert!(!enter.unsupported_info);

        let unsupported = ArUiState::Unsupported.visibility();
        assert!(unsupported.unsupported_info);
        assert!(!unsupported.enter_ar);
    }

    #[test]
    fn test_stabilization_prompt_until_surface_found() {
        let searching = ArUiState::InAr { stabilized: false };
        assert!(searching.visibility().stabilization);
        assert_eq!(searching.body_classes(), [("ar", true), ("stabilized", false)]);

        let found = ArUiState::InAr { stabilized: true };
        assert!(!found.visibility().stabilization);
        assert_eq!(found.body_classes(), [("ar", true), ("stabilized", true)]);
    }

    #[test]
    fn test_checking_shows_nothing() {
        let v = ArUiState::default().visibility();
        assert!(v.entries().iter().all(|(_, visible)| !visible));
    }

    #[test]
    fn test_unsupported_is_terminal() {
        let state = ArUiState::Unsupported.transition(ArUiState::EnterAr);
        assert_eq!(state, ArUiState::Unsupported);

        let state = ArUiState::InAr { stabilized: true }.transition(ArUiState::EnterAr);
        assert_eq!(state, ArUiState::EnterAr);
    }
}
