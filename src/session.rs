/// The three mutually-exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Landing,
    Upload,
    Explore,
}

/// Navigation state for one run of the application.
///
/// Edges: Landing → Upload → Explore, with the single reverse edge
/// Explore → Upload. Landing is never reachable again. The dataset itself is
/// owned elsewhere; leaving Explore does not touch it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionState {
    pub screen: Screen,
    pub conclusion_visible: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Landing → Upload. Returns whether a transition happened.
    pub fn start(&mut self) -> bool {
        if self.screen == Screen::Landing {
            self.screen = Screen::Upload;
            true
        } else {
            false
        }
    }

    /// Upload → Explore. Clears the conclusion panel.
    pub fn generate(&mut self) -> bool {
        if self.screen == Screen::Upload {
            self.screen = Screen::Explore;
            self.conclusion_visible = false;
            true
        } else {
            false
        }
    }

    /// Explore → Upload.
    pub fn back(&mut self) -> bool {
        if self.screen == Screen::Explore {
            self.screen = Screen::Upload;
            true
        } else {
            false
        }
    }

    /// Reveal the conclusion panel. Only meaningful on Explore; stays set
    /// until the next generate().
    pub fn show_conclusion(&mut self) -> bool {
        if self.screen == Screen::Explore && !self.conclusion_visible {
            self.conclusion_visible = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();
        assert_eq!(state.screen, Screen::Landing);
        assert!(!state.conclusion_visible);
    }

    #[test]
    fn test_start_only_from_landing() {
        let mut state = SessionState::new();
        assert!(state.start());
        assert_eq!(state.screen, Screen::Upload);

        // Start is not an edge anywhere else
        assert!(!state.start());
        assert_eq!(state.screen, Screen::Upload);

        state.generate();
        assert!(!state.start());
        assert_eq!(state.screen, Screen::Explore);
    }

    #[test]
    fn test_generate_only_from_upload() {
        let mut state = SessionState::new();
        assert!(!state.generate());
        assert_eq!(state.screen, Screen::Landing);

        state.start();
        assert!(state.generate());
        assert_eq!(state.screen, Screen::Explore);

        assert!(!state.generate());
        assert_eq!(state.screen, Screen::Explore);
    }

    #[test]
    fn test_back_only_from_explore() {
        let mut state = SessionState::new();
        assert!(!state.back());
        state.start();
        assert!(!state.back());
        state.generate();
        assert!(state.back());
        assert_eq!(state.screen, Screen::Upload);

        // Landing is unreachable: back from Upload goes nowhere
        assert!(!state.back());
        assert_eq!(state.screen, Screen::Upload);
    }

    #[test]
    fn test_upload_explore_cycle() {
        let mut state = SessionState::new();
        state.start();
        for _ in 0..3 {
            assert!(state.generate());
            assert_eq!(state.screen, Screen::Explore);
            assert!(state.back());
            assert_eq!(state.screen, Screen::Upload);
        }
    }

    #[test]
    fn test_conclusion_visibility() {
        let mut state = SessionState::new();

        // Not available before Explore
        assert!(!state.show_conclusion());
        state.start();
        assert!(!state.show_conclusion());
        assert!(!state.conclusion_visible);

        state.generate();
        assert!(state.show_conclusion());
        assert!(state.conclusion_visible);

        // Idempotent while visible
        assert!(!state.show_conclusion());
        assert!(state.conclusion_visible);

        // Survives Back
        state.back();
        assert!(state.conclusion_visible);

        // Reset by the next Generate
        state.generate();
        assert!(!state.conclusion_visible);
    }
}
