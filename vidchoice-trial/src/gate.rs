use crate::surface::TrialSurface;
use vidchoice_core::{ControlId, WindowState};

/// Enable state of the two response controls.
///
/// Both controls always change together. Open is reachable only from Closed,
/// Captured only from Open, and Captured is terminal.
#[derive(Debug, Default)]
pub struct ResponseGate {
    state: WindowState,
    selected: Option<ControlId>,
}

impl ResponseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn selected(&self) -> Option<ControlId> {
        self.selected
    }

    /// Puts both controls in the disabled state they start in
    pub fn reset_view<S: TrialSurface + ?Sized>(&self, surface: &mut S) {
        surface.set_controls_enabled(self.state == WindowState::Open);
    }

    pub fn open<S: TrialSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if self.state != WindowState::Closed {
            return false;
        }
        self.state = WindowState::Open;
        surface.set_controls_enabled(true);
        true
    }

    /// Takes the first response; disables both controls before anything else
    /// reacts to it. Returns false when the window is not open.
    pub fn capture<S: TrialSurface + ?Sized>(&mut self, control: ControlId, surface: &mut S) -> bool {
        if self.state != WindowState::Open {
            return false;
        }
        self.state = WindowState::Captured;
        self.selected = Some(control);
        surface.set_controls_enabled(false);
        true
    }
}
