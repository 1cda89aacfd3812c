//! Create / edit / roadview mode flags.
//!
//! This module encapsulates the workflow-mode flags that cut across the
//! marker layer. Creating and editing are entered from the context menu;
//! roadview is an orthogonal toggle that deliberately does not disturb the
//! current selection.

/// State related to the create/edit/roadview workflow modes.
///
/// Responsibilities:
/// - Tracking which workflow (if any) is in progress
/// - Keeping roadview orthogonal to selection
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeState {
    /// Whether the create-pin workflow is active
    is_creating: bool,
    /// Whether the edit-pin workflow is active
    is_edit_mode: bool,
    /// Whether roadview is being shown
    is_roadview_mode: bool,
}

impl ModeState {
    /// Creates a new mode state with no active workflow.
    pub fn new() -> Self {
        Self {
            is_creating: false,
            is_edit_mode: false,
            is_roadview_mode: false,
        }
    }

    /// Resets all modes.
    pub fn reset(&mut self) {
        self.is_creating = false;
        self.is_edit_mode = false;
        self.is_roadview_mode = false;
    }

    // ===== Queries =====

    /// Returns true if the create-pin workflow is active.
    pub fn is_creating(&self) -> bool {
        self.is_creating
    }

    /// Returns true if the edit-pin workflow is active.
    pub fn is_edit_mode(&self) -> bool {
        self.is_edit_mode
    }

    /// Returns true if roadview is being shown.
    pub fn is_roadview_mode(&self) -> bool {
        self.is_roadview_mode
    }

    // ===== Mutations =====

    /// Enters the create-pin workflow, leaving any edit workflow.
    pub fn begin_create(&mut self) {
        self.is_creating = true;
        self.is_edit_mode = false;
    }

    /// Enters the edit-pin workflow, leaving any create workflow.
    pub fn begin_edit(&mut self) {
        self.is_edit_mode = true;
        self.is_creating = false;
    }

    /// Leaves whichever create/edit workflow is active.
    pub fn finish_workflow(&mut self) {
        self.is_creating = false;
        self.is_edit_mode = false;
    }

    /// Toggles roadview. Orthogonal to selection and workflows.
    pub fn toggle_roadview(&mut self) {
        self.is_roadview_mode = !self.is_roadview_mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_edit_are_exclusive() {
        let mut modes = ModeState::new();
        modes.begin_create();
        assert!(modes.is_creating());
        modes.begin_edit();
        assert!(modes.is_edit_mode());
        assert!(!modes.is_creating());
    }

    #[test]
    fn test_roadview_survives_workflow_changes() {
        let mut modes = ModeState::new();
        modes.toggle_roadview();
        modes.begin_create();
        modes.finish_workflow();
        assert!(modes.is_roadview_mode());
        modes.reset();
        assert!(!modes.is_roadview_mode());
    }
}
