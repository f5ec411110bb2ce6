//! Master/detail layout state machine
//!
//! ```text
//! Collapsed --select--> SplitExpanded <--toggle_full_screen--> SplitFullScreen
//!     ^                       |                                      |
//!     +---- close / mutation success (edit mode off) ----------------+
//! ```
//!
//! Edit mode flips only while the detail panel is open.

/// Which columns of the master/detail screen are visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LayoutState {
    /// List only
    #[default]
    Collapsed,
    /// List and detail side by side
    SplitExpanded,
    /// Detail only
    SplitFullScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    Select,
    ToggleFullScreen,
    ToggleEdit,
    Close,
    MutationSucceeded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub state: LayoutState,
    pub edit_mode: bool,
}

impl Layout {
    pub fn is_open(&self) -> bool {
        self.state != LayoutState::Collapsed
    }

    /// Pure transition function. Events that do not apply in the current
    /// state return it unchanged.
    pub fn transition(self, event: LayoutEvent) -> Layout {
        use LayoutState::{Collapsed, SplitExpanded, SplitFullScreen};

        match (self.state, event) {
            (_, LayoutEvent::Select) => Layout {
                state: SplitExpanded,
                edit_mode: false,
            },
            (SplitExpanded, LayoutEvent::ToggleFullScreen) => Layout {
                state: SplitFullScreen,
                ..self
            },
            (SplitFullScreen, LayoutEvent::ToggleFullScreen) => Layout {
                state: SplitExpanded,
                ..self
            },
            (SplitExpanded | SplitFullScreen, LayoutEvent::ToggleEdit) => Layout {
                edit_mode: !self.edit_mode,
                ..self
            },
            (_, LayoutEvent::Close | LayoutEvent::MutationSucceeded) => Layout::default(),
            (Collapsed, LayoutEvent::ToggleFullScreen | LayoutEvent::ToggleEdit) => self,
        }
    }
}
