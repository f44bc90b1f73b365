//! Hover / freeze selection state machine.
//!
//! The machine is pure: [`SelectionMachine::apply`] takes an event and
//! returns the effects the views must carry out. Rendering is entirely
//! the synchronizer's job.

/// Which tract, if any, the views currently describe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing selected; views show jurisdiction totals.
    #[default]
    Unselected,
    /// The pointer rests over a tract.
    Hovering(String),
    /// A tract was clicked and stays selected until released.
    Frozen(String),
}

impl Selection {
    /// `GEOID` of the selected tract.
    #[must_use]
    pub fn geoid(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Hovering(geoid) | Self::Frozen(geoid) => Some(geoid),
        }
    }

    /// Whether a tract is frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        matches!(self, Self::Frozen(_))
    }
}

/// Pointer input, already resolved to a tract (or empty space).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// The pointer is over a tract (map polygon or scatter bubble).
    PointerOver(String),
    /// The pointer left all tracts.
    PointerLeave,
    /// A tract was clicked.
    ClickTract(String),
    /// Empty map space was clicked.
    ClickEmpty,
}

/// What the views must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEffect {
    /// Describe this tract in every view and highlight it.
    Show(String),
    /// Revert every view to jurisdiction totals and clear highlights.
    Clear,
    /// Animate the camera to the tract's bounds.
    FitToTract(String),
    /// Animate the camera back to the initial view.
    RestoreCamera,
}

/// Holds the current [`Selection`] and applies transitions to it.
#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    state: Selection,
}

impl SelectionMachine {
    /// Starts unselected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &Selection {
        &self.state
    }

    /// Applies `event`, returning the effects in the order they must run.
    pub fn apply(&mut self, event: SelectionEvent) -> Vec<SelectionEffect> {
        let (next, effects) = transition(&self.state, event);
        if next != self.state {
            log::debug!("Selection {:?} -> {next:?}", self.state);
            self.state = next;
        }
        effects
    }
}

fn transition(state: &Selection, event: SelectionEvent) -> (Selection, Vec<SelectionEffect>) {
    use Selection::{Frozen, Hovering, Unselected};
    use SelectionEffect::{Clear, FitToTract, RestoreCamera, Show};

    match (state, event) {
        // Hover is ignored entirely while frozen.
        (Frozen(_), SelectionEvent::PointerOver(_) | SelectionEvent::PointerLeave) => {
            (state.clone(), vec![])
        }
        (Hovering(current), SelectionEvent::PointerOver(geoid)) if *current == geoid => {
            (state.clone(), vec![])
        }
        (_, SelectionEvent::PointerOver(geoid)) => (Hovering(geoid.clone()), vec![Show(geoid)]),

        (Hovering(_), SelectionEvent::PointerLeave) => (Unselected, vec![Clear]),
        (Unselected, SelectionEvent::PointerLeave) => (Unselected, vec![]),

        (Frozen(current), SelectionEvent::ClickTract(geoid)) if *current == geoid => {
            (Unselected, vec![Clear, RestoreCamera])
        }
        (_, SelectionEvent::ClickTract(geoid)) => (
            Frozen(geoid.clone()),
            vec![Show(geoid.clone()), FitToTract(geoid)],
        ),

        (Frozen(_), SelectionEvent::ClickEmpty) => (Unselected, vec![Clear, RestoreCamera]),
        (_, SelectionEvent::ClickEmpty) => (state.clone(), vec![]),
    }
}
