//! State management modules for the pin map engine.
//!
//! This module contains state-only logic (no surface or store concerns):
//! - Selection state (selected pin, hovered node and member pins)
//! - Context-menu state (open/closed, screen anchor, target)
//! - Mode state (create / edit / roadview flags)
//! - View state (captured zoom and bounds)
//!
//! Every component exposes named transition methods and is mutated only
//! through them; the engine composes them and never reaches into fields.

mod context_menu;
mod modes;
mod selection;
mod view;

pub use context_menu::{ContextMenuState, MenuTarget};
pub use modes::ModeState;
pub use selection::SelectionState;
pub use view::ViewState;
