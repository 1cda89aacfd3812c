pub mod domain;
pub mod engine;
pub mod geo;
pub mod listing;
pub mod presentation;
pub mod state;
pub mod store;
pub mod theme;
pub mod traits;
pub mod utils;

// Export external-collaborator seams
pub use traits::{
    MapSurface, OverlayAnchor, OverlayContent, OverlayId, OverlaySpec, PinSource,
};

// Export geographic primitives
pub use geo::{GeoBounds, LatLng};

// Export the pin record model
pub use listing::{DealStatus, OwnerId, Pin, PinId};

// Export the aggregation model
pub use domain::{aggregate, Node, NodeId, NodeKind, CLUSTER_RADIUS_PX};

// Export the engine and its event vocabulary
pub use engine::{
    EngineEvent, HoverInfoBox, MapEngine, MenuAction, OverlayArena, OverlayHandle, PointerKind,
    ReconcileStats, SideEffect,
};

// Export state components
pub use state::{ContextMenuState, MenuTarget, ModeState, SelectionState, ViewState};

// Export store plumbing
pub use store::{PinStore, RefreshOutcome, SamplePinSource};

// Export theme support
pub use theme::{MarkerPalette, Theme, ThemeManager};
