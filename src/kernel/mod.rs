//! Headless synchronization core (state/action/effect).

pub mod action;
pub mod effect;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use action::{Action, AddedNode, FormChange};
pub use effect::Effect;
pub use error::{EditorError, EditorErrorKind};
pub use session::EditorSession;
pub use state::{
    DetailState, EditorPhase, EditorRow, Notification, PendingFetch, PendingOp, SessionState,
};
pub use store::{DispatchResult, Store};
