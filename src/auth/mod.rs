//! Authentication feature: backend endpoint wrappers, the session coordinator,
//! error classification, input validation and the screen-flow state machine.
//! Request payloads carry passwords and codes and must never be logged; the
//! coordinator is the only component that writes the persisted token and user
//! record.
//!
//! Flow overview: register or login persists the returned token and user and
//! authenticates the session. Email verification and password reset are
//! multi-step flows that never authenticate on their own; they end on the
//! login screen. Change-password runs against an authenticated session and
//! turns an expired token into a forced logout.

pub mod client;
pub mod flow;
pub mod messages;
pub mod session;
pub mod types;
pub mod validation;

pub use flow::{AuthScreen, FlowEffect, FlowEvent, FlowState, MainScreen, Screen, ScreenFlow};
pub use session::{AuthOutcome, Session, SessionCoordinator};
pub use types::User;
