//! Single-player game session: the synchronous state machine and the async
//! runtime that drives its clock and the computer's replies.

mod runtime;
mod session;

pub use runtime::{RuntimeTiming, SessionRuntime};
pub use session::{Directive, Session};
