pub mod handler;
pub mod session;
pub mod types;

pub use handler::{submit_query, ChatError};
pub use session::{SessionError, SessionStore};
pub use types::SessionSnapshot;
