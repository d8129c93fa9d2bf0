//! Front-end facing layer of tabledit.
//!
//! [`Session`] owns the database connection and the edit tracker for the
//! table being edited, and exposes the operations a grid or CLI calls.
//! [`settings`] resolves where the database lives and how rows are keyed.

pub mod error;
pub mod session;
pub mod settings;

pub use error::SessionError;
pub use session::{Session, SessionState};
pub use settings::Settings;
