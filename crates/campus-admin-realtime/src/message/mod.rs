//! Push-channel frame types, encoding, and validation.

pub mod envelope;
pub mod types;
pub mod validator;

pub use envelope::Envelope;
pub use types::ServerEvent;
