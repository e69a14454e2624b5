//! Authentication: token persistence, claim decoding, and session state.

pub mod session;
pub mod token;

pub use session::{AuthResult, Session};
pub use token::TokenStore;
