//! Client session handling
//!
//! Cookie-based identification of browser clients.

pub mod session_cookie;

pub use session_cookie::client_session_middleware;
