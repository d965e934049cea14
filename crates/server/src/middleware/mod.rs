//! Request middleware: session layer, authentication extractor and CSRF
//! protection.

pub mod auth;
pub mod csrf;
pub mod session;

pub use auth::AuthenticatedUser;
pub use session::create_session_layer;
