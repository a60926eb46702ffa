//! Password hashing and JWT session tokens for the web layer. Carries no
//! knowledge of the domain's storage backend — `webapi` is responsible for
//! looking a user up and deciding whether a password matches.

pub mod context;
pub mod password;
pub mod session;

pub use context::{AuthContext, AuthError, SessionSecret};
pub use password::{hash_password, verify_password};
pub use session::{create_session, generate_secret, verify_session, SessionToken};
