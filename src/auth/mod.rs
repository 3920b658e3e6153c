pub mod password;
pub mod token;

pub use token::{Claims, SessionKeys};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";
