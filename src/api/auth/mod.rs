pub mod models;
pub mod handlers;
pub mod service;

pub use service::AuthService;
