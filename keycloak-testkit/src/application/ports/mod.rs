pub mod admin;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod events;
pub mod themes;

pub use admin::*;
pub use auth::*;
pub use config::*;
pub use credentials::*;
pub use events::*;
pub use themes::*;
