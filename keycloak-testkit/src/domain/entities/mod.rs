pub mod client;
pub mod credential;
pub mod event;
pub mod realm;
pub mod theme;
pub mod user;

pub use client::*;
pub use credential::*;
pub use event::*;
pub use realm::*;
pub use theme::*;
pub use user::*;
