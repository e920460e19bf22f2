pub mod authenticator;
pub mod events_manager;
pub mod realm_admin_auth;
pub mod realm_fixture;
pub mod theme_resolver;

pub use authenticator::*;
pub use events_manager::*;
pub use realm_admin_auth::*;
pub use realm_fixture::*;
pub use theme_resolver::*;
