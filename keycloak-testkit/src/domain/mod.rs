pub mod codes;
pub mod entities;
pub mod errors;
pub mod wait;
