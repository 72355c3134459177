pub mod commands;
pub mod store;

pub use commands::SessionCommand;
pub use store::{ProfileSnapshot, ProfileStore};
