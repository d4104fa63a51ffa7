//! Post creation and visibility-gated listing.

pub mod create;
pub mod list;
pub mod types;

mod state;
mod storage;

pub use state::MediaConfig;
