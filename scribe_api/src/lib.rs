//! Shared scribe data models consumed by the core library and plugin crates.

pub mod comment;
pub mod context;
pub mod declaration;
pub mod history;

pub use comment::*;
pub use context::*;
pub use declaration::*;
pub use history::*;
