//! Type definitions

pub mod history;
pub mod import;
pub mod job;
pub mod mapping;

pub use history::*;
pub use import::*;
pub use job::*;
pub use mapping::*;
