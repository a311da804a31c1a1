//! Production scheduling use cases

pub mod jobs;
pub mod machines;
pub mod orders;

pub use jobs::*;
pub use machines::*;
pub use orders::*;
