//! Infrastructure layer: I/O boundary implementations

pub mod traits;

pub use traits::{FileSystem, RealFileSystem};
