pub mod archive;
pub mod scheme;

pub use archive::*;
pub use scheme::*;
