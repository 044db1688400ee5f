pub mod enums;
pub mod investor;
pub mod scheme;

pub use enums::*;
pub use investor::*;
pub use scheme::*;
