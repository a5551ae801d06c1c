pub mod avatar;
pub mod contact;
pub mod pagination;

pub use avatar::*;
pub use contact::*;
pub use pagination::*;
