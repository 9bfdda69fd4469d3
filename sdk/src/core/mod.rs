pub mod accounts;
pub mod constants;
pub mod types;

pub use accounts::*;
pub use constants::*;
pub use types::*;
