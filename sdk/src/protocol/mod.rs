pub mod pda;
pub mod transfer_fee;

pub use pda::*;
pub use transfer_fee::*;
