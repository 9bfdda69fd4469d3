pub mod base;
pub mod swap;
pub mod tick_arrays;

pub use base::*;
pub use swap::*;
pub use tick_arrays::*;
