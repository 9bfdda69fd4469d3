pub mod builder;
pub mod swap;
pub mod token;

pub use builder::*;
pub use swap::*;
pub use token::*;
