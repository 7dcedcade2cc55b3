pub mod collection;
pub mod request;

pub mod prelude;

pub use prelude::*;
