pub mod produce;

pub use produce::*;
