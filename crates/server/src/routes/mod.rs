mod health;
pub mod pipeline;

pub use health::*;
pub use pipeline::*;
