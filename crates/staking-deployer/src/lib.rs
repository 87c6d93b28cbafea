pub mod arguments;
pub mod artifact;
pub mod config;
pub mod deploy;
pub mod node;
pub mod parameters;
mod run;

pub use self::run::{run, start};
