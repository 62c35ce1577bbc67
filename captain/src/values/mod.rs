//! Configuration values

pub mod merge;
pub mod options;
pub mod strvals;

pub use merge::{merge_layers, merge_values};
pub use options::ValueOptions;
