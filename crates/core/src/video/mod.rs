pub mod domain;
pub mod error;
pub mod footage;
pub mod frames;
pub mod infrastructure;
pub mod sink;
pub mod source;
