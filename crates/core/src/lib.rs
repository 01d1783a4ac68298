pub mod interface;
pub mod ops;
pub mod pipeline;
pub mod shared;
pub mod video;
