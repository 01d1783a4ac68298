pub mod constants;
pub mod footage_info;
pub mod fourcc;
pub mod frame;
pub mod progress;
