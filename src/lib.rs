pub mod digest;
pub mod input;
pub mod logging;
pub mod samples;
pub mod settings;
pub mod task;
