pub mod buffer;
pub mod peak;
pub mod spectrum;
pub mod window;
