pub mod log_capture;
pub mod mirror_server;
