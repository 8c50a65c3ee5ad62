pub mod completion_handler;
pub mod copilot_client;
pub mod event_stream;
pub mod health_handler;
