pub mod callbacks;
pub mod commands;
pub mod dispatcher;
pub mod form;
pub mod maintenance;
pub mod messages;
pub mod pagination;
pub mod utils;

pub use callbacks::callback_handler;
pub use maintenance::{refresh_with_retry, spawn_maintenance, LOCK_RETRY_DELAY};
pub use messages::message_handler;
