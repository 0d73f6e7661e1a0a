pub mod handlers;
pub mod path;
pub mod progress;
