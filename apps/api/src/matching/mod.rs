pub mod handlers;
pub mod matcher;
pub mod recommend;
