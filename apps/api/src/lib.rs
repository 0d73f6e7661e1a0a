//! skillpath: skill extraction, job matching and learning paths over HTTP.

pub mod config;
pub mod db;
pub mod errors;
pub mod learning;
pub mod matching;
pub mod models;
pub mod routes;
pub mod session;
pub mod skills;
pub mod state;
pub mod store;
