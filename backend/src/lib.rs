// Entry point for the `backend` library. Modules are public so the
// integration tests can build the router in-process.
pub mod appointments;
pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod pages;
pub mod session;
pub mod stores;
pub mod web_server;
