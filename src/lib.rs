pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod contacts;
pub mod error;
pub mod projects;
pub mod qualifications;
pub mod response;
pub mod state;
pub mod users;
pub mod validation;
