pub mod app;
pub mod audit;
pub mod auth;
pub mod categories;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod mail;
pub mod posts;
pub mod state;
pub mod store;
pub mod users;
pub mod validate;
