pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod models;
pub mod utils;
