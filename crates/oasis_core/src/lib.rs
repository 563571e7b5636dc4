pub mod activity;
pub mod clock;
pub mod config;
pub mod db;
pub mod demo;
pub mod domain;
pub mod error;
pub mod notify;
pub mod state;
pub mod store;
