pub mod config;
pub mod dal;
pub mod db;
pub mod harness;
pub mod models;
pub mod report;
pub mod service;
