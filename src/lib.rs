pub mod app;
pub mod askfred;
pub mod export;
pub mod models;
pub mod parser;
pub mod render;
pub mod session;
pub mod tracker;
