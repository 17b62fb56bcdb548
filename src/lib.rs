pub mod api;
pub mod board;
pub mod config;
pub mod errors;
pub mod export;
pub mod form;
pub mod history;
pub mod model;
pub mod quantity;
pub mod session;
pub mod ui;
