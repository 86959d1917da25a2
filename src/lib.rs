//! gwscope: a terminal explorer for Godwoken accounts, blocks and tokens

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod session;
pub mod ui;
