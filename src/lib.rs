pub mod bot;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod parser;
pub mod render;
pub mod storage;
pub mod telegram;
pub mod telemetry;
pub mod webhook;
