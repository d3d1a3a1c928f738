pub mod bootstrap;
pub mod build;
pub mod config;
pub mod content;
pub mod environment;
pub mod logger;
pub mod render;
pub mod server;
pub mod watcher;
mod text_utils;
#[cfg(test)]
mod test_data;
