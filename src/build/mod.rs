pub mod bundler;
pub mod compilation;
pub mod manifest;
pub mod plugins;
