pub mod config;
pub mod document;
pub mod files;
pub mod generator;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod terminal;
