pub mod api;
pub mod config;
pub mod function;
pub mod inference;
pub mod joke;
pub mod prompts;
pub mod state;
