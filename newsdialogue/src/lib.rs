// Library interface for newsdialogue modules
// This allows tests and other binaries to import modules

pub mod dialogue;
pub mod ingestion;
pub mod llm;
pub mod persona;
pub mod prompt;
pub mod render;
pub mod server;
pub mod tidy;
