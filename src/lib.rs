pub mod args;
pub mod error;
pub mod filename;
pub mod files;
pub mod processor;
pub mod scanner;
