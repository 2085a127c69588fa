pub mod compression;
pub mod constants;
pub mod error;
pub mod format;
pub mod locator;
pub mod parser;
pub mod patterns;
pub mod reader;
