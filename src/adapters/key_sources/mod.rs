pub mod file_key_source;
pub mod inline_key_source;
