pub mod export;
pub mod keys;
