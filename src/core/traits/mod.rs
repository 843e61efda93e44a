pub mod key_source;
pub mod openpgp_engine;
