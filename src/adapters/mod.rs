pub mod gpg;
pub mod key_sources;
