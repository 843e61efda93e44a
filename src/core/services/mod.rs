pub mod delivery;
pub mod encryption_engine;
pub mod export_session;
pub mod key_cache;
pub mod key_importer;
pub mod recipient_resolver;
pub mod workspace;
