pub mod encryption_result;
pub mod export_receipt;
pub mod imported_key;
pub mod key_material;
pub mod keyring;
pub mod recipient_set;
pub mod session_state;
