/// Port for anything that can hand over OpenPGP public-key material.
///
/// Implementations live in `adapters::key_sources` (e.g. FileKeySource).
/// `id` must be stable for the lifetime of the process: it is the key
/// under which `KeyCache` stores the material.
pub trait KeySource: Send + Sync {
    /// Stable identity of this source (a path, URL or similar handle).
    fn id(&self) -> &str;

    /// Read the raw key material, armored or binary.
    fn read_key(&self) -> std::io::Result<Vec<u8>>;
}
