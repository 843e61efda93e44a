use std::io::{self, Read, Write};

use sha2::{Digest, Sha256};

/// Callback invoked with the cumulative number of bytes delivered so far.
pub type ProgressFn = Box<dyn FnMut(u64) + Send>;

/// Bytes copied per read while delivering ciphertext.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// What one delivery copy moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub bytes: u64,
    pub sha256: String,
}

/// Copy `reader` into `writer` in fixed-size chunks, hashing as it goes and
/// reporting progress after every chunk.
pub fn copy_with_progress<R, W>(
    mut reader: R,
    writer: &mut W,
    mut progress: Option<&mut ProgressFn>,
) -> io::Result<Delivery>
where
    R: Read,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut hasher = Sha256::new();
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        hasher.update(&buf[..n]);
        total += n as u64;
        if let Some(report) = progress.as_deref_mut() {
            report(total);
        }
    }
    writer.flush()?;

    Ok(Delivery {
        bytes: total,
        sha256: format!("{:x}", hasher.finalize()),
    })
}
