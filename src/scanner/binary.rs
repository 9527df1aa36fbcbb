//! Binary/text classification via content sampling

use std::path::Path;
use tokio::io::AsyncReadExt;

/// Number of bytes sampled from the start of a file.
const BINARY_CHECK_SIZE: usize = 512;

/// Fraction of non-printable bytes above which a sample is called binary.
const BINARY_THRESHOLD: f64 = 0.3;

/// Classify a file as binary by sampling its first 512 bytes.
///
/// The heuristic is a deliberate speed/precision trade-off: two files
/// sharing the same 512-byte prefix always classify identically, regardless
/// of what follows.
pub async fn is_binary_file(path: &Path) -> std::io::Result<bool> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = [0u8; BINARY_CHECK_SIZE];
    let mut filled = 0;
    // A single read may come up short; fill until EOF or the buffer is full.
    loop {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == buf.len() {
            break;
        }
    }
    Ok(classify(&buf[..filled]))
}

/// Classify a sample of leading bytes.
///
/// An empty sample is text. Otherwise, bytes that are neither graphic nor
/// whitespace (a literal zero byte always counts) are tallied; the sample is
/// binary when they exceed 30% of its length.
pub fn classify(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }

    let non_printable = sample.iter().filter(|&&b| is_non_printable(b)).count();

    (non_printable as f64 / sample.len() as f64) > BINARY_THRESHOLD
}

fn is_non_printable(b: u8) -> bool {
    let c = char::from(b);
    b == 0 || (c.is_control() && !c.is_whitespace())
}
