use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const SNIFF_LEN: usize = 8192;

/// Null-byte sniff over the leading bytes of a file, the same heuristic
/// grep and git use. Empty files count as text. The collector takes this as
/// an injected oracle, so callers are free to substitute a smarter one.
pub fn is_probably_binary(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(buf[..filled].contains(&0))
}
