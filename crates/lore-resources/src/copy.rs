//! Full-read stream helpers.

use std::io::{self, Read};

const BUFFER_SIZE: usize = 8 * 1024;

/// Read the given stream to completion into a new byte vector.
pub fn drain<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(BUFFER_SIZE);
    let mut buf = [0u8; BUFFER_SIZE];
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        out.extend_from_slice(&buf[..read]);
    }
    Ok(out)
}
