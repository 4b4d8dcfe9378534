use std::io::{self, Chain, Cursor, Read};

/// Number of leading bytes used for content classification.
pub const SNIFF_BUDGET: usize = 512;

/// The head of a stream plus the stream itself, not yet re-joined.
#[derive(Debug)]
pub struct Sniffed<R> {
    head: Vec<u8>,
    rest: R,
}

impl<R: Read> Sniffed<R> {
    /// Up to [`SNIFF_BUDGET`] bytes from the start of the stream.
    pub fn head(&self) -> &[u8] {
        &self.head
    }

    /// The full original byte sequence: the sniffed head followed by the
    /// unread remainder.
    pub fn into_stream(self) -> Chain<Cursor<Vec<u8>>, R> {
        Cursor::new(self.head).chain(self.rest)
    }
}

/// Peek at the start of `reader` without losing any bytes.
///
/// A stream shorter than the budget is not an error; the head is simply the
/// whole stream. Only genuine read failures are returned.
pub fn sniff<R: Read>(mut reader: R) -> io::Result<Sniffed<R>> {
    let mut head = vec![0u8; SNIFF_BUDGET];
    let mut filled = 0;
    while filled < SNIFF_BUDGET {
        match reader.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    head.truncate(filled);
    Ok(Sniffed { head, rest: reader })
}
