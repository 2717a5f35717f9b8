use thiserror::Error;

/// Errors raised by the codec core.
///
/// The decoder never lets these escape past `decode_archive` individually
/// (see `archive.rs`): anything surfacing from `BitStream`/`Trie` during a
/// decode is collapsed to `InvalidArchive` at that single outer boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unexpected end of stream")]
    EndOfStream,

    #[error("corrupt huffman stream")]
    CorruptStream,

    #[error("cannot decode encoded data")]
    InvalidArchive,

    #[error("I/O failure: {0}")]
    IOFailure(#[from] std::io::Error),
}
