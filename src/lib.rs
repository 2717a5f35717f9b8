//! Canonical Huffman multi-file archiver.
//!
//! Encodes a list of `(name, bytes)` files into a single self-describing
//! archive (see [`Encoder`]) and reconstructs them from that archive (see
//! [`decode_archive`]). Every block on the wire carries its own alphabet and
//! canonical code lengths, so decoding one block never depends on any
//! other.

mod archive;
mod bitstream;
mod canonical;
mod error;
mod heap;
mod symbol;
mod trie;

pub use archive::{decode_archive, Decoder, Encoder, Entry};
pub use error::CoreError;
pub use symbol::{Symbol, ARCHIVE_END, FILENAME_END, MAX_SYMBOL, ONE_MORE_FILE, SYMBOL_BITS};
