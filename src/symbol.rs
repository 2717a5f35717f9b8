//! The 9-bit alphabet shared by every block: the byte range plus three
//! framing sentinels used by the archive codec in `archive.rs`.

/// A symbol coded by a block: a byte value, or one of the three sentinels
/// below. Always fits in 9 bits.
pub type Symbol = u16;

/// Width, in bits, of every symbol and count field on the wire.
pub const SYMBOL_BITS: u32 = 9;

/// Terminates a file name in the symbol stream.
pub const FILENAME_END: Symbol = 256;

/// Separates consecutive files inside the archive.
pub const ONE_MORE_FILE: Symbol = 257;

/// Marks the end of the archive.
pub const ARCHIVE_END: Symbol = 258;

/// Largest value a `Symbol` may legally take (`ARCHIVE_END`, the last
/// sentinel). A 9-bit field can encode values up to 511, so a decoded
/// value above this is never a real symbol — only a corrupt header.
pub const MAX_SYMBOL: Symbol = ARCHIVE_END;
