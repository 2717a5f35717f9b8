use std::collections::HashMap;
use std::io::{Read, Write};

use log::{debug, trace};

use crate::bitstream::{BitReader, BitWriter};
use crate::canonical::{
    build_code_lengths, canonical_code_book, code_lengths_from_counts, CodeBook, CodeLength,
};
use crate::error::CoreError;
use crate::symbol::{Symbol, ARCHIVE_END, FILENAME_END, MAX_SYMBOL, ONE_MORE_FILE, SYMBOL_BITS};
use crate::trie::Trie;

/// One file recovered from an archive: its original name and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Encodes files into a single self-describing archive.
///
/// Each call to `add_file` writes one complete block (header + payload)
/// and remembers that block's code table, since the separator written
/// before the *next* block (or the terminator written on drop) must be
/// coded under the *previous* block's table.
pub struct Encoder<W: Write> {
    writer: BitWriter<W>,
    previous_codes: Option<CodeBook>,
}

impl<W: Write> Encoder<W> {
    pub fn new(write: W) -> Encoder<W> {
        Encoder {
            writer: BitWriter::new(write),
            previous_codes: None,
        }
    }

    /// Adds one file's name and contents as the next block in the archive.
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<(), CoreError> {
        if let Some(previous) = &self.previous_codes {
            let code = previous
                .get(&ONE_MORE_FILE)
                .expect("every block's table carries a code for ONE_MORE_FILE");
            self.writer.write_bits(code)?;
        }

        let mut symbols: Vec<Symbol> = name.bytes().map(Symbol::from).collect();
        symbols.push(FILENAME_END);
        symbols.extend(data.iter().copied().map(Symbol::from));
        symbols.push(ONE_MORE_FILE);
        symbols.push(ARCHIVE_END);

        let mut freqs: HashMap<Symbol, u64> = HashMap::new();
        for &symbol in &symbols {
            *freqs.entry(symbol).or_insert(0) += 1;
        }

        let code_lengths = build_code_lengths(&freqs);
        let code_book = canonical_code_book(&code_lengths);
        debug!(
            "block for \"{name}\": {} bytes, {} distinct symbols",
            data.len(),
            code_lengths.len()
        );

        // The last two sentinels only needed to exist in the table so the
        // separator/terminator following this block can be coded; they are
        // not part of this block's own payload.
        symbols.truncate(symbols.len() - 2);

        write_block_header(&mut self.writer, &code_lengths)?;

        for symbol in &symbols {
            let code = code_book
                .get(symbol)
                .expect("every payload symbol has a code in its own block's table");
            self.writer.write_bits(code)?;
        }

        self.previous_codes = Some(code_book);
        Ok(())
    }
}

impl<W: Write> Drop for Encoder<W> {
    fn drop(&mut self) {
        if let Some(previous) = &self.previous_codes {
            if let Some(code) = previous.get(&ARCHIVE_END) {
                let _ = self.writer.write_bits(code);
            }
        }
    }
}

fn write_block_header<W: Write>(
    writer: &mut BitWriter<W>,
    code_lengths: &[(Symbol, CodeLength)],
) -> Result<(), CoreError> {
    let mut sorted = code_lengths.to_vec();
    sorted.sort_by_key(|&(symbol, length)| (length, symbol));

    writer.write_bits(&value_to_bits(sorted.len() as u32))?;
    for &(symbol, _) in &sorted {
        writer.write_bits(&value_to_bits(symbol as u32))?;
    }

    let max_length = sorted.last().map_or(0, |&(_, length)| length);
    let mut length_counts = vec![0u32; max_length as usize];
    for &(_, length) in &sorted {
        length_counts[(length - 1) as usize] += 1;
    }
    for count in length_counts {
        writer.write_bits(&value_to_bits(count))?;
    }

    Ok(())
}

/// Reads one block header, returning its symbols already paired with their
/// canonical code lengths.
fn read_block_header<R: Read>(
    reader: &mut BitReader<R>,
) -> Result<Vec<(Symbol, CodeLength)>, CoreError> {
    let symbols_count = bits_to_value(&reader.read_bits(SYMBOL_BITS as usize)?);
    if symbols_count == 0 {
        return Err(CoreError::CorruptStream);
    }

    let mut symbols = Vec::with_capacity(symbols_count as usize);
    for _ in 0..symbols_count {
        let value = bits_to_value(&reader.read_bits(SYMBOL_BITS as usize)?);
        if value > MAX_SYMBOL as u32 {
            return Err(CoreError::CorruptStream);
        }
        symbols.push(value as Symbol);
    }

    let mut length_counts = Vec::new();
    let mut accumulated = 0u32;
    while accumulated < symbols_count {
        let count = bits_to_value(&reader.read_bits(SYMBOL_BITS as usize)?);
        accumulated += count;
        if accumulated > symbols_count {
            return Err(CoreError::CorruptStream);
        }
        length_counts.push(count);
    }

    Ok(code_lengths_from_counts(&symbols, &length_counts))
}

fn value_to_bits(value: u32) -> [bool; SYMBOL_BITS as usize] {
    let mut bits = [false; SYMBOL_BITS as usize];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (value >> i) & 1 != 0;
    }
    bits
}

fn bits_to_value(bits: &[bool]) -> u32 {
    bits.iter()
        .enumerate()
        .fold(0u32, |acc, (i, &bit)| acc | ((bit as u32) << i))
}

/// Decodes one archive block at a time.
///
/// This is the low-level half of decoding; `decode_archive` below wraps it
/// with a single outer error boundary that turns any wire-format failure
/// into `CoreError::InvalidArchive`.
pub struct Decoder<R: Read> {
    reader: BitReader<R>,
    done: bool,
}

impl<R: Read> Decoder<R> {
    pub fn new(read: R) -> Decoder<R> {
        Decoder {
            reader: BitReader::new(read),
            done: false,
        }
    }

    /// Reads the next file from the archive, or `None` once `ARCHIVE_END`
    /// has been observed.
    pub fn next_entry(&mut self) -> Result<Option<Entry>, CoreError> {
        if self.done {
            return Ok(None);
        }

        let code_lengths = read_block_header(&mut self.reader)?;
        let code_book = canonical_code_book(&code_lengths);

        let mut trie = Trie::empty();
        for (symbol, code) in &code_book {
            trie.add_symbol(*symbol, code);
        }
        trace!("decoded block header with {} symbols", code_lengths.len());

        let mut name_bytes = Vec::new();
        loop {
            let symbol = trie.decode_next(&mut self.reader)?;
            if symbol == FILENAME_END {
                break;
            }
            name_bytes.push(symbol as u8);
        }
        let name = String::from_utf8_lossy(&name_bytes).into_owned();

        let mut data = Vec::new();
        loop {
            let symbol = trie.decode_next(&mut self.reader)?;
            if symbol == ONE_MORE_FILE {
                break;
            }
            if symbol == ARCHIVE_END {
                self.done = true;
                break;
            }
            data.push(symbol as u8);
        }

        Ok(Some(Entry { name, data }))
    }
}

/// Decodes a full archive from `read`, invoking `on_entry` for each file in
/// order. Any failure while parsing the archive's bit stream is collapsed
/// to `InvalidArchive`, matching the single try/catch boundary of the
/// original decoder; errors raised by `on_entry` itself (e.g. failing to
/// write the extracted file) are propagated unchanged.
pub fn decode_archive<R, F>(read: R, mut on_entry: F) -> Result<(), CoreError>
where
    R: Read,
    F: FnMut(Entry) -> Result<(), CoreError>,
{
    let mut decoder = Decoder::new(read);
    loop {
        match decoder.next_entry() {
            Ok(Some(entry)) => on_entry(entry)?,
            Ok(None) => return Ok(()),
            Err(_) => return Err(CoreError::InvalidArchive),
        }
    }
}
