use std::collections::HashMap;

use crate::heap::MinHeap;
use crate::symbol::Symbol;
use crate::trie::Trie;

/// A mapping from symbol to its canonical Huffman code.
pub type CodeBook = HashMap<Symbol, Vec<bool>>;

/// A code length in bits. Widened past `u8` because a degenerate alphabet
/// (e.g. every symbol having count 1) can push the deepest leaf past 255.
pub type CodeLength = u16;

/// Builds optimal code lengths from a frequency table via a min-heap merge
/// of leaf tries. `freqs` must not be empty.
pub fn build_code_lengths(freqs: &HashMap<Symbol, u64>) -> Vec<(Symbol, CodeLength)> {
    let mut heap = MinHeap::new();
    for (&symbol, &count) in freqs {
        heap.insert(count, Trie::new_leaf(symbol));
    }

    let tree = heap.merge_to_one();
    tree.symbols_with_code_lengths()
        .into_iter()
        .map(|(symbol, depth)| (symbol, depth.max(1) as CodeLength))
        .collect()
}

/// Assigns canonical codes to symbols from their code lengths: sort by
/// `(length, symbol)`, then walk the list incrementing a running code,
/// left-padding with zero bits whenever the length grows.
pub fn canonical_code_book(code_lengths: &[(Symbol, CodeLength)]) -> CodeBook {
    let mut sorted = code_lengths.to_vec();
    sorted.sort_by_key(|&(symbol, length)| (length, symbol));

    let mut result = HashMap::with_capacity(sorted.len());
    let mut current_code: Vec<bool> = Vec::new();

    for (symbol, length) in sorted {
        while current_code.len() < length as usize {
            current_code.push(false);
        }
        result.insert(symbol, current_code.clone());
        increment_code(&mut current_code);
    }

    result
}

/// Treats `code` as a big-endian binary number (index 0 is the MSB) and
/// increments it: flip trailing `1`s to `0`, flip the first `0` encountered
/// to `1`; if every bit was `1`, prepend a new leading `1` bit.
fn increment_code(code: &mut Vec<bool>) {
    let mut i = code.len();
    while i != 0 && code[i - 1] {
        code[i - 1] = false;
        i -= 1;
    }
    if i == 0 {
        code.insert(0, true);
    } else {
        code[i - 1] = true;
    }
}

/// Reconstructs `(symbol, length)` pairs from a block header's symbol list
/// (already in canonical `(length, symbol)` order) and its per-length
/// counts: the k-th symbol's length is the first `ℓ` for which
/// `c_1 + … + c_ℓ ≥ k + 1`.
pub fn code_lengths_from_counts(
    symbols: &[Symbol],
    length_counts: &[u32],
) -> Vec<(Symbol, CodeLength)> {
    let mut lengths = Vec::with_capacity(symbols.len());
    let mut symbols_iter = symbols.iter();

    for (index, &count) in length_counts.iter().enumerate() {
        let length = (index + 1) as CodeLength;
        for _ in 0..count {
            let symbol = *symbols_iter
                .next()
                .expect("length counts must not exceed the symbol list");
            lengths.push((symbol, length));
        }
    }

    lengths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs(pairs: &[(Symbol, u64)]) -> HashMap<Symbol, u64> {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn canonical_codes_are_ordered_by_length_then_symbol() {
        let lengths: Vec<(Symbol, CodeLength)> = vec![(3, 3), (1, 1), (2, 2), (4, 3)];
        let book = canonical_code_book(&lengths);

        let mut by_len_sym: Vec<_> = lengths.iter().cloned().collect();
        by_len_sym.sort_by_key(|&(symbol, length)| (length, symbol));

        for window in by_len_sym.windows(2) {
            let (sym_a, len_a) = window[0];
            let (sym_b, len_b) = window[1];
            let code_a = &book[&sym_a];
            let code_b = &book[&sym_b];
            assert_eq!(code_a.len(), len_a as usize);
            assert_eq!(code_b.len(), len_b as usize);
            if len_a == len_b {
                assert!(sym_a < sym_b);
            }
            assert!(as_u32(code_a) < as_u32(code_b));
        }
    }

    #[test]
    fn codes_are_prefix_free_and_satisfy_kraft() {
        let freqs = freqs(&[(b'a' as Symbol, 5), (b'b' as Symbol, 2), (b'c' as Symbol, 1), (b'd' as Symbol, 1)]);
        let lengths = build_code_lengths(&freqs);
        let book = canonical_code_book(&lengths);

        let mut codes: Vec<Vec<bool>> = book.values().cloned().collect();
        codes.sort();
        for i in 0..codes.len() {
            for j in 0..codes.len() {
                if i == j {
                    continue;
                }
                assert!(!is_prefix(&codes[i], &codes[j]));
            }
        }

        let kraft: f64 = lengths.iter().map(|&(_, l)| 0.5f64.powi(l as i32)).sum();
        assert!((kraft - 1.0).abs() < 1e-9);
    }

    #[test]
    fn decoder_reconstruction_matches_encoder_codebook() {
        let freqs = freqs(&[
            (b'a' as Symbol, 4),
            (b'.' as Symbol, 1),
            (b't' as Symbol, 2),
            (b'x' as Symbol, 1),
            (256, 1),
            (257, 1),
            (258, 1),
        ]);
        let lengths = build_code_lengths(&freqs);
        let encoder_book = canonical_code_book(&lengths);

        let mut sorted = lengths.clone();
        sorted.sort_by_key(|&(symbol, length)| (length, symbol));
        let symbols: Vec<Symbol> = sorted.iter().map(|&(s, _)| s).collect();
        let max_len = sorted.iter().map(|&(_, l)| l).max().unwrap();
        let mut counts = vec![0u32; max_len as usize];
        for &(_, l) in &sorted {
            counts[(l - 1) as usize] += 1;
        }

        let reconstructed_lengths = code_lengths_from_counts(&symbols, &counts);
        let decoder_book = canonical_code_book(&reconstructed_lengths);

        assert_eq!(encoder_book, decoder_book);
    }

    #[test]
    fn code_length_survives_past_u8_range() {
        // A strictly-increasing (Fibonacci-like) frequency distribution over
        // enough symbols forces the merge tree into a long spine, pushing
        // the deepest leaf's code length past 255 bits.
        let mut freqs: HashMap<Symbol, u64> = HashMap::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..300u16 {
            freqs.insert(symbol, a);
            let next = a + b;
            a = b;
            b = next;
        }

        let lengths = build_code_lengths(&freqs);
        assert!(lengths.iter().any(|&(_, length)| length > 255));

        let book = canonical_code_book(&lengths);
        for &(symbol, length) in &lengths {
            assert_eq!(book[&symbol].len(), length as usize);
        }
    }

    fn as_u32(bits: &[bool]) -> u32 {
        bits.iter().fold(0u32, |acc, &b| (acc << 1) | (b as u32))
    }

    fn is_prefix(prefix: &[bool], whole: &[bool]) -> bool {
        prefix.len() < whole.len() && prefix == &whole[..prefix.len()]
    }
}
