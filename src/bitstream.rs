use std::io::{Read, Write};

use crate::error::CoreError;

/// LSB-first bit reader: bit index 0 of a byte is the first bit read from it
/// (it occupies the 1s place).
pub struct BitReader<T> {
    read: T,
    buf: [u8; 1],
    current: u8,
    bits_read: u8,
}

impl<T: Read> BitReader<T> {
    pub fn new(read: T) -> BitReader<T> {
        BitReader {
            read,
            buf: [0; 1],
            current: 0,
            bits_read: 8,
        }
    }

    /// Reads a single bit, fetching a new byte from the source when the
    /// previous one has been exhausted. Fails with `EndOfStream` if the
    /// source has no more bytes to give.
    pub fn read_bit(&mut self) -> Result<bool, CoreError> {
        if self.bits_read == 8 {
            self.read_next_byte()?;
        }

        let bit = (self.current & (1 << self.bits_read)) != 0;
        self.bits_read += 1;

        Ok(bit)
    }

    /// Reads `count` bits, concatenated in read order. Batches whole bytes
    /// on byte boundaries.
    pub fn read_bits(&mut self, count: usize) -> Result<Vec<bool>, CoreError> {
        let mut bits = Vec::with_capacity(count);

        while bits.len() < count && self.bits_read != 8 {
            bits.push(self.read_bit()?);
        }

        while count - bits.len() >= 8 {
            self.read_next_byte()?;
            for i in 0..8 {
                bits.push((self.current & (1 << i)) != 0);
            }
            self.bits_read = 8;
        }

        while bits.len() < count {
            bits.push(self.read_bit()?);
        }

        Ok(bits)
    }

    fn read_next_byte(&mut self) -> Result<(), CoreError> {
        let bytes_read = self.read.read(&mut self.buf)?;

        if bytes_read == 0 {
            return Err(CoreError::EndOfStream);
        }

        self.current = self.buf[0];
        self.bits_read = 0;

        Ok(())
    }
}

/// LSB-first bit writer: bit index 0 of a byte is the first bit written into
/// it (it occupies the 1s place).
pub struct BitWriter<T: Write> {
    write: T,
    buf: [u8; 1],
    current: u8,
    bits_written: u8,
}

impl<T: Write> BitWriter<T> {
    pub fn new(write: T) -> BitWriter<T> {
        BitWriter {
            write,
            buf: [0; 1],
            current: 0,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), CoreError> {
        if bit {
            self.current |= 1 << self.bits_written;
        }
        self.bits_written += 1;

        if self.bits_written == 8 {
            self.write_current_byte()?;
        }

        Ok(())
    }

    pub fn write_bits(&mut self, bits: &[bool]) -> Result<(), CoreError> {
        let mut i = 0;

        while self.bits_written != 0 && i < bits.len() {
            self.write_bit(bits[i])?;
            i += 1;
        }

        while i + 8 <= bits.len() {
            let mut byte = 0u8;
            for (bit_pos, &bit) in bits[i..i + 8].iter().enumerate() {
                if bit {
                    byte |= 1 << bit_pos;
                }
            }
            self.buf[0] = byte;
            self.write.write_all(&self.buf)?;
            i += 8;
        }

        while i < bits.len() {
            self.write_bit(bits[i])?;
            i += 1;
        }

        Ok(())
    }

    fn write_current_byte(&mut self) -> Result<(), CoreError> {
        self.buf[0] = self.current;

        self.write.write_all(&self.buf)?;

        self.current = 0;
        self.bits_written = 0;

        Ok(())
    }
}

impl<T: Write> Drop for BitWriter<T> {
    fn drop(&mut self) {
        if self.bits_written != 0 {
            let _ = self.write_current_byte();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_empty_reader() {
        let mut bit_reader = BitReader::new(Cursor::new(Vec::new()));

        assert!(matches!(bit_reader.read_bit(), Err(CoreError::EndOfStream)));
    }

    #[test]
    fn test_reader() {
        let mut bit_reader = BitReader::new(Cursor::new(vec![0b1100_1111, 0b0100_0110]));

        // Byte 0 (0xCF), 1s place first: 1 1 1 1 0 0 1 1
        // Byte 1 (0x46), 1s place first: 0 1 1 0 0 0 1 0
        let expected = [
            true, true, true, true, false, false, true, true, false, true, true, false, false,
            false, true, false,
        ];
        for bit in expected {
            assert_eq!(bit_reader.read_bit().unwrap(), bit);
        }

        assert!(matches!(bit_reader.read_bit(), Err(CoreError::EndOfStream)));
    }

    #[test]
    fn test_writer() {
        let mut vec: Vec<u8> = Vec::new();
        {
            let mut bit_writer = BitWriter::new(&mut vec);

            let bits = [
                true, true, true, true, false, false, true, true, false, true, true, false,
                false, false, true, false,
            ];
            for bit in bits {
                bit_writer.write_bit(bit).unwrap();
            }
        }

        assert_eq!(vec, vec![0b1100_1111, 0b0100_0110]);
    }

    #[test]
    fn test_writer_partial() {
        let mut vec: Vec<u8> = Vec::new();
        {
            let mut bit_writer = BitWriter::new(&mut vec);

            let bits = [
                true, true, true, true, false, false, true, true, false, true, true, false,
                false,
            ];
            for bit in bits {
                bit_writer.write_bit(bit).unwrap();
            }
        }

        // Partial final byte: bits 0..=4 of byte 1 set, rest zero.
        assert_eq!(vec, vec![0b1100_1111, 0b0000_0110]);
    }

    #[test]
    fn test_drop_no_panic() {
        struct FailOnFlush {}
        impl Write for FailOnFlush {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::last_os_error())
            }
        }

        {
            let mut bit_writer = BitWriter::new(FailOnFlush {});

            bit_writer.write_bit(true).unwrap();
            bit_writer.write_bit(true).unwrap();
            bit_writer.write_bit(false).unwrap();
        }
    }

    #[test]
    fn read_bits_matches_sequential_read_bit() {
        let data = vec![0b1011_0110, 0b0010_1101, 0xff];
        let mut batched = BitReader::new(Cursor::new(data.clone()));
        let mut sequential = BitReader::new(Cursor::new(data));

        let batched_bits = batched.read_bits(20).unwrap();
        let mut sequential_bits = Vec::new();
        for _ in 0..20 {
            sequential_bits.push(sequential.read_bit().unwrap());
        }

        assert_eq!(batched_bits, sequential_bits);
    }

    #[test]
    fn write_bits_then_read_bits_round_trips() {
        let bits: Vec<bool> = [
            true, false, true, true, false, false, false, true, true, true, false, true, false,
        ]
        .to_vec();

        let mut encoded = Vec::new();
        {
            let mut writer = BitWriter::new(&mut encoded);
            writer.write_bits(&bits).unwrap();
        }

        let mut reader = BitReader::new(Cursor::new(encoded));
        let decoded = reader.read_bits(bits.len()).unwrap();

        assert_eq!(decoded, bits);
    }
}
