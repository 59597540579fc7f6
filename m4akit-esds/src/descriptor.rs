//! ISO/IEC 14496-1 descriptor headers: an 8-bit tag followed by a size
//! written as big-endian base-128 groups, 0x80 marking continuation.

use crate::error::{Error, Result};

pub const ES_DESCRIPTOR_TAG: u8 = 0x03;
pub const DECODER_CONFIG_DESCRIPTOR_TAG: u8 = 0x04;
pub const DEC_SPECIFIC_INFO_TAG: u8 = 0x05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorHeader {
    pub tag: u8,
    pub size: u32,
}

/// Forward-only cursor over a descriptor sequence.
///
/// The reader never descends into nested descriptors; callers dispatch on the
/// tag and then either skip the payload or keep reading headers from inside it.
pub struct DescriptorReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DescriptorReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Parses the header at the cursor.
    ///
    /// Returns `Ok(None)` when the buffer ends before a complete header, which
    /// is how a finite sequence terminates. On success the cursor sits on the
    /// first payload byte.
    pub fn read_header(&mut self) -> Result<Option<DescriptorHeader>> {
        let Some(&tag) = self.buf.get(self.pos) else {
            return Ok(None);
        };
        let mut cursor = self.pos + 1;
        let mut size: u32 = 0;

        loop {
            let Some(&byte) = self.buf.get(cursor) else {
                self.pos = self.buf.len();
                return Ok(None);
            };
            cursor += 1;

            // Padding groups are accepted for any length; only the value
            // itself has to fit.
            if size > u32::MAX >> 7 {
                return Err(Error::malformed_cookie(format!(
                    "size of descriptor tag {} at offset {} overflows 32 bits",
                    tag, self.pos
                )));
            }
            size = (size << 7) | u32::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                break;
            }
        }

        self.pos = cursor;
        Ok(Some(DescriptorHeader { tag, size }))
    }

    /// Advances past `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Borrows the next `len` bytes and advances past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::malformed_cookie(format!(
                "{} bytes requested at offset {}, only {} left",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

/// Appends a descriptor header using the shortest size encoding.
pub fn write_header(tag: u8, size: u32, out: &mut Vec<u8>) {
    out.push(tag);

    let mut groups = [0u8; 5];
    let mut n = 0;
    let mut rest = size;
    loop {
        groups[n] = (rest & 0x7f) as u8;
        n += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }

    for i in (0..n).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}
