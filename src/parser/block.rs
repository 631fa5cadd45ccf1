use byteorder::{ByteOrder, LittleEndian};

use crate::error::{FormatError, FormatErrorKind, Result, tag_display};

/// A byte range with its own read position. `origin` is the absolute offset
/// of `data[0]` in the input, so errors can report file positions from any
/// nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct ByteSource<'a> {
    data: &'a [u8],
    pos: usize,
    origin: usize,
}

impl<'a> ByteSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            origin: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn offset(&self) -> usize {
        self.origin + self.pos
    }
}

/// Sequential little-endian reader over a stack of byte sources.
///
/// All reads go to the active source. Entering a nested block pushes a new
/// source; leaving it pops back to the outer one, which has already been
/// advanced past the whole block by its declared length.
pub struct BlockReader<'a> {
    source: ByteSource<'a>,
    stack: Vec<ByteSource<'a>>,
}

impl<'a> BlockReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            source: ByteSource::new(data),
            stack: Vec::new(),
        }
    }

    /// Absolute input offset of the next byte.
    pub fn offset(&self) -> usize {
        self.source.offset()
    }

    /// Read position inside the active source.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    pub fn remaining(&self) -> usize {
        self.source.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.source.remaining() == 0
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, source: ByteSource<'a>) {
        let outer = std::mem::replace(&mut self.source, source);
        self.stack.push(outer);
    }

    /// Restores the previous source and returns the one that was active.
    /// Popping the outermost source is a no-op.
    pub fn pop(&mut self) -> Option<ByteSource<'a>> {
        let outer = self.stack.pop()?;
        Some(std::mem::replace(&mut self.source, outer))
    }

    /// Runs `f` with `source` as the active source.
    pub fn scoped<T>(
        &mut self,
        source: ByteSource<'a>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.push(source);
        let result = f(self);
        self.pop();
        result
    }

    fn truncated(&self, needed: usize) -> FormatError {
        FormatError::new(FormatErrorKind::TruncatedInput)
            .at(self.offset())
            .with_arg("needed", needed)
            .with_arg("available", self.remaining())
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.truncated(n));
        }
        let data = self.source.data;
        let start = self.source.pos;
        self.source.pos += n;
        Ok(&data[start..start + n])
    }

    /// Splits the next `n` bytes off as an independent source.
    pub fn take_source(&mut self, n: usize) -> Result<ByteSource<'a>> {
        let origin = self.offset();
        let data = self.take(n)?;
        Ok(ByteSource {
            data,
            pos: 0,
            origin,
        })
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn rewind(&mut self, n: usize) {
        self.source.pos = self.source.pos.saturating_sub(n);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let bytes = self.take(N * 4)?;
        let mut out = [0.0; N];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }

    /// Reads an i32 that must not be negative (a byte length or a count).
    pub fn read_length(&mut self) -> Result<usize> {
        let offset = self.offset();
        let n = self.read_i32()?;
        usize::try_from(n).map_err(|_| {
            FormatError::new(FormatErrorKind::NegativeLength)
                .at(offset)
                .with_arg("length", n)
        })
    }

    pub fn read_raw_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.take(4)?);
        Ok(tag)
    }

    pub fn read_tag(&mut self, expected: &[u8; 4]) -> Result<()> {
        let offset = self.offset();
        let actual = self.read_raw_tag()?;
        if &actual != expected {
            return Err(FormatError::new(FormatErrorKind::UnexpectedTag)
                .at(offset)
                .with_arg("expected", tag_display(expected))
                .with_arg("actual", tag_display(&actual)));
        }
        Ok(())
    }

    /// Consumes `expected` if it is next, otherwise leaves the position
    /// untouched. Running out of input counts as absent.
    pub fn peek_tag_or_absent(&mut self, expected: &[u8; 4]) -> bool {
        match self.read_raw_tag() {
            Ok(tag) if &tag == expected => true,
            Ok(_) => {
                self.rewind(4);
                false
            }
            Err(_) => false,
        }
    }

    /// Reads an i32 length and returns exactly that many bytes as a source.
    pub fn read_length_prefixed_block(&mut self) -> Result<ByteSource<'a>> {
        let n = self.read_length()?;
        self.take_source(n)
    }

    /// Fixed-width text field: cut at the first NUL, ASCII only.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String> {
        let offset = self.offset();
        let bytes = self.take(n)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(n);
        let text = &bytes[..end];
        if let Some(bad) = text.iter().position(|b| !b.is_ascii()) {
            return Err(FormatError::new(FormatErrorKind::InvalidEncoding)
                .at(offset + bad)
                .with_arg("byte", format!("{:#04x}", text[bad])));
        }
        Ok(text.iter().map(|&b| b as char).collect())
    }

    /// Iterates records of the form `i32 size` + body, where `size` counts
    /// its own four bytes, until the active source is exhausted. `f` runs
    /// with the body as the active source and receives the body length.
    /// Returns the number of records.
    pub fn read_inclusive_records(
        &mut self,
        min_size: usize,
        mut f: impl FnMut(&mut Self, usize) -> Result<()>,
    ) -> Result<usize> {
        let mut count = 0;
        while !self.is_exhausted() {
            let offset = self.offset();
            let size = self.read_length()?;
            if size < min_size.max(4) {
                return Err(FormatError::new(FormatErrorKind::InvalidRecordSize)
                    .at(offset)
                    .with_arg("size", size)
                    .with_arg("minimum", min_size.max(4)));
            }
            let body = self.take_source(size - 4)?;
            self.scoped(body, |r| f(r, size - 4))?;
            count += 1;
        }
        Ok(count)
    }

    /// Number of `record_len` records packed in the rest of the active
    /// source, which must hold a whole number of them.
    pub fn record_count(&self, record_len: usize) -> Result<usize> {
        let remaining = self.remaining();
        if remaining % record_len != 0 {
            return Err(FormatError::new(FormatErrorKind::InvalidRecordSize)
                .at(self.offset())
                .with_arg("length", remaining)
                .with_arg("record", record_len));
        }
        Ok(remaining / record_len)
    }

    /// `tag`, i32 count, then `count` elements of `elem_len` bytes each.
    pub fn read_vectors<T>(
        &mut self,
        tag: &[u8; 4],
        elem_len: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.read_tag(tag)?;
        let count = self.read_length()?;
        let needed = count.checked_mul(elem_len).unwrap_or(usize::MAX);
        if needed > self.remaining() {
            return Err(self.truncated(needed).with_arg("section", tag_display(tag)));
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(read(self)?);
        }
        Ok(out)
    }
}
