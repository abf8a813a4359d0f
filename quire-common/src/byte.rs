//! A seekable byte cursor.

use core::ops::Range;

/// A forward-scanning cursor over a byte slice.
///
/// The cursor never panics on out-of-range access: every read that would run
/// past the end of the data returns `None` and leaves the offset untouched.
/// Seeking (via [`Reader::jump`]) is allowed to any offset, including
/// positions past the end, in which case the cursor simply reports
/// [`Reader::at_end`].
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Create a new cursor positioned at the start of `data`.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a new cursor positioned at `offset`.
    #[inline]
    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// The whole underlying buffer.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns `true` if no bytes are left to read.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Move the cursor to an absolute offset.
    #[inline]
    pub fn jump(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Move the cursor to the end of the data.
    #[inline]
    pub fn jump_to_end(&mut self) {
        self.offset = self.data.len();
    }

    /// Push the last `len` read bytes back, so that they are read again.
    ///
    /// Saturates at the start of the data.
    #[inline]
    pub fn move_back(&mut self, len: usize) {
        self.offset = self.offset.saturating_sub(len);
    }

    /// The current offset of the cursor.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The total length of the underlying data.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there is no data at all, regardless of the offset.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// The unread part of the data.
    #[inline]
    pub fn tail(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or(&[])
    }

    /// A sub-slice of the data, independent of the current offset.
    #[inline]
    pub fn range(&self, range: Range<usize>) -> Option<&'a [u8]> {
        self.data.get(range)
    }

    /// Look at the next byte without consuming it.
    #[inline]
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Look at the byte `ahead` positions after the current one.
    #[inline]
    pub fn peek_byte_at(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.offset.checked_add(ahead)?).copied()
    }

    /// Look at the next `len` bytes without consuming them.
    #[inline]
    pub fn peek_bytes(&self, len: usize) -> Option<&'a [u8]> {
        self.data.get(self.offset..self.offset.checked_add(len)?)
    }

    /// Look at up to `len` of the next bytes, fewer if the data ends earlier.
    #[inline]
    pub fn peek_up_to(&self, len: usize) -> &'a [u8] {
        let tail = self.tail();
        &tail[..len.min(tail.len())]
    }

    /// Read one byte.
    #[inline]
    pub fn read_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.offset += 1;

        Some(b)
    }

    /// Read `len` bytes.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.peek_bytes(len)?;
        self.offset += len;

        Some(bytes)
    }

    /// Read exactly `N` bytes into an array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.read_bytes(N)?.try_into().ok()
    }

    /// Skip `len` bytes. Fails without moving if fewer are left.
    #[inline]
    pub fn skip_bytes(&mut self, len: usize) -> Option<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Advance by one byte.
    #[inline]
    pub fn forward(&mut self) {
        self.offset += 1;
    }

    /// Consume the next byte if it satisfies the predicate.
    #[inline]
    pub fn eat(&mut self, f: impl Fn(u8) -> bool) -> Option<u8> {
        let b = self.peek_byte()?;

        if f(b) {
            self.forward();
            Some(b)
        } else {
            None
        }
    }

    /// Advance while the next byte satisfies the predicate.
    #[inline]
    pub fn forward_while(&mut self, f: impl Fn(u8) -> bool) {
        while self.eat(&f).is_some() {}
    }

    /// Advance while the next byte satisfies the predicate, requiring at
    /// least one match.
    #[inline]
    pub fn forward_while_1(&mut self, f: impl Fn(u8) -> bool) -> Option<()> {
        self.eat(&f)?;
        self.forward_while(f);

        Some(())
    }

    /// Returns `true` if the next bytes are exactly `tag`.
    #[inline]
    pub fn peek_tag(&self, tag: &[u8]) -> bool {
        self.tail().starts_with(tag)
    }

    /// Consume `tag` if the next bytes match it.
    #[inline]
    pub fn forward_tag(&mut self, tag: &[u8]) -> Option<()> {
        if self.peek_tag(tag) {
            self.offset += tag.len();
            Some(())
        } else {
            None
        }
    }

    /// Read a big-endian `u8`.
    #[inline]
    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_byte()
    }

    /// Read a big-endian `i8`.
    #[inline]
    pub fn read_i8(&mut self) -> Option<i8> {
        Some(i8::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `u16`.
    #[inline]
    pub fn read_u16(&mut self) -> Option<u16> {
        Some(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `i16`.
    #[inline]
    pub fn read_i16(&mut self) -> Option<i16> {
        Some(i16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian 24-bit unsigned integer.
    #[inline]
    pub fn read_u24(&mut self) -> Option<u32> {
        let [a, b, c] = self.read_array()?;

        Some(u32::from_be_bytes([0, a, b, c]))
    }

    /// Read a big-endian `u32`.
    #[inline]
    pub fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `i32`.
    #[inline]
    pub fn read_i32(&mut self) -> Option<i32> {
        Some(i32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `u64`.
    #[inline]
    pub fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_be_bytes(self.read_array()?))
    }

    /// Read an unsigned big-endian integer that is `width` bytes wide
    /// (at most 8).
    #[inline]
    pub fn read_uint(&mut self, width: usize) -> Option<u64> {
        if width > 8 {
            return None;
        }

        let bytes = self.read_bytes(width)?;

        Some(bytes.iter().fold(0, |acc, b| (acc << 8) | u64::from(*b)))
    }
}
