use quire_common::byte::Reader;

/// A CFF INDEX: a count, followed by offsets into a block of objects.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Index<'a> {
    count: u16,
    offset_size: u8,
    offsets: &'a [u8],
    data: &'a [u8],
}

impl Default for Index<'_> {
    fn default() -> Self {
        Self {
            count: 0,
            offset_size: 1,
            offsets: b"",
            data: b"",
        }
    }
}

/// Read an INDEX at the position of the reader, leaving the reader after it.
pub(crate) fn parse_index<'a>(r: &mut Reader<'a>) -> Option<Index<'a>> {
    let count = r.read_u16()?;

    if count == 0 {
        return Some(Index::default());
    }

    let offset_size = r.read_u8()?;

    if !(1..=4).contains(&offset_size) {
        return None;
    }

    let offsets_len = (usize::from(count) + 1) * usize::from(offset_size);
    let offsets = r.read_bytes(offsets_len)?;

    let mut index = Index {
        count,
        offset_size,
        offsets,
        data: b"",
    };

    // The last offset marks the end of the object data.
    let data_len = index.offset(usize::from(count))?;
    index.data = r.read_bytes(data_len)?;

    Some(index)
}

impl<'a> Index<'a> {
    /// The number of objects.
    pub(crate) fn len(&self) -> u16 {
        self.count
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn get(&self, index: u16) -> Option<&'a [u8]> {
        if index >= self.count {
            return None;
        }

        let start = self.offset(usize::from(index))?;
        let end = self.offset(usize::from(index) + 1)?;

        self.data.get(start..end)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.count).filter_map(|i| self.get(i))
    }

    /// Stored offsets are relative to the byte before the object data.
    fn offset(&self, index: usize) -> Option<usize> {
        let size = usize::from(self.offset_size);
        let value = Reader::new_at(self.offsets, index * size).read_uint(size)?;

        usize::try_from(value).ok()?.checked_sub(1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an INDEX with the given offset size.
    pub(crate) fn build_index(objects: &[&[u8]], offset_size: u8) -> Vec<u8> {
        let mut out = (objects.len() as u16).to_be_bytes().to_vec();

        if objects.is_empty() {
            return out;
        }

        out.push(offset_size);

        let mut offset = 1_u32;
        let push_offset = |out: &mut Vec<u8>, offset: u32| {
            out.extend(&offset.to_be_bytes()[4 - usize::from(offset_size)..]);
        };

        push_offset(&mut out, offset);
        for object in objects {
            offset += object.len() as u32;
            push_offset(&mut out, offset);
        }

        for object in objects {
            out.extend(*object);
        }

        out
    }

    #[test]
    fn empty_index() {
        let mut r = Reader::new(&[0, 0, 0xFF]);
        let index = parse_index(&mut r).unwrap();

        assert!(index.is_empty());
        assert_eq!(index.get(0), None);
        assert_eq!(r.offset(), 2);
    }

    #[test]
    fn offset_sizes() {
        for size in 1..=4 {
            let data = build_index(&[b"abc", b"", b"de"], size);
            let mut r = Reader::new(&data);
            let index = parse_index(&mut r).unwrap();

            assert_eq!(index.len(), 3);
            assert_eq!(index.get(0), Some(&b"abc"[..]));
            assert_eq!(index.get(1), Some(&b""[..]));
            assert_eq!(index.get(2), Some(&b"de"[..]));
            assert_eq!(index.get(3), None);
            assert!(r.at_end());
        }
    }

    #[test]
    fn invalid_index() {
        // Offset size 5.
        assert!(parse_index(&mut Reader::new(&[0, 1, 5, 0, 0, 0, 0, 1])).is_none());
        // Data shorter than the last offset.
        assert!(parse_index(&mut Reader::new(&[0, 1, 1, 1, 4, b'a'])).is_none());
        // Offsets must start at 1.
        let index = parse_index(&mut Reader::new(&[0, 1, 1, 0, 2, b'a'])).unwrap();
        assert_eq!(index.get(0), None);
    }
}
