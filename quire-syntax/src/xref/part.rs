//! A single parsed cross-reference section.

use crate::keys::{PREV, XREF_STM};
use crate::token::{Dictionary, ObjectIdentifier};
use rustc_hash::FxHashMap;

/// Where an object is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XrefLocation {
    /// At a byte offset in the file.
    Offset(usize),
    /// Inside an object stream.
    Compressed {
        /// The object number of the object stream.
        stream: u32,
        /// The index of the object inside the stream.
        index: u32,
    },
}

/// The syntax a cross-reference section was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossReferenceType {
    /// An `xref` table followed by a `trailer` dictionary.
    Table,
    /// A `/Type /XRef` stream.
    Stream,
}

/// One `xref` table or cross-reference stream, as found at one offset.
#[derive(Debug, Clone)]
pub struct CrossReferenceTablePart {
    offset: usize,
    kind: CrossReferenceType,
    entries: FxHashMap<ObjectIdentifier, XrefLocation>,
    dictionary: Dictionary,
    previous: Option<usize>,
    tied_to: Option<usize>,
}

impl CrossReferenceTablePart {
    /// Create a part. The `Prev` link is taken from `dictionary`.
    pub fn new(
        offset: usize,
        kind: CrossReferenceType,
        dictionary: Dictionary,
        entries: FxHashMap<ObjectIdentifier, XrefLocation>,
    ) -> Self {
        let previous = dictionary.get_usize(PREV);

        Self {
            offset,
            kind,
            entries,
            dictionary,
            previous,
            tied_to: None,
        }
    }

    /// Tie the part to the table at `offset`, for the stream referenced by a
    /// hybrid file's `XRefStm` entry.
    pub fn tied_to_table(mut self, offset: usize) -> Self {
        self.tied_to = Some(offset);
        self
    }

    /// The offset the part was reached through.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The syntax of the part.
    pub fn kind(&self) -> CrossReferenceType {
        self.kind
    }

    /// The in-use entries of the part.
    pub fn entries(&self) -> &FxHashMap<ObjectIdentifier, XrefLocation> {
        &self.entries
    }

    /// The trailer dictionary (or stream dictionary) of the part.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// The offset of the previous, older part.
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    /// The offset of the table this part belongs to.
    pub fn tied_to(&self) -> Option<usize> {
        self.tied_to
    }

    /// The offset of the stream a hybrid table points to.
    pub fn xref_stream_offset(&self) -> Option<usize> {
        match self.kind {
            CrossReferenceType::Table => self.dictionary.get_usize(XREF_STM),
            CrossReferenceType::Stream => None,
        }
    }
}
