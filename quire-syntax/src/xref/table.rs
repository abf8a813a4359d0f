//! The merged cross-reference table.

use crate::error::{Error, Result};
use crate::keys::{ENCRYPT, ID, INFO, PREV, ROOT, SIZE};
use crate::token::{Dictionary, ObjectIdentifier, PdfString, Token};
use crate::xref::{CrossReferenceType, XrefLocation};
use rustc_hash::FxHashMap;

/// The document trailer, merged over all cross-reference sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Trailer {
    /// The document catalog.
    pub root: ObjectIdentifier,
    /// The document information dictionary.
    pub info: Option<ObjectIdentifier>,
    /// The file identifiers.
    pub id: Vec<PdfString>,
    /// The encryption dictionary, as found.
    pub encrypt: Option<Token>,
    /// The number of entries in the cross-reference table.
    pub size: Option<u64>,
    /// The offset of the previous cross-reference section.
    pub previous_offset: Option<usize>,
    dictionary: Dictionary,
}

impl Trailer {
    /// Read a trailer from a merged trailer dictionary.
    pub fn from_dictionary(dictionary: Dictionary) -> Result<Self> {
        let root = dictionary.get_reference(ROOT).ok_or(Error::MissingRoot)?;

        Ok(Self {
            root,
            info: dictionary.get_reference(INFO),
            id: dictionary
                .get_array(ID)
                .map(|a| a.iter().filter_map(|t| t.as_string().cloned()).collect())
                .unwrap_or_default(),
            encrypt: dictionary.get(ENCRYPT).cloned(),
            size: dictionary
                .get_i64(SIZE)
                .and_then(|s| u64::try_from(s).ok()),
            previous_offset: dictionary.get_usize(PREV),
            dictionary,
        })
    }

    /// The whole merged dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

/// Object locations for a whole document.
#[derive(Debug, Clone)]
pub struct CrossReferenceTable {
    pub(crate) object_offsets: FxHashMap<ObjectIdentifier, XrefLocation>,
    pub(crate) trailer: Trailer,
    pub(crate) parts: Vec<(usize, CrossReferenceType)>,
}

impl CrossReferenceTable {
    /// The location of an object.
    pub fn get(&self, id: ObjectIdentifier) -> Option<XrefLocation> {
        self.object_offsets.get(&id).copied()
    }

    /// All object locations.
    pub fn object_offsets(&self) -> &FxHashMap<ObjectIdentifier, XrefLocation> {
        &self.object_offsets
    }

    /// The merged trailer.
    pub fn trailer(&self) -> &Trailer {
        &self.trailer
    }

    /// The offsets and kinds of the parts that were merged, oldest first.
    pub fn parts(&self) -> &[(usize, CrossReferenceType)] {
        &self.parts
    }

    /// The number of objects.
    pub fn len(&self) -> usize {
        self.object_offsets.len()
    }

    /// Whether no objects are known.
    pub fn is_empty(&self) -> bool {
        self.object_offsets.is_empty()
    }
}
