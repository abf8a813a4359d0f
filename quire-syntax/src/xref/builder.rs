//! Merging cross-reference parts.

use crate::error::Result;
use crate::keys::{ROOT, SIZE};
use crate::token::{Dictionary, ObjectIdentifier, Token};
use crate::xref::{CrossReferenceTable, CrossReferenceTablePart, Trailer};
use log::{debug, warn};
use rustc_hash::FxHashMap;

/// Collects the cross-reference parts of a file and merges them.
#[derive(Debug, Default)]
pub struct CrossReferenceTableBuilder {
    parts: Vec<CrossReferenceTablePart>,
    root_fallback: Option<ObjectIdentifier>,
}

impl CrossReferenceTableBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part.
    pub fn add(&mut self, part: CrossReferenceTablePart) {
        self.parts.push(part);
    }

    /// The parts added so far.
    pub fn parts(&self) -> &[CrossReferenceTablePart] {
        &self.parts
    }

    /// Use `root` when no trailer names a catalog.
    pub fn set_root_fallback(&mut self, root: ObjectIdentifier) {
        self.root_fallback = Some(root);
    }

    /// Merge the parts, starting the `Prev` walk at `first_offset`.
    ///
    /// Newer parts override the object locations and trailer entries of
    /// older ones, except for `Size`, which keeps the value of the oldest
    /// trailer that has one.
    pub fn build(&self, first_offset: usize) -> Result<CrossReferenceTable> {
        let ordered = self.fold_order(first_offset);

        let mut dictionary = Dictionary::new();
        let mut object_offsets = FxHashMap::default();
        let mut parts = Vec::with_capacity(ordered.len());

        for part in ordered {
            debug!("merging {:?} cross-reference part at {}", part.kind(), part.offset());

            for (key, value) in part.dictionary().iter() {
                if key.as_str() == SIZE && dictionary.contains_key(SIZE) {
                    continue;
                }

                dictionary.insert(key.clone(), value.clone());
            }

            object_offsets.extend(part.entries().iter().map(|(k, v)| (*k, *v)));
            parts.push((part.offset(), part.kind()));
        }

        if !dictionary.contains_key(ROOT)
            && let Some(root) = self.root_fallback
        {
            warn!("trailer has no Root entry, using catalog {root}");
            dictionary.insert(ROOT, Token::Reference(root));
        }

        Ok(CrossReferenceTable {
            object_offsets,
            trailer: Trailer::from_dictionary(dictionary)?,
            parts,
        })
    }

    /// The parts in the order they are merged, oldest first.
    fn fold_order(&self, first_offset: usize) -> Vec<&CrossReferenceTablePart> {
        let find = |offset| self.parts.iter().position(|p| p.offset() == offset);

        if find(first_offset).is_none() {
            warn!("no cross-reference part at offset {first_offset}, merging all parts");

            let mut all = self.parts.iter().collect::<Vec<_>>();
            all.sort_by_key(|p| p.offset());

            return all;
        }

        let mut visited = Vec::new();
        let mut next = Some(first_offset);
        let mut iterations = 0;

        while let Some(offset) = next {
            // A cyclic `Prev` chain cannot visit more parts than exist.
            if iterations >= self.parts.len() {
                warn!("cross-reference chain does not terminate, stopping at {offset}");
                break;
            }

            iterations += 1;

            let Some(index) = find(offset) else {
                warn!("missing cross-reference part for Prev offset {offset}");
                break;
            };

            visited.push(&self.parts[index]);
            visited.extend(self.parts.iter().filter(|p| p.tied_to() == Some(offset)));

            next = self.parts[index].previous();
        }

        visited.reverse();
        visited
    }
}
