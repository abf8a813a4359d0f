//! Dictionary tokens.

use crate::token::{Name, Number, ObjectIdentifier, PdfString, Token};

/// A PDF dictionary.
///
/// Entries keep the order in which they appeared in the file, so that a
/// dictionary writes back out the way it was read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(Name, Token)>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. An existing entry with the same key keeps its
    /// position and gets the new value.
    pub fn insert(&mut self, key: impl Into<Name>, value: Token) {
        let key = key.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Token> {
        let pos = self.entries.iter().position(|(k, _)| k.as_str() == key)?;

        Some(self.entries.remove(pos).1)
    }

    /// The value of an entry.
    pub fn get(&self, key: &str) -> Option<&Token> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    /// Whether the dictionary has an entry for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Token)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// The keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Get a name entry.
    pub fn get_name(&self, key: &str) -> Option<&Name> {
        self.get(key)?.as_name()
    }

    /// Get a numeric entry.
    pub fn get_number(&self, key: &str) -> Option<Number> {
        self.get(key)?.as_number()
    }

    /// Get an integer entry. Reals are truncated.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_number(key).map(|n| n.as_i64())
    }

    /// Get a non-negative integer entry as an offset or count.
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        usize::try_from(self.get_i64(key)?).ok()
    }

    /// Get a nested dictionary.
    pub fn get_dictionary(&self, key: &str) -> Option<&Self> {
        self.get(key)?.as_dictionary()
    }

    /// Get an array entry.
    pub fn get_array(&self, key: &str) -> Option<&[Token]> {
        self.get(key)?.as_array()
    }

    /// Get an indirect reference entry.
    pub fn get_reference(&self, key: &str) -> Option<ObjectIdentifier> {
        self.get(key)?.as_reference()
    }

    /// Get a string entry (literal or hexadecimal).
    pub fn get_string(&self, key: &str) -> Option<&PdfString> {
        self.get(key)?.as_string()
    }
}

impl FromIterator<(Name, Token)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (Name, Token)>>(iter: T) -> Self {
        let mut dict = Self::new();

        for (k, v) in iter {
            dict.insert(k, v);
        }

        dict
    }
}

impl IntoIterator for Dictionary {
    type Item = (Name, Token);
    type IntoIter = std::vec::IntoIter<(Name, Token)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut dict = Dictionary::new();
        dict.insert("Type", Token::Name(Name::new("Catalog")));
        dict.insert("Count", Token::Number(Number::Integer(1)));
        dict.insert("Type", Token::Name(Name::new("Pages")));

        let keys = dict.keys().map(|k| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, ["Type", "Count"]);
        assert_eq!(dict.get_name("Type").unwrap().as_str(), "Pages");
        assert_eq!(dict.get_i64("Count"), Some(1));
        assert!(dict.remove("Type").is_some());
        assert_eq!(dict.len(), 1);
    }
}
