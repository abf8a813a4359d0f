//! Dictionaries.

use crate::error::Result;
use crate::scanner::{CoreTokenScanner, ScannerScope};
use crate::token::{Dictionary, Name, Token};
use crate::tokenizer::collapse_references;
use log::warn;

/// Tokenizes `<<...>>` dictionaries.
///
/// With a non-empty list of required keys, the dictionary is read in schema
/// mode: keys that are not names are skipped instead of failing the
/// dictionary, and a `>>` that arrives before every required key was seen
/// does not end it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryTokenizer<'k> {
    required_keys: &'k [Name],
}

impl<'k> DictionaryTokenizer<'k> {
    /// A tokenizer that requires the given keys.
    pub fn with_required_keys(required_keys: &'k [Name]) -> Self {
        Self { required_keys }
    }

    /// Try to read a dictionary whose first `<` was just consumed.
    ///
    /// Returns `Ok(None)` if the input does not start with `<<`, a key is not
    /// a name, or the input ends before the dictionary is closed.
    pub fn try_tokenize(
        &self,
        first: u8,
        scanner: &mut CoreTokenScanner<'_>,
    ) -> Result<Option<Token>> {
        if first != b'<' || scanner.reader_mut().eat(|b| b == b'<').is_none() {
            return Ok(None);
        }

        let schema = !self.required_keys.is_empty();
        let mut dict = Dictionary::new();
        let mut pending = Vec::new();

        loop {
            let Some(scoped) = scanner.scan_scope(ScannerScope::Dictionary)? else {
                return Ok(None);
            };

            pending.extend(scoped);

            if !absorb(&mut dict, &mut pending, schema) {
                return Ok(None);
            }

            if self.required_keys.iter().all(|k| dict.contains_key(k)) {
                if let Some(Token::Name(name)) = pending.first() {
                    warn!("dictionary key {name} has no value");
                }

                return Ok(Some(Token::Dictionary(dict)));
            }

            warn!(
                "dictionary closed before all required keys {:?} were found, continuing",
                self.required_keys
            );
        }
    }
}

/// Move the key-value pairs of `pending` into `dict`.
///
/// A trailing key without a value stays in `pending`, so that its value can
/// arrive after an early `>>`. Returns `false` if a key is not a name outside
/// of schema mode.
fn absorb(dict: &mut Dictionary, pending: &mut Vec<Token>, schema: bool) -> bool {
    let mut tokens = collapse_references(core::mem::take(pending)).into_iter();

    while let Some(key) = tokens.next() {
        match key {
            Token::Name(name) => match tokens.next() {
                Some(value) => dict.insert(name, value),
                None => pending.push(Token::Name(name)),
            },
            _ if schema => continue,
            _ => return false,
        }
    }

    true
}
