//! Reading CMap files through the PDF token scanner.

use crate::builder::CharacterMapBuilder;
use crate::error::{CMapError, Result};
use crate::{CMap, CidSystemInfo, WritingMode, predefined};
use log::{debug, warn};
use quire_syntax::scanner::{CoreTokenScanner, DictionarySchema, ScannerOptions, TokenScanner};
use quire_syntax::token::{Dictionary, Name, Token};

/// How deep `usecmap` chains may go before parsing gives up.
const MAX_NESTING_DEPTH: u32 = 16;

pub(crate) fn parse<'a>(
    data: &[u8],
    options: ScannerOptions,
    resolver: &dyn Fn(&str) -> Option<&'a [u8]>,
    depth: u32,
) -> Result<CMap> {
    // A CMap that uses itself would otherwise recurse forever.
    if depth >= MAX_NESTING_DEPTH {
        return Err(CMapError::NestingTooDeep);
    }

    let mut scanner =
        CoreTokenScanner::new(data, options).with_schema(DictionarySchema::cid_system_info());
    let mut builder = CharacterMapBuilder::new();
    let mut last_name: Option<Name> = None;

    while let Some(token) = next_token(&mut scanner)? {
        match token {
            Token::Name(name) => {
                if !read_attribute(&name, &mut scanner, &mut builder)? {
                    last_name = Some(name);
                }
            }
            Token::Operator(op) => match op.as_str() {
                "begincodespacerange" => {
                    let tokens = read_block(&mut scanner, "codespacerange", options)?;

                    for entry in tokens.chunks(2) {
                        let result = codespace_range(&mut builder, entry);
                        check_entry(result, "codespacerange", "two hex strings", options)?;
                    }
                }
                "begincidchar" | "beginnotdefchar" => {
                    let notdef = op.as_str() == "beginnotdefchar";
                    let block = if notdef { "notdefchar" } else { "cidchar" };
                    let tokens = read_block(&mut scanner, block, options)?;

                    for entry in tokens.chunks(2) {
                        let result = cid_char(&mut builder, entry, notdef);
                        check_entry(result, block, "a hex string and a CID", options)?;
                    }
                }
                "begincidrange" | "beginnotdefrange" => {
                    let notdef = op.as_str() == "beginnotdefrange";
                    let block = if notdef { "notdefrange" } else { "cidrange" };
                    let tokens = read_block(&mut scanner, block, options)?;

                    for entry in tokens.chunks(3) {
                        let result = cid_range(&mut builder, entry, notdef);
                        check_entry(result, block, "two hex strings and a CID", options)?;
                    }
                }
                "beginbfchar" => {
                    let tokens = read_block(&mut scanner, "bfchar", options)?;

                    for entry in tokens.chunks(2) {
                        let result = bf_char(&mut builder, entry);
                        check_entry(result, "bfchar", "a hex string and a destination", options)?;
                    }
                }
                "beginbfrange" => {
                    let tokens = read_block(&mut scanner, "bfrange", options)?;

                    for entry in tokens.chunks(3) {
                        let result = bf_range(&mut builder, entry);
                        check_entry(
                            result,
                            "bfrange",
                            "two hex strings and a destination",
                            options,
                        )?;
                    }
                }
                "usecmap" => {
                    let Some(name) = last_name.take() else {
                        check_entry(None, "usecmap", "a preceding CMap name", options)?;
                        continue;
                    };

                    if let Some(base) = resolve(name.as_str(), options, resolver, depth)? {
                        builder.use_cmap(&base);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok(builder.build())
}

fn codespace_range(builder: &mut CharacterMapBuilder, entry: &[Token]) -> Option<()> {
    let [low, high] = entry else { return None };

    builder.add_codespace_range(bytes(low)?, bytes(high)?)
}

fn cid_char(builder: &mut CharacterMapBuilder, entry: &[Token], notdef: bool) -> Option<()> {
    let [code, cid] = entry else { return None };
    let (code, cid) = (bytes(code)?, integer(cid)?);

    if notdef {
        builder.add_notdef_character(code, cid)
    } else {
        builder.add_cid_character(code, cid)
    }
}

fn cid_range(builder: &mut CharacterMapBuilder, entry: &[Token], notdef: bool) -> Option<()> {
    let [start, end, cid] = entry else {
        return None;
    };
    let (start, end, cid) = (bytes(start)?, bytes(end)?, integer(cid)?);

    if notdef {
        builder.add_notdef_range(start, end, cid)
    } else {
        builder.add_cid_range(start, end, cid)
    }
}

fn bf_char(builder: &mut CharacterMapBuilder, entry: &[Token]) -> Option<()> {
    match entry {
        [_, Token::Name(glyph)] => {
            debug!("ignoring bfchar destination /{glyph}");
            Some(())
        }
        [code, destination] => builder.add_base_font_character(bytes(code)?, bytes(destination)?),
        _ => None,
    }
}

fn bf_range(builder: &mut CharacterMapBuilder, entry: &[Token]) -> Option<()> {
    match entry {
        [start, end, Token::Array(destinations)] => {
            let destinations = destinations.iter().map(bytes).collect::<Option<Vec<_>>>()?;

            builder.add_base_font_range_array(bytes(start)?, bytes(end)?, &destinations)
        }
        [start, end, destination] => {
            builder.add_base_font_range(bytes(start)?, bytes(end)?, bytes(destination)?)
        }
        _ => None,
    }
}

/// The next token that isn't a comment.
fn next_token(scanner: &mut CoreTokenScanner<'_>) -> Result<Option<Token>> {
    while scanner.move_next()? {
        match scanner.take_current() {
            Some(Token::Comment(_)) => continue,
            token => return Ok(token),
        }
    }

    Ok(None)
}

/// Set the builder field for an attribute name and its value.
///
/// Returns `false` if `name` is not an attribute.
fn read_attribute(
    name: &Name,
    scanner: &mut CoreTokenScanner<'_>,
    builder: &mut CharacterMapBuilder,
) -> Result<bool> {
    match name.as_str() {
        "CMapName" => {
            builder.name = next_token(scanner)?
                .as_ref()
                .and_then(Token::as_name)
                .map(|n| n.as_str().to_owned());
        }
        "CMapVersion" => {
            builder.version = next_token(scanner)?
                .and_then(|t| t.as_number())
                .map(|n| n.as_f64());
        }
        "CMapType" => {
            builder.cmap_type = next_token(scanner)?.and_then(|t| t.as_integer());
        }
        "WMode" => {
            builder.writing_mode = match next_token(scanner)?.and_then(|t| t.as_integer()) {
                Some(0) => Some(WritingMode::Horizontal),
                Some(1) => Some(WritingMode::Vertical),
                other => {
                    warn!("invalid WMode {other:?}");
                    None
                }
            };
        }
        "CIDSystemInfo" => builder.system_info = read_system_info(scanner)?,
        _ => return Ok(false),
    }

    Ok(true)
}

fn read_system_info(scanner: &mut CoreTokenScanner<'_>) -> Result<Option<CidSystemInfo>> {
    let info = match next_token(scanner)? {
        Some(Token::Dictionary(dict)) => system_info_from_dict(&dict),
        Some(Token::Array(items)) => items
            .first()
            .and_then(Token::as_dictionary)
            .and_then(system_info_from_dict),
        // `3 dict dup begin /Registry (Adobe) def ... end`
        Some(Token::Number(_)) => {
            let mut dict = Dictionary::new();

            while let Some(token) = next_token(scanner)? {
                match token {
                    Token::Operator(op) if op == "end" => break,
                    Token::Name(key) => {
                        if let Some(value) = next_token(scanner)? {
                            dict.insert(key, value);
                        }
                    }
                    _ => {}
                }
            }

            system_info_from_dict(&dict)
        }
        _ => None,
    };

    if info.is_none() {
        warn!("ignoring invalid CIDSystemInfo");
    }

    Ok(info)
}

fn system_info_from_dict(dict: &Dictionary) -> Option<CidSystemInfo> {
    // Some producers write names instead of strings.
    let text = |key: &str| match dict.get(key)? {
        Token::Name(name) => Some(name.as_str().to_owned()),
        token => token.as_string().map(|s| s.text()),
    };

    Some(CidSystemInfo {
        registry: text("Registry")?,
        ordering: text("Ordering")?,
        supplement: dict.get_i64("Supplement")?,
    })
}

/// Collect the tokens up to `end<block>`.
fn read_block(
    scanner: &mut CoreTokenScanner<'_>,
    block: &'static str,
    options: ScannerOptions,
) -> Result<Vec<Token>> {
    let end = format!("end{block}");
    let mut tokens = Vec::new();

    while let Some(token) = next_token(scanner)? {
        if token.is_operator(&end) {
            return Ok(tokens);
        }

        tokens.push(token);
    }

    check_entry(None, block, "a closing operator", options)?;

    Ok(tokens)
}

/// Skip malformed entries in lenient mode.
fn check_entry(
    result: Option<()>,
    block: &'static str,
    reason: &'static str,
    options: ScannerOptions,
) -> Result<()> {
    match result {
        Some(()) => Ok(()),
        None if options.lenient => {
            warn!("skipping invalid {block} entry, expected {reason}");
            Ok(())
        }
        None => Err(CMapError::InvalidEntry { block, reason }),
    }
}

fn resolve<'a>(
    name: &str,
    options: ScannerOptions,
    resolver: &dyn Fn(&str) -> Option<&'a [u8]>,
    depth: u32,
) -> Result<Option<CMap>> {
    let Some(data) = predefined::load(name).or_else(|| resolver(name)) else {
        if options.lenient {
            warn!("ignoring usecmap of unknown CMap {name}");
            return Ok(None);
        }

        return Err(CMapError::MissingResource(name.to_owned()));
    };

    debug!("using CMap {name}");

    match parse(data, options, resolver, depth + 1) {
        Ok(cmap) => Ok(Some(cmap)),
        Err(CMapError::NestingTooDeep) if options.lenient => {
            warn!("usecmap of {name} is nested too deeply, ignoring it");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn bytes(token: &Token) -> Option<&[u8]> {
    token.as_string().map(|s| s.as_bytes())
}

fn integer(token: &Token) -> Option<u32> {
    u32::try_from(token.as_integer()?).ok()
}
