//! Stream filters needed to read cross-reference streams.

use crate::keys::{
    AHX, ASCII_HEX_DECODE, BITS_PER_COMPONENT, COLORS, COLUMNS, DECODE_PARMS, FILTER, FL,
    FLATE_DECODE, PREDICTOR,
};
use crate::token::{Dictionary, Token};
use crate::trivia::{hex_value, is_white_space_character};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use log::warn;
use std::io::Read;

/// Decode stream data according to the `Filter` and `DecodeParms` entries of
/// its dictionary.
pub(crate) fn decode(data: &[u8], dict: &Dictionary) -> Option<Vec<u8>> {
    let filters = match dict.get(FILTER) {
        None => return Some(data.to_vec()),
        Some(Token::Name(n)) => vec![n.as_str()],
        Some(Token::Array(a)) => a.iter().filter_map(|t| t.as_name().map(|n| n.as_str())).collect(),
        Some(_) => {
            warn!("invalid filter entry");
            return None;
        }
    };

    let params = match dict.get(DECODE_PARMS) {
        Some(Token::Dictionary(d)) => vec![Some(d)],
        Some(Token::Array(a)) => a.iter().map(|t| t.as_dictionary()).collect(),
        _ => vec![],
    };

    let mut current = data.to_vec();

    for (i, filter) in filters.into_iter().enumerate() {
        let params = params.get(i).copied().flatten();

        current = match filter {
            FLATE_DECODE | FL => flate(&current, params)?,
            ASCII_HEX_DECODE | AHX => ascii_hex(&current)?,
            other => {
                warn!("unsupported filter {other}");
                return None;
            }
        };
    }

    Some(current)
}

fn flate(data: &[u8], params: Option<&Dictionary>) -> Option<Vec<u8>> {
    let decoded = inflate(ZlibDecoder::new(data)).or_else(|| inflate(DeflateDecoder::new(data)))?;
    let params = params.map(PredictorParams::from_dict).unwrap_or_default();

    apply_predictor(decoded, &params)
}

fn inflate(mut decoder: impl Read) -> Option<Vec<u8>> {
    let mut out = Vec::new();

    match decoder.read_to_end(&mut out) {
        Ok(_) => Some(out),
        // Truncated streams are common, keep whatever could be decoded.
        Err(_) if !out.is_empty() => {
            warn!("flate stream is corrupt, using {} decoded bytes", out.len());
            Some(out)
        }
        Err(_) => None,
    }
}

fn ascii_hex(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high = None;

    for b in data.iter().copied() {
        if b == b'>' {
            break;
        }

        if is_white_space_character(b) {
            continue;
        }

        let nibble = hex_value(b)?;

        match high.take() {
            Some(h) => out.push((h << 4) | nibble),
            None => high = Some(nibble),
        }
    }

    if let Some(h) = high {
        out.push(h << 4);
    }

    Some(out)
}

struct PredictorParams {
    predictor: u8,
    colors: usize,
    bits_per_component: usize,
    columns: usize,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

impl PredictorParams {
    fn from_dict(dict: &Dictionary) -> Self {
        let default = Self::default();

        Self {
            predictor: dict
                .get_i64(PREDICTOR)
                .and_then(|p| u8::try_from(p).ok())
                .unwrap_or(default.predictor),
            colors: dict.get_usize(COLORS).unwrap_or(default.colors),
            bits_per_component: dict
                .get_usize(BITS_PER_COMPONENT)
                .unwrap_or(default.bits_per_component),
            columns: dict.get_usize(COLUMNS).unwrap_or(default.columns),
        }
    }

    fn bytes_per_pixel(&self) -> usize {
        (self.colors * self.bits_per_component).div_ceil(8).max(1)
    }

    fn row_length(&self) -> usize {
        (self.colors * self.bits_per_component * self.columns).div_ceil(8)
    }
}

fn apply_predictor(data: Vec<u8>, params: &PredictorParams) -> Option<Vec<u8>> {
    match params.predictor {
        1 => Some(data),
        2 => tiff_predictor(data, params),
        10..=15 => png_predictor(&data, params),
        other => {
            warn!("unknown predictor {other}");
            None
        }
    }
}

fn tiff_predictor(mut data: Vec<u8>, params: &PredictorParams) -> Option<Vec<u8>> {
    if params.bits_per_component != 8 {
        warn!("TIFF predictor with {} bits per component", params.bits_per_component);
        return None;
    }

    let row_length = params.row_length();
    let bpp = params.bytes_per_pixel();

    if row_length == 0 {
        return None;
    }

    for row in data.chunks_mut(row_length) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }

    Some(data)
}

fn png_predictor(data: &[u8], params: &PredictorParams) -> Option<Vec<u8>> {
    let row_length = params.row_length();
    let bpp = params.bytes_per_pixel();

    if row_length == 0 {
        return None;
    }

    // Each row starts with a byte naming the predictor used for it.
    let rows = data.chunks(row_length + 1);
    let mut out = Vec::with_capacity(rows.len() * row_length);
    let mut previous = vec![0; row_length];

    for row in rows {
        let (&kind, row) = row.split_first()?;
        let mut current = vec![0; row_length];

        for i in 0..row.len() {
            let left = if i >= bpp { current[i - bpp] } else { 0 };
            let up = previous[i];
            let up_left = if i >= bpp { previous[i - bpp] } else { 0 };

            current[i] = match kind {
                0 => row[i],
                1 => row[i].wrapping_add(left),
                2 => row[i].wrapping_add(up),
                3 => row[i].wrapping_add(((u16::from(left) + u16::from(up)) / 2) as u8),
                4 => row[i].wrapping_add(paeth(left, up, up_left)),
                _ => {
                    warn!("invalid PNG predictor row type {kind}");
                    return None;
                }
            };
        }

        current.truncate(row.len());
        out.extend_from_slice(&current);
        current.resize(row_length, 0);
        previous = current;
    }

    Some(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
