//! The encryption of the private part and of charstrings.

use log::debug;

/// Key of the `eexec` encrypted part of a font.
pub(crate) const EEXEC_KEY: u16 = 55665;
/// Key of encrypted charstrings.
pub(crate) const CHARSTRING_KEY: u16 = 4330;

/// Random bytes at the start of the `eexec` part.
pub(crate) const EEXEC_PREFIX_LEN: usize = 4;

#[inline]
pub(crate) fn decrypt_byte(cipher: u8, r: &mut u16) -> u8 {
    let plain = cipher ^ (*r >> 8) as u8;
    *r = u16::from(cipher)
        .wrapping_add(*r)
        .wrapping_mul(52845)
        .wrapping_add(22719);
    plain
}

/// Decrypt `data`, dropping the first `skip` plain bytes.
pub(crate) fn decrypt(data: &[u8], key: u16, skip: usize) -> Vec<u8> {
    let mut r = key;

    data.iter()
        .map(|b| decrypt_byte(*b, &mut r))
        .skip(skip)
        .collect()
}

/// Decrypt the part of the font after `eexec`, which is either binary or
/// hex encoded.
pub(crate) fn decrypt_eexec(data: &[u8]) -> Vec<u8> {
    let start = data
        .iter()
        .position(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .unwrap_or(data.len());
    let data = &data[start..];

    let is_hex = data.len() >= 4 && data[..4].iter().all(u8::is_ascii_hexdigit);

    if is_hex {
        debug!("eexec part is hex encoded");
        decrypt(&decode_hex(data), EEXEC_KEY, EEXEC_PREFIX_LEN)
    } else {
        decrypt(data, EEXEC_KEY, EEXEC_PREFIX_LEN)
    }
}

/// Decrypt a charstring or subroutine.
///
/// With a `len_iv` of `None` the data is not encrypted at all.
pub(crate) fn decrypt_charstring(data: &[u8], len_iv: Option<usize>) -> Option<Vec<u8>> {
    match len_iv {
        None => Some(data.to_vec()),
        Some(len_iv) if data.len() >= len_iv => Some(decrypt(data, CHARSTRING_KEY, len_iv)),
        Some(_) => None,
    }
}

/// Decode hex digits up to the first byte that is neither a digit nor
/// whitespace. An odd final digit is padded with zero.
fn decode_hex(data: &[u8]) -> Vec<u8> {
    let digits = data
        .iter()
        .take_while(|b| b.is_ascii_hexdigit() || b.is_ascii_whitespace() || **b == 0)
        .filter_map(|b| char::from(*b).to_digit(16))
        .map(|d| d as u8)
        .collect::<Vec<_>>();

    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn encrypt(plain: &[u8], key: u16) -> Vec<u8> {
        let mut r = key;

        plain
            .iter()
            .map(|p| {
                let cipher = p ^ (r >> 8) as u8;
                r = u16::from(cipher)
                    .wrapping_add(r)
                    .wrapping_mul(52845)
                    .wrapping_add(22719);
                cipher
            })
            .collect()
    }

    #[test]
    fn binary_and_hex_eexec() {
        let plain = b"abcd/Private 8 dict dup begin";
        let cipher = encrypt(plain, EEXEC_KEY);

        assert_eq!(decrypt_eexec(&cipher), &plain[4..]);

        let mut hex = b"\r\n".to_vec();
        for (i, b) in cipher.iter().enumerate() {
            hex.extend(format!("{b:02X}").bytes());
            if i % 8 == 7 {
                hex.push(b'\n');
            }
        }
        hex.extend(b"\n0000 cleartomark");

        // The zeros at the end are decrypted into garbage after the plain text.
        assert!(decrypt_eexec(&hex).starts_with(&plain[4..]));
    }

    #[test]
    fn charstrings() {
        let cipher = encrypt(&[1, 2, 3, 4, 139, 14], CHARSTRING_KEY);

        assert_eq!(decrypt_charstring(&cipher, Some(4)), Some(vec![139, 14]));
        assert_eq!(decrypt_charstring(&cipher, Some(7)), None);
        assert_eq!(decrypt_charstring(&[139, 14], None), Some(vec![139, 14]));
    }

    #[test]
    fn odd_hex_digits() {
        assert_eq!(decode_hex(b"1f2 x"), vec![0x1F, 0x20]);
    }
}
