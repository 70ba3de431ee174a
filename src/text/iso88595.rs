use super::{Codec, TextError, decode_single_octet, encode_single_octet};
use crate::datatypes::DataCoding;
use bytes::Bytes;

/// ISO-8859-5 (Latin/Cyrillic).
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso88595;

fn to_char(b: u8) -> char {
    let cp = match b {
        0x00..=0xA0 => u32::from(b),
        0xAD => 0x00AD,
        0xF0 => 0x2116,
        0xFD => 0x00A7,
        0xA1..=0xEF => 0x0401 + u32::from(b - 0xA1),
        0xF1..=0xFF => 0x0451 + u32::from(b - 0xF1),
    };
    // every value above is a scalar value below the surrogate range
    char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn from_char(ch: char) -> Option<u8> {
    let cp = u32::from(ch);
    let b = match cp {
        0x0000..=0x00A0 => cp,
        0x00AD => 0xAD,
        0x00A7 => 0xFD,
        0x2116 => 0xF0,
        // U+040D and U+045D are not in the set
        0x0401..=0x040C | 0x040E..=0x044F => cp - 0x0401 + 0xA1,
        0x0451..=0x045C | 0x045E..=0x045F => cp - 0x0451 + 0xF1,
        _ => return None,
    };
    u8::try_from(b).ok()
}

impl Codec for Iso88595 {
    fn coding(&self) -> DataCoding {
        DataCoding::Cyrillic
    }

    fn encode(&self, text: &[u8]) -> Result<Bytes, TextError> {
        encode_single_octet(text, DataCoding::Cyrillic, from_char)
    }

    fn decode(&self, data: &[u8]) -> Result<Bytes, TextError> {
        Ok(decode_single_octet(data, to_char))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_cyrillic_text() {
        let have = Iso88595.encode("Тест кодировки".as_bytes()).unwrap();
        assert_eq!(
            &have[..],
            b"\xc2\xd5\xe1\xe2 \xda\xde\xd4\xd8\xe0\xde\xd2\xda\xd8"
        );
        assert_eq!(Iso88595.coding().to_byte(), 0x06);
    }

    #[test]
    fn specials_map_both_ways() {
        for (b, ch) in [(0xA1, 'Ё'), (0xAD, '\u{AD}'), (0xF0, '№'), (0xFD, '§'), (0xFF, 'џ')] {
            assert_eq!(to_char(b), ch);
            assert_eq!(from_char(ch), Some(b));
        }
    }

    #[test]
    fn every_octet_round_trips() {
        for b in 0..=u8::MAX {
            assert_eq!(from_char(to_char(b)), Some(b), "octet 0x{b:02X}");
        }
    }

    #[test]
    fn rejects_latin_letters_with_accents() {
        assert!(matches!(
            Iso88595.encode("é".as_bytes()),
            Err(TextError::Unrepresentable { ch: 'é', .. })
        ));
    }
}
