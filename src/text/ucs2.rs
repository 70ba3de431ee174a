use super::{Codec, TextError, as_utf8};
use crate::datatypes::DataCoding;
use bytes::{BufMut, Bytes, BytesMut};

/// UCS-2, written as big-endian 16-bit code units.
///
/// Only the Basic Multilingual Plane is representable; characters that would
/// need a surrogate pair are rejected on encode and surrogates are rejected
/// on decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ucs2;

impl Codec for Ucs2 {
    fn coding(&self) -> DataCoding {
        DataCoding::Ucs2
    }

    fn encode(&self, text: &[u8]) -> Result<Bytes, TextError> {
        let text = as_utf8(text)?;
        let mut out = BytesMut::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let unit = u16::try_from(u32::from(ch)).map_err(|_| TextError::Unrepresentable {
                ch,
                coding: DataCoding::Ucs2,
            })?;
            out.put_u16(unit);
        }
        Ok(out.freeze())
    }

    fn decode(&self, data: &[u8]) -> Result<Bytes, TextError> {
        if data.len() % 2 != 0 {
            return Err(TextError::OddLength(data.len()));
        }
        let mut out = String::with_capacity(data.len());
        for pair in data.chunks_exact(2) {
            let unit = u16::from_be_bytes([pair[0], pair[1]]);
            let ch = char::from_u32(u32::from(unit)).ok_or(TextError::InvalidCodeUnit(unit))?;
            out.push(ch);
        }
        Ok(Bytes::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_big_endian_units() {
        assert_eq!(&Ucs2.encode("á".as_bytes()).unwrap()[..], b"\x00\xe1");
        assert_eq!(&Ucs2.encode("Ж€".as_bytes()).unwrap()[..], b"\x04\x16\x20\xac");
    }

    #[test]
    fn round_trips_bmp_text() {
        let text = "Привет, 世界! ü";
        let wire = Ucs2.encode(text.as_bytes()).unwrap();
        assert_eq!(&Ucs2.decode(&wire).unwrap()[..], text.as_bytes());
    }

    #[test]
    fn rejects_astral_characters() {
        assert!(matches!(
            Ucs2.encode("😀".as_bytes()),
            Err(TextError::Unrepresentable { ch: '😀', .. })
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Ucs2.decode(b"\x00\xe1\x00"), Err(TextError::OddLength(3)));
        assert_eq!(
            Ucs2.decode(b"\xd8\x3d"),
            Err(TextError::InvalidCodeUnit(0xD83D))
        );
    }
}
