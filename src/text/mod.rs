// ABOUTME: Text codecs translating between UTF-8 and the character sets SMPP carries on the wire
// ABOUTME: A codec is selected by the data_coding octet of the PDU that carries the text

use crate::datatypes::DataCoding;
use bytes::Bytes;
use thiserror::Error;

mod gsm7;
mod iso88595;
mod latin1;
mod raw;
mod silent;
mod ucs2;

pub use gsm7::Gsm7;
pub use iso88595::Iso88595;
pub use latin1::Latin1;
pub use raw::Raw;
pub use silent::Silent;
pub use ucs2::Ucs2;

/// Errors raised while converting text to or from a wire encoding
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("text is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("character {ch:?} cannot be represented in {coding}")]
    Unrepresentable { ch: char, coding: DataCoding },

    #[error("UCS-2 data must have an even length, got {0} octets")]
    OddLength(usize),

    #[error("invalid UCS-2 code unit 0x{0:04X}")]
    InvalidCodeUnit(u16),

    #[error("octet 0x{0:02X} is outside the GSM 7-bit alphabet")]
    InvalidSeptet(u8),

    #[error("no text codec for {0:?}")]
    Unsupported(DataCoding),
}

/// A stateless converter between UTF-8 text and one wire character set.
///
/// Both directions work on whole byte sequences: `encode` takes UTF-8 and
/// returns the wire octets, `decode` takes wire octets and returns UTF-8.
pub trait Codec: Send + Sync {
    /// The data_coding value this codec writes on the wire
    fn coding(&self) -> DataCoding;

    fn encode(&self, text: &[u8]) -> Result<Bytes, TextError>;

    fn decode(&self, data: &[u8]) -> Result<Bytes, TextError>;
}

/// Looks up the codec for a data_coding value.
pub fn codec_for(coding: DataCoding) -> Result<&'static dyn Codec, TextError> {
    match coding {
        DataCoding::SmscDefault => Ok(&Gsm7),
        DataCoding::Latin1 => Ok(&Latin1),
        DataCoding::Binary | DataCoding::OctetUnspecified => Ok(&Raw),
        DataCoding::Cyrillic => Ok(&Iso88595),
        DataCoding::Ucs2 => Ok(&Ucs2),
        DataCoding::Silent => Ok(&Silent),
        other => Err(TextError::Unsupported(other)),
    }
}

/// Encodes UTF-8 `text` with the codec selected by `coding`.
///
/// # Example
///
/// ```
/// use smpp_client::datatypes::DataCoding;
/// use smpp_client::text;
///
/// let wire = text::encode(DataCoding::Latin1, "moço".as_bytes()).unwrap();
/// assert_eq!(&wire[..], b"mo\xe7o");
/// ```
pub fn encode(coding: DataCoding, text: &[u8]) -> Result<Bytes, TextError> {
    codec_for(coding)?.encode(text)
}

/// Decodes wire octets into UTF-8 with the codec selected by `coding`.
pub fn decode(coding: DataCoding, data: &[u8]) -> Result<Bytes, TextError> {
    codec_for(coding)?.decode(data)
}

fn as_utf8(text: &[u8]) -> Result<&str, TextError> {
    std::str::from_utf8(text).map_err(|e| TextError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}

/// Encodes every character with a one-octet mapping, failing on the first
/// character the mapping rejects.
fn encode_single_octet(
    text: &[u8],
    coding: DataCoding,
    map: impl Fn(char) -> Option<u8>,
) -> Result<Bytes, TextError> {
    let text = as_utf8(text)?;
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        out.push(map(ch).ok_or(TextError::Unrepresentable { ch, coding })?);
    }
    Ok(Bytes::from(out))
}

fn decode_single_octet(data: &[u8], map: impl Fn(u8) -> char) -> Bytes {
    Bytes::from(data.iter().map(|&b| map(b)).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LATIN: &str = "áéíóú moço";
    const CYRILLIC: &str = "Тест кодировки";
    const CYRILLIC_WIRE: &[u8] = b"\xc2\xd5\xe1\xe2 \xda\xde\xd4\xd8\xe0\xde\xd2\xda\xd8";
    const UCS2_WIRE: &[u8] =
        b"\x00\xe1\x00\xe9\x00\xed\x00\xf3\x00\xfa\x00 \x00m\x00o\x00\xe7\x00o";

    #[test]
    fn encode_by_coding() {
        let cases: [(DataCoding, &[u8]); 4] = [
            (DataCoding::Latin1, b"\xe1\xe9\xed\xf3\xfa mo\xe7o"),
            (DataCoding::Cyrillic, CYRILLIC_WIRE),
            (DataCoding::Ucs2, UCS2_WIRE),
            (DataCoding::Silent, b""),
        ];
        for (coding, want) in cases {
            let text = if coding == DataCoding::Cyrillic { CYRILLIC } else { LATIN };
            let have = encode(coding, text.as_bytes()).unwrap();
            assert_eq!(&have[..], want, "coding {coding:?}");
        }
    }

    #[test]
    fn decode_by_coding() {
        assert_eq!(
            &decode(DataCoding::Latin1, b"\xe1\xe9\xed\xf3\xfa mo\xe7o").unwrap()[..],
            LATIN.as_bytes()
        );
        assert_eq!(
            &decode(DataCoding::Cyrillic, CYRILLIC_WIRE).unwrap()[..],
            CYRILLIC.as_bytes()
        );
        assert_eq!(&decode(DataCoding::Ucs2, UCS2_WIRE).unwrap()[..], LATIN.as_bytes());
        // silent data is passed through untouched
        assert_eq!(
            &decode(DataCoding::Silent, LATIN.as_bytes()).unwrap()[..],
            LATIN.as_bytes()
        );
    }

    #[test]
    fn codecs_report_their_coding() {
        for coding in [
            DataCoding::SmscDefault,
            DataCoding::Latin1,
            DataCoding::OctetUnspecified,
            DataCoding::Cyrillic,
            DataCoding::Ucs2,
            DataCoding::Silent,
        ] {
            assert_eq!(codec_for(coding).unwrap().coding(), coding);
        }
        assert_eq!(codec_for(DataCoding::Binary).unwrap().coding(), DataCoding::OctetUnspecified);
    }

    #[test]
    fn unsupported_coding_is_an_error() {
        assert_eq!(
            encode(DataCoding::Jis, b"x"),
            Err(TextError::Unsupported(DataCoding::Jis))
        );
        assert_eq!(
            decode(DataCoding::Custom(0xF5), b"x"),
            Err(TextError::Unsupported(DataCoding::Custom(0xF5)))
        );
    }

    #[test]
    fn invalid_utf8_input_is_rejected() {
        assert_eq!(
            encode(DataCoding::Latin1, b"ok\xff"),
            Err(TextError::InvalidUtf8 { valid_up_to: 2 })
        );
    }
}
