use super::{Codec, TextError, decode_single_octet, encode_single_octet};
use crate::datatypes::DataCoding;
use bytes::Bytes;

/// ISO-8859-1. Every octet is the Unicode code point of the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl Codec for Latin1 {
    fn coding(&self) -> DataCoding {
        DataCoding::Latin1
    }

    fn encode(&self, text: &[u8]) -> Result<Bytes, TextError> {
        encode_single_octet(text, DataCoding::Latin1, |ch| u8::try_from(u32::from(ch)).ok())
    }

    fn decode(&self, data: &[u8]) -> Result<Bytes, TextError> {
        Ok(decode_single_octet(data, char::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_whole_range() {
        let all: Vec<u8> = (0..=u8::MAX).collect();
        let text = Latin1.decode(&all).unwrap();
        assert_eq!(&Latin1.encode(&text).unwrap()[..], &all[..]);
    }

    #[test]
    fn rejects_characters_above_u00ff() {
        assert_eq!(
            Latin1.encode("€".as_bytes()),
            Err(TextError::Unrepresentable {
                ch: '€',
                coding: DataCoding::Latin1
            })
        );
    }
}
