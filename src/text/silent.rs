use super::{Codec, TextError};
use crate::datatypes::DataCoding;
use bytes::Bytes;

/// The "discard message" coding (0xC0).
///
/// Outbound text is never transmitted, so `encode` always yields nothing.
/// Inbound data is handed over unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Codec for Silent {
    fn coding(&self) -> DataCoding {
        DataCoding::Silent
    }

    fn encode(&self, _text: &[u8]) -> Result<Bytes, TextError> {
        Ok(Bytes::new())
    }

    fn decode(&self, data: &[u8]) -> Result<Bytes, TextError> {
        Ok(Bytes::copy_from_slice(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_discards_and_decode_passes_through() {
        assert!(Silent.encode("anything".as_bytes()).unwrap().is_empty());
        assert!(Silent.encode(b"\xff\xfe").unwrap().is_empty());
        assert_eq!(&Silent.decode(b"\xff\xfe").unwrap()[..], b"\xff\xfe");
    }
}
