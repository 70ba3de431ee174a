use super::{Codec, TextError};
use crate::datatypes::DataCoding;
use bytes::Bytes;

/// Unspecified 8-bit data. Octets are copied in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Codec for Raw {
    fn coding(&self) -> DataCoding {
        DataCoding::OctetUnspecified
    }

    fn encode(&self, text: &[u8]) -> Result<Bytes, TextError> {
        Ok(Bytes::copy_from_slice(text))
    }

    fn decode(&self, data: &[u8]) -> Result<Bytes, TextError> {
        Ok(Bytes::copy_from_slice(data))
    }
}
