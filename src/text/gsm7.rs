use super::{Codec, TextError, as_utf8};
use crate::datatypes::DataCoding;
use bytes::Bytes;

const ESCAPE: u8 = 0x1B;

/// GSM 03.38 default alphabet, indexed by septet. The escape slot holds a
/// placeholder that is never matched on encode.
const BASIC: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1B}', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

/// Characters reached through the escape septet.
const EXTENSION: [(u8, char); 10] = [
    (0x0A, '\u{0C}'),
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];

/// The GSM 7-bit default alphabet, one septet per octet (unpacked).
#[derive(Debug, Clone, Copy, Default)]
pub struct Gsm7;

impl Codec for Gsm7 {
    fn coding(&self) -> DataCoding {
        DataCoding::SmscDefault
    }

    fn encode(&self, text: &[u8]) -> Result<Bytes, TextError> {
        let text = as_utf8(text)?;
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            if let Some(septet) = BASIC.iter().position(|&c| c == ch && c != '\u{1B}') {
                out.push(septet as u8);
            } else if let Some(&(septet, _)) = EXTENSION.iter().find(|(_, c)| *c == ch) {
                out.extend_from_slice(&[ESCAPE, septet]);
            } else {
                return Err(TextError::Unrepresentable {
                    ch,
                    coding: DataCoding::SmscDefault,
                });
            }
        }
        Ok(Bytes::from(out))
    }

    fn decode(&self, data: &[u8]) -> Result<Bytes, TextError> {
        let mut out = String::with_capacity(data.len());
        let mut septets = data.iter().copied();
        while let Some(septet) = septets.next() {
            if septet > 0x7F {
                return Err(TextError::InvalidSeptet(septet));
            }
            if septet != ESCAPE {
                out.push(BASIC[usize::from(septet)]);
                continue;
            }
            // A trailing escape carries nothing.
            let Some(next) = septets.next() else { break };
            if next > 0x7F {
                return Err(TextError::InvalidSeptet(next));
            }
            // Unknown extensions fall back to the basic table.
            let ch = EXTENSION
                .iter()
                .find(|(s, _)| *s == next)
                .map(|&(_, c)| c)
                .unwrap_or(BASIC[usize::from(next)]);
            out.push(ch);
        }
        Ok(Bytes::from(out))
    }
}
