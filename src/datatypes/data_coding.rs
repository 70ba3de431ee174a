// ABOUTME: Strongly-typed SMPP data_coding values that select the wire text encoding
// ABOUTME: Maps raw octets to named character sets and classifies them by unit width

use std::fmt;

/// The data_coding octet carried next to a short message.
///
/// Each variant names the character set the message octets are written in;
/// [`crate::text`] turns a variant into the codec that converts to and from
/// UTF-8. Values this client does not recognise are kept in
/// [`DataCoding::Custom`] so a PDU round-trips unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataCoding {
    /// SMSC Default Alphabet (GSM 03.38 7-bit)
    #[default]
    SmscDefault,
    /// IA5 (CCITT T.50)/ASCII encoding
    Ascii,
    /// 8-bit binary data, coding 0x02
    Binary,
    /// Latin-1 (ISO-8859-1) character set
    Latin1,
    /// 8-bit binary data, coding 0x04
    OctetUnspecified,
    /// JIS (X 0208-1990) Japanese character set
    Jis,
    /// Cyrillic (ISO-8859-5) character set
    Cyrillic,
    /// Latin/Hebrew (ISO-8859-8) character set
    LatinHebrew,
    /// UCS-2 (ISO/IEC-10646) Unicode encoding
    Ucs2,
    /// Message waiting group "discard message" (0xC0); the text is not transmitted
    Silent,
    /// Custom/reserved data coding value
    Custom(u8),
}

impl DataCoding {
    /// Creates a DataCoding from a raw u8 value
    pub fn from_byte(value: u8) -> Self {
        match value {
            0x00 => DataCoding::SmscDefault,
            0x01 => DataCoding::Ascii,
            0x02 => DataCoding::Binary,
            0x03 => DataCoding::Latin1,
            0x04 => DataCoding::OctetUnspecified,
            0x05 => DataCoding::Jis,
            0x06 => DataCoding::Cyrillic,
            0x07 => DataCoding::LatinHebrew,
            0x08 => DataCoding::Ucs2,
            0xC0 => DataCoding::Silent,
            _ => DataCoding::Custom(value),
        }
    }

    /// Returns the raw u8 value for wire protocol
    pub fn to_byte(&self) -> u8 {
        match self {
            DataCoding::SmscDefault => 0x00,
            DataCoding::Ascii => 0x01,
            DataCoding::Binary => 0x02,
            DataCoding::Latin1 => 0x03,
            DataCoding::OctetUnspecified => 0x04,
            DataCoding::Jis => 0x05,
            DataCoding::Cyrillic => 0x06,
            DataCoding::LatinHebrew => 0x07,
            DataCoding::Ucs2 => 0x08,
            DataCoding::Silent => 0xC0,
            DataCoding::Custom(value) => *value,
        }
    }

    /// Returns true if this encoding uses 7-bit character encoding
    pub fn is_7bit(&self) -> bool {
        matches!(self, DataCoding::SmscDefault | DataCoding::Ascii)
    }

    /// Returns true if this encoding is binary (no text encoding)
    pub fn is_binary(&self) -> bool {
        matches!(self, DataCoding::Binary | DataCoding::OctetUnspecified)
    }

    /// Returns true if this encoding supports Unicode characters
    pub fn is_unicode(&self) -> bool {
        matches!(self, DataCoding::Ucs2)
    }

    /// Returns the character set name for this encoding
    pub fn charset_name(&self) -> &'static str {
        match self {
            DataCoding::SmscDefault => "GSM 7-bit Default",
            DataCoding::Ascii => "ASCII/IA5",
            DataCoding::Binary | DataCoding::OctetUnspecified => "Binary",
            DataCoding::Latin1 => "ISO-8859-1",
            DataCoding::Jis => "JIS X 0208-1990",
            DataCoding::Cyrillic => "ISO-8859-5",
            DataCoding::LatinHebrew => "ISO-8859-8",
            DataCoding::Ucs2 => "UCS-2",
            DataCoding::Silent => "Silent",
            DataCoding::Custom(_) => "Custom/Reserved",
        }
    }

    /// Calculates the maximum message length for this encoding scheme
    /// Returns the number of characters/bytes that fit in a standard SMS
    pub fn max_single_sms_length(&self) -> usize {
        match self {
            DataCoding::SmscDefault | DataCoding::Ascii => 160,
            DataCoding::Ucs2 | DataCoding::Jis => 70,
            DataCoding::Silent => 0,
            _ => 140,
        }
    }
}

impl fmt::Display for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.charset_name())
    }
}

impl fmt::Debug for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataCoding::Custom(value) => write!(f, "DataCoding::Custom(0x{value:02X})"),
            _ => write!(
                f,
                "DataCoding::{} (0x{:02X})",
                self.charset_name().replace([' ', '-', '/'], ""),
                self.to_byte()
            ),
        }
    }
}

impl From<u8> for DataCoding {
    fn from(value: u8) -> Self {
        Self::from_byte(value)
    }
}

impl From<DataCoding> for u8 {
    fn from(data_coding: DataCoding) -> Self {
        data_coding.to_byte()
    }
}
