//! Codepage decoding for BIFF byte strings
//!
//! BIFF5 and older store text as single- or multi-byte strings in the
//! codepage named by the workbook's CODEPAGE record; BIFF8 stores all text
//! as (possibly compressed) UTF-16LE. This module maps the BIFF codepage
//! identifiers onto decoders and converts both flavours to UTF-8.
//!
//! Decoding is strict: a byte sequence the codepage cannot represent is an
//! [`Error::InvalidCharacter`], not a replacement character.

use encoding_rs::Encoding;
use phf::phf_map;

use super::oem_tables;
use crate::common::{Error, Result};

/// Codepages a workbook may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codepage {
    Ascii,
    Cp437,
    Cp720,
    Cp737,
    Cp775,
    Cp850,
    Cp852,
    Cp855,
    Cp857,
    Cp858,
    Cp860,
    Cp861,
    Cp862,
    Cp863,
    Cp864,
    Cp865,
    Cp866,
    Cp869,
    Cp874,
    Cp932,
    Cp936,
    Cp949,
    Cp950,
    Utf16Le,
    Cp1250,
    Cp1251,
    Cp1252,
    Cp1253,
    Cp1254,
    Cp1255,
    Cp1256,
    Cp1257,
    Cp1258,
    Cp1361,
    MacRoman,
}

/// BIFF CODEPAGE record value to codepage.
static BIFF_CODEPAGES: phf::Map<u16, Codepage> = phf_map! {
    0x016F_u16 => Codepage::Ascii,
    0x01B5_u16 => Codepage::Cp437,
    0x02D0_u16 => Codepage::Cp720,
    0x02E1_u16 => Codepage::Cp737,
    0x0307_u16 => Codepage::Cp775,
    0x0352_u16 => Codepage::Cp850,
    0x0354_u16 => Codepage::Cp852,
    0x0357_u16 => Codepage::Cp855,
    0x0359_u16 => Codepage::Cp857,
    0x035A_u16 => Codepage::Cp858,
    0x035C_u16 => Codepage::Cp860,
    0x035D_u16 => Codepage::Cp861,
    0x035E_u16 => Codepage::Cp862,
    0x035F_u16 => Codepage::Cp863,
    0x0360_u16 => Codepage::Cp864,
    0x0361_u16 => Codepage::Cp865,
    0x0362_u16 => Codepage::Cp866,
    0x0365_u16 => Codepage::Cp869,
    0x036A_u16 => Codepage::Cp874,
    0x03A4_u16 => Codepage::Cp932,
    0x03A8_u16 => Codepage::Cp936,
    0x03B5_u16 => Codepage::Cp949,
    0x03B6_u16 => Codepage::Cp950,
    0x04B0_u16 => Codepage::Utf16Le,
    0x04E2_u16 => Codepage::Cp1250,
    0x04E3_u16 => Codepage::Cp1251,
    0x04E4_u16 => Codepage::Cp1252,
    0x04E5_u16 => Codepage::Cp1253,
    0x04E6_u16 => Codepage::Cp1254,
    0x04E7_u16 => Codepage::Cp1255,
    0x04E8_u16 => Codepage::Cp1256,
    0x04E9_u16 => Codepage::Cp1257,
    0x04EA_u16 => Codepage::Cp1258,
    0x0551_u16 => Codepage::Cp1361,
    0x2710_u16 => Codepage::MacRoman,
    0x8000_u16 => Codepage::MacRoman,
    0x8001_u16 => Codepage::Cp1252,
};

/// How a codepage's bytes become characters.
enum Scheme {
    /// Seven-bit only
    Ascii,
    /// Backed by `encoding_rs`
    Encoding(&'static Encoding),
    /// ASCII low half plus a fixed high-half table
    Table(&'static [char; 128]),
    /// No converter is available: ASCII passes, everything else is replaced
    Lossy,
}

impl Codepage {
    /// Look up the codepage named by a BIFF CODEPAGE record.
    #[inline]
    pub fn from_biff(code: u16) -> Option<Self> {
        BIFF_CODEPAGES.get(&code).copied()
    }

    /// Conventional charset name.
    pub fn name(self) -> &'static str {
        match self {
            Codepage::Ascii => "ASCII",
            Codepage::Cp437 => "CP437",
            Codepage::Cp720 => "CP720",
            Codepage::Cp737 => "CP737",
            Codepage::Cp775 => "CP775",
            Codepage::Cp850 => "CP850",
            Codepage::Cp852 => "CP852",
            Codepage::Cp855 => "CP855",
            Codepage::Cp857 => "CP857",
            Codepage::Cp858 => "CP858",
            Codepage::Cp860 => "CP860",
            Codepage::Cp861 => "CP861",
            Codepage::Cp862 => "CP862",
            Codepage::Cp863 => "CP863",
            Codepage::Cp864 => "CP864",
            Codepage::Cp865 => "CP865",
            Codepage::Cp866 => "CP866",
            Codepage::Cp869 => "CP869",
            Codepage::Cp874 => "CP874",
            Codepage::Cp932 => "CP932",
            Codepage::Cp936 => "CP936",
            Codepage::Cp949 => "CP949",
            Codepage::Cp950 => "CP950",
            Codepage::Utf16Le => "UTF-16LE",
            Codepage::Cp1250 => "CP1250",
            Codepage::Cp1251 => "CP1251",
            Codepage::Cp1252 => "CP1252",
            Codepage::Cp1253 => "CP1253",
            Codepage::Cp1254 => "CP1254",
            Codepage::Cp1255 => "CP1255",
            Codepage::Cp1256 => "CP1256",
            Codepage::Cp1257 => "CP1257",
            Codepage::Cp1258 => "CP1258",
            Codepage::Cp1361 => "CP1361",
            Codepage::MacRoman => "MacRoman",
        }
    }

    fn scheme(self) -> Scheme {
        match self {
            Codepage::Ascii => Scheme::Ascii,
            Codepage::Cp437 => Scheme::Table(&oem_tables::CP437),
            Codepage::Cp720 => Scheme::Table(&oem_tables::CP720),
            Codepage::Cp737 => Scheme::Table(&oem_tables::CP737),
            Codepage::Cp775 => Scheme::Table(&oem_tables::CP775),
            Codepage::Cp850 => Scheme::Table(&oem_tables::CP850),
            Codepage::Cp852 => Scheme::Table(&oem_tables::CP852),
            Codepage::Cp855 => Scheme::Table(&oem_tables::CP855),
            Codepage::Cp857 => Scheme::Table(&oem_tables::CP857),
            Codepage::Cp858 => Scheme::Table(&oem_tables::CP858),
            Codepage::Cp860 => Scheme::Table(&oem_tables::CP860),
            Codepage::Cp861 => Scheme::Table(&oem_tables::CP861),
            Codepage::Cp862 => Scheme::Table(&oem_tables::CP862),
            Codepage::Cp863 => Scheme::Table(&oem_tables::CP863),
            Codepage::Cp864 => Scheme::Table(&oem_tables::CP864),
            Codepage::Cp865 => Scheme::Table(&oem_tables::CP865),
            Codepage::Cp869 => Scheme::Table(&oem_tables::CP869),
            Codepage::Cp866 => Scheme::Encoding(encoding_rs::IBM866),
            Codepage::Cp874 => Scheme::Encoding(encoding_rs::WINDOWS_874),
            Codepage::Cp932 => Scheme::Encoding(encoding_rs::SHIFT_JIS),
            Codepage::Cp936 => Scheme::Encoding(encoding_rs::GBK),
            Codepage::Cp949 => Scheme::Encoding(encoding_rs::EUC_KR),
            Codepage::Cp950 => Scheme::Encoding(encoding_rs::BIG5),
            Codepage::Utf16Le => Scheme::Encoding(encoding_rs::UTF_16LE),
            Codepage::Cp1250 => Scheme::Encoding(encoding_rs::WINDOWS_1250),
            Codepage::Cp1251 => Scheme::Encoding(encoding_rs::WINDOWS_1251),
            Codepage::Cp1252 => Scheme::Encoding(encoding_rs::WINDOWS_1252),
            Codepage::Cp1253 => Scheme::Encoding(encoding_rs::WINDOWS_1253),
            Codepage::Cp1254 => Scheme::Encoding(encoding_rs::WINDOWS_1254),
            Codepage::Cp1255 => Scheme::Encoding(encoding_rs::WINDOWS_1255),
            Codepage::Cp1256 => Scheme::Encoding(encoding_rs::WINDOWS_1256),
            Codepage::Cp1257 => Scheme::Encoding(encoding_rs::WINDOWS_1257),
            Codepage::Cp1258 => Scheme::Encoding(encoding_rs::WINDOWS_1258),
            Codepage::MacRoman => Scheme::Encoding(encoding_rs::MACINTOSH),
            Codepage::Cp1361 => Scheme::Lossy,
        }
    }
}

/// Converter for the byte strings of one workbook.
#[derive(Debug, Clone, Copy)]
pub struct TextDecoder {
    codepage: Codepage,
}

impl TextDecoder {
    /// Select the converter for a BIFF CODEPAGE value.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedCharset`] when the value is not a known codepage.
    pub fn for_biff_codepage(code: u16) -> Result<Self> {
        Codepage::from_biff(code)
            .map(|codepage| TextDecoder { codepage })
            .ok_or(Error::UnsupportedCharset(code))
    }

    pub fn codepage(&self) -> Codepage {
        self.codepage
    }

    /// Decode a byte string to UTF-8.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self.codepage.scheme() {
            Scheme::Ascii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| b as char).collect())
                } else {
                    Err(Error::InvalidCharacter)
                }
            },
            Scheme::Encoding(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned())
                .ok_or(Error::InvalidCharacter),
            Scheme::Table(high) => Ok(bytes
                .iter()
                .map(|&b| {
                    if b < 0x80 {
                        b as char
                    } else {
                        high[(b - 0x80) as usize]
                    }
                })
                .collect()),
            Scheme::Lossy => {
                if !bytes.is_ascii() {
                    log::warn!(
                        "no converter for {}, replacing non-ASCII bytes",
                        self.codepage.name()
                    );
                }
                Ok(bytes
                    .iter()
                    .map(|&b| if b < 0x80 { b as char } else { char::REPLACEMENT_CHARACTER })
                    .collect())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biff_codepage_lookup() {
        assert_eq!(Codepage::from_biff(0x04E4), Some(Codepage::Cp1252));
        assert_eq!(Codepage::from_biff(0x8001), Some(Codepage::Cp1252));
        assert_eq!(Codepage::from_biff(0x8000), Some(Codepage::MacRoman));
        assert_eq!(Codepage::from_biff(0x2710), Some(Codepage::MacRoman));
        assert_eq!(Codepage::from_biff(0x04B0), Some(Codepage::Utf16Le));
        assert_eq!(Codepage::from_biff(0x1234), None);
    }

    #[test]
    fn test_unknown_codepage_is_unsupported() {
        assert!(matches!(
            TextDecoder::for_biff_codepage(0x1234),
            Err(Error::UnsupportedCharset(0x1234))
        ));
    }

    #[test]
    fn test_decode_windows_1252() {
        let decoder = TextDecoder::for_biff_codepage(0x04E4).unwrap();
        assert_eq!(decoder.decode(b"Caf\xE9").unwrap(), "Café");
        assert_eq!(decoder.decode(b"\x80").unwrap(), "€");
    }

    #[test]
    fn test_decode_ascii_is_strict() {
        let decoder = TextDecoder::for_biff_codepage(0x016F).unwrap();
        assert_eq!(decoder.decode(b"Sheet1").unwrap(), "Sheet1");
        assert!(matches!(decoder.decode(b"\xE9"), Err(Error::InvalidCharacter)));
    }

    #[test]
    fn test_decode_oem_tables() {
        let cp437 = TextDecoder::for_biff_codepage(0x01B5).unwrap();
        assert_eq!(cp437.decode(b"\x80\xE1").unwrap(), "Çß");
        let cp850 = TextDecoder::for_biff_codepage(0x0352).unwrap();
        let cp858 = TextDecoder::for_biff_codepage(0x035A).unwrap();
        assert_eq!(cp850.decode(b"\xD5").unwrap(), "ı");
        assert_eq!(cp858.decode(b"\xD5").unwrap(), "€");
    }

    #[test]
    fn test_decode_mac_roman() {
        let decoder = TextDecoder::for_biff_codepage(0x8000).unwrap();
        assert_eq!(decoder.decode(b"\x8A").unwrap(), "ä");
    }

    #[test]
    fn test_decode_lossy_codepage() {
        let decoder = TextDecoder::for_biff_codepage(0x0551).unwrap();
        assert_eq!(decoder.decode(b"ab\x88").unwrap(), "ab\u{FFFD}");
    }
}
