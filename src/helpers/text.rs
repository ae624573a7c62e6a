//! Text decoding for delimited exports coming from spreadsheet tools and LMS downloads.

use encoding_rs::Encoding;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

/// Decodes raw file bytes into text.
///
/// A byte order mark selects the encoding and is stripped. Without one the
/// bytes must be valid UTF-8, otherwise they are read as Windows-1252, which
/// is what older spreadsheet exports on Windows produce.
pub(crate) fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}
