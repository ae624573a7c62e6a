use std::io::Cursor;

/// Leading bytes of a ZIP local file header (xlsx, xlsm, ods).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// Leading bytes of a compound file (legacy xls or a password protected workbook).
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Container format detected from the first bytes of a payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PayloadKind {
    /// ZIP based workbook
    Zip,
    /// OLE compound file
    CompoundFile,
    /// Anything else, treated as delimited text
    Text,
}

impl PayloadKind {
    pub(crate) fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Zip
        } else if bytes.starts_with(CFB_MAGIC) {
            Self::CompoundFile
        } else {
            Self::Text
        }
    }
}

/// Workbook bytes handed over by the caller, read in place
pub(crate) type WorkbookReader = Cursor<Vec<u8>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_payload_kind() {
        assert_eq!(PayloadKind::sniff(b"PK\x03\x04rest"), PayloadKind::Zip);
        assert_eq!(PayloadKind::sniff(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0]), PayloadKind::CompoundFile);
        assert_eq!(PayloadKind::sniff(b"id,mark\n"), PayloadKind::Text);
        assert_eq!(PayloadKind::sniff(b""), PayloadKind::Text);
    }
}
