/// Canonical join key of an identifier cell.
///
/// Surrounding whitespace and the leading `#` that spreadsheets add when
/// coercing numbers to text are removed. Stripping repeats until the key is
/// stable, so normalizing a key twice gives the same key. Matching on the
/// result is exact and case-sensitive.
pub fn normalize(raw: &str) -> String {
    let mut key = raw.trim();
    while let Some(rest) = key.strip_prefix('#') {
        key = rest.trim();
    }
    key.to_owned()
}

/// Like [`normalize`], with an absent cell giving the empty key.
pub fn normalize_cell(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}
