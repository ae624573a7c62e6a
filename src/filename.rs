//! Export file names of the form `<base>_updated_<YYYY-MM-DD>.<ext>`.
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[^/.\\\s]+$").expect("Hardcode regex pattern"));

/// Used when neither a custom nor a detected base name is usable
pub const DEFAULT_BASE_NAME: &str = "marks";

/// Removes the final extension and any directory part from a file name.
pub fn strip_extension(name: &str) -> &str {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match EXTENSION.find(file_name) {
        Some(found) => &file_name[..found.start()],
        None => file_name,
    }
}

fn usable_base(name: Option<&str>) -> Option<&str> {
    name.map(|name| strip_extension(name.trim()).trim()).filter(|base| !base.is_empty())
}

/// Composes an export file name.
///
/// The custom base wins when it is not blank, then the detected name of the
/// destination file, then `fallback`, then [`DEFAULT_BASE_NAME`]. A trailing
/// extension on either name is dropped before the suffix is added.
pub fn compose(custom: Option<&str>, detected: Option<&str>, date: NaiveDate, extension: &str, fallback: &str) -> String {
    let base = usable_base(custom)
        .or_else(|| usable_base(detected))
        .or_else(|| usable_base(Some(fallback)))
        .unwrap_or(DEFAULT_BASE_NAME);
    let extension = extension.trim_start_matches('.');
    format!("{}_updated_{}.{}", base, date.format("%Y-%m-%d"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn strips_extensions() {
        assert_eq!(strip_extension("Roll PROG6221.xlsx"), "Roll PROG6221");
        assert_eq!(strip_extension("marks.final.csv"), "marks.final");
        assert_eq!(strip_extension("C:\\exports\\roll.csv"), "roll");
        assert_eq!(strip_extension("uploads/roll"), "roll");
        assert_eq!(strip_extension(".csv"), "");
        assert_eq!(strip_extension("PROG6221 v1.2 final"), "PROG6221 v1.2 final");
        assert_eq!(strip_extension("PROG6221 v1.2 final.csv"), "PROG6221 v1.2 final");
    }

    #[test]
    fn custom_name_wins() {
        assert_eq!(
            compose(Some(" term2.csv "), Some("roll.xlsx"), date(), "csv", "marks"),
            "term2_updated_2024-03-09.csv"
        );
    }

    #[test]
    fn dotted_names_keep_their_text() {
        assert_eq!(
            compose(Some("PROG6221 v1.2 final"), None, date(), "csv", "marks"),
            "PROG6221 v1.2 final_updated_2024-03-09.csv"
        );
    }

    #[test]
    fn detected_name_when_custom_is_blank() {
        assert_eq!(
            compose(Some("   "), Some("roll.xlsx"), date(), ".xlsx", "marks"),
            "roll_updated_2024-03-09.xlsx"
        );
        assert_eq!(compose(None, Some("roll.xlsx"), date(), "csv", "marks"), "roll_updated_2024-03-09.csv");
    }

    #[test]
    fn base_is_never_empty() {
        assert_eq!(compose(None, None, date(), "csv", "results"), "results_updated_2024-03-09.csv");
        assert_eq!(compose(Some(".csv"), Some(""), date(), "csv", " "), "marks_updated_2024-03-09.csv");
    }
}
