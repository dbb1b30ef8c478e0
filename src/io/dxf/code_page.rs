//! `$DWGCODEPAGE` handling
//!
//! Files older than R2007 store text in the code page named by the header
//! variable `$DWGCODEPAGE`. Names are matched case-insensitively against the
//! table below; R2007 and later are always UTF-8.

use crate::types::DxfVersion;
use encoding_rs::Encoding;

/// Code page written when a document has none and text needs one.
pub const DEFAULT_CODE_PAGE: &str = "ANSI_1252";

/// Known code page names and the encoding used for each.
static CODE_PAGES: &[(&str, &Encoding)] = &[
    ("ANSI_1252", &encoding_rs::WINDOWS_1252_INIT),
    ("ANSI_1250", &encoding_rs::WINDOWS_1250_INIT),
    ("ANSI_1251", &encoding_rs::WINDOWS_1251_INIT),
    ("ANSI_1253", &encoding_rs::WINDOWS_1253_INIT),
    ("ANSI_1254", &encoding_rs::WINDOWS_1254_INIT),
    ("ANSI_1255", &encoding_rs::WINDOWS_1255_INIT),
    ("ANSI_1256", &encoding_rs::WINDOWS_1256_INIT),
    ("ANSI_1257", &encoding_rs::WINDOWS_1257_INIT),
    ("ANSI_1258", &encoding_rs::WINDOWS_1258_INIT),
    ("ANSI_874", &encoding_rs::WINDOWS_874_INIT),
    ("ANSI_932", &encoding_rs::SHIFT_JIS_INIT),
    ("ANSI_936", &encoding_rs::GBK_INIT),
    ("ANSI_949", &encoding_rs::EUC_KR_INIT),
    ("ANSI_950", &encoding_rs::BIG5_INIT),
    ("GB2312", &encoding_rs::GBK_INIT),
    ("BIG5", &encoding_rs::BIG5_INIT),
    ("KOREAN", &encoding_rs::EUC_KR_INIT),
    ("JOHAB", &encoding_rs::EUC_KR_INIT),
    ("DOS850", &encoding_rs::WINDOWS_1252_INIT),
    ("DOS852", &encoding_rs::WINDOWS_1250_INIT),
    ("DOS855", &encoding_rs::IBM866_INIT),
    ("DOS857", &encoding_rs::WINDOWS_1254_INIT),
    ("DOS866", &encoding_rs::IBM866_INIT),
    ("DOS869", &encoding_rs::WINDOWS_1253_INIT),
    ("ISO8859-1", &encoding_rs::WINDOWS_1252_INIT),
    ("ISO8859-2", &encoding_rs::ISO_8859_2_INIT),
    ("ISO8859-5", &encoding_rs::ISO_8859_5_INIT),
    ("ISO8859-7", &encoding_rs::ISO_8859_7_INIT),
    ("ISO8859-9", &encoding_rs::WINDOWS_1254_INIT),
    ("ISO8859-15", &encoding_rs::ISO_8859_15_INIT),
    ("KOI8-R", &encoding_rs::KOI8_R_INIT),
];

/// Encoding for a `$DWGCODEPAGE` value.
///
/// `None` for names that mean plain ASCII/UTF-8. Unrecognized names fall back
/// to Windows-1252, the most common code page in practice.
pub fn encoding_from_code_page(code_page: &str) -> Option<&'static Encoding> {
    let name = normalize(code_page);
    if matches!(name.as_str(), "" | "ASCII" | "UTF8" | "UNICODE") {
        return None;
    }
    let found = CODE_PAGES
        .iter()
        .find(|(known, _)| normalize(known) == name)
        .map(|(_, encoding)| *encoding);
    Some(found.unwrap_or(encoding_rs::WINDOWS_1252))
}

/// Upper-case alphanumerics only, so `iso_8859-2` matches `ISO8859-2`.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// `$DWGCODEPAGE` name for an encoding (first table entry that uses it).
pub fn code_page_for_encoding(encoding: &'static Encoding) -> Option<&'static str> {
    CODE_PAGES
        .iter()
        .find(|(_, e)| *e == encoding)
        .map(|(name, _)| *name)
}

/// Encoding to apply to text of a `version` file declaring `code_page`.
pub fn text_encoding(version: DxfVersion, code_page: Option<&str>) -> Option<&'static Encoding> {
    if version.is_unicode() {
        return None;
    }
    code_page.and_then(encoding_from_code_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(encoding_from_code_page("ansi_1251"), Some(encoding_rs::WINDOWS_1251));
        assert_eq!(encoding_from_code_page("ANSI_1251"), Some(encoding_rs::WINDOWS_1251));
        assert_eq!(encoding_from_code_page("iso_8859-2"), Some(encoding_rs::ISO_8859_2));
    }

    #[test]
    fn test_utf8_names_and_fallback() {
        assert_eq!(encoding_from_code_page("ASCII"), None);
        assert_eq!(encoding_from_code_page("utf-8"), None);
        assert_eq!(encoding_from_code_page("SOMETHING"), Some(encoding_rs::WINDOWS_1252));
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(code_page_for_encoding(encoding_rs::SHIFT_JIS), Some("ANSI_932"));
        assert_eq!(code_page_for_encoding(encoding_rs::WINDOWS_1252), Some(DEFAULT_CODE_PAGE));
        assert_eq!(code_page_for_encoding(encoding_rs::UTF_8), None);
    }

    #[test]
    fn test_unicode_versions_ignore_code_page() {
        assert_eq!(text_encoding(DxfVersion::R2007, Some("ANSI_1251")), None);
        assert_eq!(
            text_encoding(DxfVersion::R2000, Some("ANSI_1251")),
            Some(encoding_rs::WINDOWS_1251)
        );
        assert_eq!(text_encoding(DxfVersion::R2000, None), None);
    }
}
