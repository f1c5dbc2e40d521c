//! File extension safety classification.
//!
//! Advisory deny-list check for extensions that browsers or servers
//! may execute. Classification never blocks an operation; callers
//! decide what to do with a positive verdict.

/// Extensions considered unsafe to serve or accept.
const UNSAFE_EXTENSIONS: &[&str] = &[
    "aspx", "ascx", "ashx", "axd", "master", "bat", "bas", "asp", "app", "bin", "cla", "class",
    "cmd", "com", "sitemap", "skin", "asa", "cshtml", "cpl", "crt", "csc", "dll", "drv", "exe",
    "hta", "htm", "html", "ini", "ins", "js", "jse", "lnk", "mdb", "mde", "mht", "mhtm", "mhtml",
    "msc", "msi", "msp", "ldb", "resources", "resx", "mst", "obj", "config", "ocx", "pgm", "pif",
    "scr", "sct", "shb", "shs", "smm", "sys", "url", "vb", "vbe", "vbs", "vxd", "wsc", "wsf",
    "wsh", "php", "asmx", "cs", "jsl", "asax", "mdf", "cdx", "idc", "shtm", "shtml", "stm",
    "browser",
];

/// The deny-list of unsafe extensions.
#[must_use]
pub fn unsafe_extensions() -> &'static [&'static str] {
    UNSAFE_EXTENSIONS
}

/// Whether a file name carries a potentially unsafe extension.
///
/// The extension is taken after the last dot, reduced to its letters,
/// and lowercased before the deny-list lookup. Total over arbitrary
/// input; names without an extension are safe.
#[must_use]
pub fn is_unsafe_extension(file_name: &str) -> bool {
    let Some((_, raw)) = file_name.rsplit_once('.') else {
        return false;
    };
    let extension: String = raw
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    UNSAFE_EXTENSIONS.contains(&extension.as_str())
}


#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use super::*;

    // Property: classification is total and stable under repetition.
    proptest! {
        #[test]
        fn prop_classifier_is_total(name in ".*") {
            let first = is_unsafe_extension(&name);
            prop_assert_eq!(first, is_unsafe_extension(&name));
        }
    }

    // Property: verdict ignores ASCII case of the extension.
    proptest! {
        #[test]
        fn prop_classifier_case_insensitive(
            stem in "[a-z]{1,8}",
            ext in "[a-zA-Z]{1,6}",
        ) {
            let lower = format!("{stem}.{}", ext.to_lowercase());
            let upper = format!("{stem}.{}", ext.to_uppercase());
            prop_assert_eq!(is_unsafe_extension(&lower), is_unsafe_extension(&upper));
        }
    }

    // Property: names without a dot are always safe.
    proptest! {
        #[test]
        fn prop_no_extension_is_safe(name in "[a-zA-Z0-9_-]*") {
            prop_assert!(!is_unsafe_extension(&name));
        }
    }
}
