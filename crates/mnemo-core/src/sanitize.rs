// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sanitization of free-text identifiers that become path components.
//!
//! Runs before validation and before anything touches the filesystem.

/// Project name used when the caller gives none or it sanitizes to nothing.
pub const DEFAULT_PROJECT: &str = "default";

/// Maximum length of a sanitized path component.
pub const MAX_COMPONENT_LEN: usize = 64;

/// Windows device names that cannot be used as file or directory names.
const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Turns a project name into a single safe directory component.
///
/// Illegal characters and whitespace become `-`, traversal sequences and
/// leading/trailing dots are stripped, reserved device names are prefixed
/// with `_`, and an empty result falls back to [`DEFAULT_PROJECT`].
pub fn sanitize_project(raw: &str) -> String {
    sanitize_component(raw).unwrap_or_else(|| DEFAULT_PROJECT.to_string())
}

/// Sanitizes an entity id for use as a file stem. Empty input maps to `_`.
pub fn sanitize_file_stem(raw: &str) -> String {
    sanitize_component(raw).unwrap_or_else(|| "_".to_string())
}

fn sanitize_component(raw: &str) -> Option<String> {
    let without_traversal = raw.replace("..", "");
    let mut out = String::with_capacity(without_traversal.len());
    let mut last_dash = false;
    for ch in without_traversal.trim().chars() {
        let safe = ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-');
        if safe && !ch.is_control() {
            out.push(ch);
            last_dash = ch == '-';
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '.' || c == '-');
    if trimmed.is_empty() {
        return None;
    }

    let stem = trimmed.split('.').next().unwrap_or_default().to_lowercase();
    let named = if RESERVED_NAMES.contains(&stem.as_str()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    };
    // The cap covers the reserved-name prefix.
    let capped: String = named.chars().take(MAX_COMPONENT_LEN).collect();
    Some(capped.trim_end_matches(['.', '-']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(sanitize_project("mnemo"), "mnemo");
        assert_eq!(sanitize_project("web_app-2"), "web_app-2");
    }

    #[test]
    fn replaces_illegal_characters() {
        assert_eq!(sanitize_project("my project"), "my-project");
        assert_eq!(sanitize_project("a<b>c:d\"e|f?g*h"), "a-b-c-d-e-f-g-h");
        assert_eq!(sanitize_project("tab\there"), "tab-here");
    }

    #[test]
    fn strips_traversal() {
        let s = sanitize_project("../../etc/passwd");
        assert!(!s.contains(".."));
        assert!(!s.contains('/'));
        assert_eq!(s, "etc-passwd");
        assert_eq!(sanitize_project("..\\..\\windows"), "windows");
    }

    #[test]
    fn empty_falls_back_to_default() {
        assert_eq!(sanitize_project(""), DEFAULT_PROJECT);
        assert_eq!(sanitize_project("   "), DEFAULT_PROJECT);
        assert_eq!(sanitize_project("...."), DEFAULT_PROJECT);
        assert_eq!(sanitize_project("///"), DEFAULT_PROJECT);
    }

    #[test]
    fn reserved_device_names_are_escaped() {
        assert_eq!(sanitize_project("CON"), "_CON");
        assert_eq!(sanitize_project("nul.txt"), "_nul.txt");
    }

    #[test]
    fn bounded_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_project(&long).len(), MAX_COMPONENT_LEN);

        let reserved = format!("con.{}", "x".repeat(200));
        let project = sanitize_project(&reserved);
        assert_eq!(project.len(), MAX_COMPONENT_LEN);
        assert!(project.starts_with("_con."));
        assert_eq!(sanitize_project(&project), project);
    }

    #[test]
    fn file_stem_of_uuid_is_unchanged() {
        let id = "3f2b8c1e-0c2a-4c4e-9a55-0d1f7f6b2a10";
        assert_eq!(sanitize_file_stem(id), id);
        assert_eq!(sanitize_file_stem(""), "_");
    }
}
