// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use mnemo_core::sanitize::MAX_COMPONENT_LEN;
use mnemo_core::{sanitize_file_stem, sanitize_project};
use proptest::prelude::*;

proptest! {
    #[test]
    fn project_names_are_single_safe_components(raw in any::<String>()) {
        let project = sanitize_project(&raw);
        prop_assert!(!project.is_empty());
        prop_assert!(!project.contains(".."), "{project:?}");
        prop_assert!(!project.contains('/') && !project.contains('\\'), "{project:?}");
        prop_assert!(!project.chars().any(char::is_control), "{project:?}");
        prop_assert!(project.chars().count() <= MAX_COMPONENT_LEN);
    }

    #[test]
    fn traversal_shaped_input_stays_inside(
        parts in prop::collection::vec("(\\.\\.|\\.|/|\\\\|[a-z]{1,4}| )", 0..12),
    ) {
        let raw = parts.concat();
        let project = sanitize_project(&raw);
        prop_assert!(!project.contains(".."), "{raw:?} -> {project:?}");
        prop_assert!(!project.contains('/') && !project.contains('\\'));
        prop_assert_ne!(project.as_str(), ".");
    }

    #[test]
    fn sanitizing_twice_changes_nothing(raw in any::<String>()) {
        let project = sanitize_project(&raw);
        prop_assert_eq!(sanitize_project(&project), project.clone());
        let stem = sanitize_file_stem(&raw);
        prop_assert_eq!(sanitize_file_stem(&stem), stem.clone());
    }
}
