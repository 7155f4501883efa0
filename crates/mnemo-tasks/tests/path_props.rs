// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use mnemo_core::TaskLevel;
use mnemo_tasks::{PathLimits, generate_path, generate_slug, parse_path, validate_path};
use proptest::prelude::*;

proptest! {
    #[test]
    fn generated_paths_parse_back(
        titles in prop::collection::vec("[A-Za-z0-9 _.-]{0,40}", 1..=4),
        orders in prop::collection::vec(1u32..2000, 4),
    ) {
        let mut path: Option<String> = None;
        let mut expected = Vec::new();
        for (i, title) in titles.iter().enumerate() {
            let id = format!("{i:08x}-id");
            let slug = generate_slug(title, &id);
            let next = generate_path(path.as_deref(), orders[i], &slug);
            expected.push((orders[i], slug));
            path = Some(next);
        }
        let path = path.unwrap();

        prop_assert!(validate_path(&path, &PathLimits::default()).valid);
        let segments = parse_path(&path).unwrap();
        prop_assert_eq!(segments.len(), expected.len());
        for (depth, (segment, (order, slug))) in segments.iter().zip(&expected).enumerate() {
            prop_assert_eq!(segment.level, TaskLevel::from_depth(depth + 1).unwrap());
            prop_assert_eq!(segment.order, *order);
            prop_assert_eq!(&segment.slug, slug);
        }
    }
}
