// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed persistence for Mnemo.
//!
//! Memories and tasks are stored one per file beneath a storage root:
//!
//! ```text
//! <root>/memories/<project>/<memory-id>.md
//! <root>/tasks/<project>/<materialized-path>.md
//! <root>/tasks/<project>/root.seq
//! ```
//!
//! Each file carries a TOML header between `+++` fences followed by the body.

pub mod codec;
pub mod layout;
pub mod scan;
pub mod store;
pub mod walk;

pub use codec::Entity;
pub use layout::{id_suffix, task_file_name};
pub use scan::{OrphanReason, ScanEntry, ScanReport};
pub use store::{EntityStore, Listing, read_entity, write_atomic};
pub use walk::{MAX_WALK_DEPTH, WalkedFile, walk_files};
