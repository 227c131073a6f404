//! Height-balanced ordered indexes for Rust.
//!
//! This crate provides [`AvlTree`], an ordered set kept balanced by AVL rotations, and
//! [`DualIndex`], which keeps one entity set ordered two ways at once:
//!
//! - [`AvlTree`] - unique elements under a pluggable [`Comparator`](compare::Comparator),
//!   with probe-based lookup and "smallest element not below a key" queries
//! - [`DualIndex`] - an identity index and a rank index that always agree, with an
//!   all-or-nothing [`merge_from`](DualIndex::merge_from)
//! - [`Catalog`] - a song and playlist catalog built from the two
//!
//! # Example
//!
//! ```
//! use avl_index::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for value in [10, 20, 30, 40, 50] {
//!     tree.insert(value);
//! }
//!
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.find_closest(&25), Some(&30));
//! assert_eq!(tree.find_closest(&55), None);
//!
//! tree.remove(&20);
//! assert!(tree.iter().copied().eq([10, 30, 40, 50]));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Fallible allocation** - `try_*` operations leave every structure unchanged on error
//! - **Arena storage** - Nodes live in one contiguous slab and link by compact handles

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod avl_tree;
pub mod catalog;
pub mod compare;
pub mod dual_index;

pub use avl_tree::AvlTree;
pub use catalog::{Catalog, CatalogError, Playlist, PlaylistId, Song, SongId, Status};
pub use dual_index::{DualIndex, Entry, MembershipLedger, MergeSummary};
pub use error::{IndexError, Side, Violation};
