//! # Dockyard Core
//!
//! `dockyard_core` knows how a read-only v1 registry is laid out on disk and how to turn that
//! layout into the documents the registry API hands back to clients:
//!
//! ```text
//! <root>/repositories/<user>/<name>/tag_<tag>       image id the tag points at
//! <root>/repositories/<user>/<name>/_index_images   served as-is
//! <root>/images/<id>/json                           image descriptor
//! <root>/images/<id>/layer                          layer blob, its length is the image size
//! <root>/images/<id>/ancestry                       served as-is
//! ```
//!
//! Everything here is synchronous and reads straight from the filesystem on every call; there is
//! no caching.

pub mod errors;
pub use errors::{Error, Result};

mod layout;
pub use layout::{ImageJson, Layout, RepositoryName, INDEX_IMAGES, TAG_PREFIX};

pub mod tags;
pub use tags::Tags;
