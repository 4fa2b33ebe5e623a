//! # docbase
//!
//! An in-memory graph-construction and query engine for batches of
//! heterogeneous, loosely-typed JSON documents. Each document carries a
//! declared type tag and a globally unique id; declared cross-document
//! references link the batch into a graph, and declared index paths feed a
//! per-type substring search index.
//!
//! ## Overview
//!
//! - **Type registry**: explicit per-type configuration ([`TypeConfig`])
//!   naming the dotted field paths that feed the search index, the paths that
//!   carry reference tokens, and an optional display-name rule.
//! - **Document store**: identity map keyed by canonical (lowercased) id,
//!   with duplicate detection across the whole store.
//! - **Field extraction** ([`extract`]): a single dotted path such as
//!   `name.given` or `content.context` descends nested objects and fans out
//!   across arrays at any depth.
//! - **Reference resolution**: reference objects carry `"<TypeName>/<id>"`
//!   tokens. Forward references to documents that have not arrived yet are
//!   parked and resolved on arrival, so the final link graph is identical
//!   for any creation order of the same batch.
//! - **Queries**: exact-id [`DocBase::get`], substring-AND
//!   [`DocBase::find`], and transitive [`DocBase::connections`] grouped by
//!   type.
//!
//! Ingestion is a single-threaded, single-pass batch: create every document,
//! then query. [`loader`] reads the snapshot format and drives the batch
//! tolerantly (duplicates are skipped and counted).
//!
//! ## Quick start
//!
//! ```rust
//! use docbase::{DocBase, TypeConfig};
//! use serde_json::json;
//!
//! let mut base = DocBase::with_types([
//!     TypeConfig::new("Patient").with_index(["name.given", "name.family"]),
//!     TypeConfig::new("CareTeam").with_references(["subject"]),
//! ]);
//!
//! // Forward reference: the team arrives before its subject.
//! base.create(json!({
//!     "resourceType": "CareTeam",
//!     "id": "team-1",
//!     "subject": {"reference": "Patient/pat-1"},
//! }))?;
//! base.create(json!({
//!     "resourceType": "Patient",
//!     "id": "pat-1",
//!     "name": [{"given": ["Zoe"], "family": "Aberi"}],
//! }))?;
//!
//! let patient = base.get("Patient", "PAT-1").expect("ids are case-insensitive");
//! assert_eq!(base.find("Patient", "zoe aber").count(), 1);
//!
//! let connections = base.connections(patient.key());
//! assert_eq!(connections["CareTeam"][0].id(), "team-1");
//! # Ok::<(), docbase::DocBaseError>(())
//! ```

pub mod base;
pub mod document;
pub mod error;
pub mod extract;
pub mod index;
pub mod loader;
pub mod registry;

pub use base::DocBase;
pub use document::{DocKey, Document};
pub use error::*;
pub use index::{SearchIndex, SearchTerms};
pub use loader::{ingest, load_snapshot, IngestReport};
pub use registry::{builtin_types, types_from_file, types_from_toml, EntryFilter, NameRule, TypeConfig};
