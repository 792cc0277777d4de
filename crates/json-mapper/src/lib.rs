//! Identity-preserving JSON node model and cross-document field mapping.
//!
//! A JSON document is normalized into a flat [`NodeModel`] in which every
//! key/value entry carries a stable [`NodeId`] and a path
//! (`root.items[0].x`). The model can be
//!
//! - serialized back to JSON ([`build_value`]),
//! - edited structurally ([`edit`]), keeping ids and migrating metadata
//!   when paths move,
//! - reconciled against freshly parsed text ([`reconcile()`]), keeping ids
//!   wherever the path survived.
//!
//! A [`MappingSession`] owns a source and a target document plus the
//! [`LinkStore`] of leaf-to-leaf links between them, and prunes links
//! whenever a node disappears.
//!
//! ```
//! use json_mapper::{MappingSession, Side};
//! use serde_json::json;
//!
//! let mut session = MappingSession::default();
//! session.load(Side::Source, &json!({"a": 1}));
//! session.load(Side::Target, &json!({"b": 1}));
//!
//! let a = session.model(Side::Source).find_by_path("root.a").unwrap().id.clone();
//! let b = session.model(Side::Target).find_by_path("root.b").unwrap().id.clone();
//! session.link(&a, &b).unwrap();
//!
//! let report = session.reconcile(Side::Source, &json!({}));
//! assert_eq!(report.deleted_ids, vec![a]);
//! assert!(session.links().is_empty());
//! ```

pub mod cli;
pub mod config;
pub mod debounce;
pub mod edit;
pub mod export;
pub mod links;
pub mod metadata;
pub mod node;
pub mod normalize;
pub mod paths;
pub mod reconcile;
pub mod serialize;
pub mod session;
pub mod table;
pub mod tree;

pub use config::{ConfigError, MapperConfig};
pub use debounce::Debouncer;
pub use edit::EditError;
pub use export::{ImportError, ImportReport, MappingEntry, MappingExport};
pub use links::{LinkId, LinkStore, MappingLink, ResolvedLink};
pub use metadata::{FieldMetadata, FieldMetadataStore, MetadataUpdate};
pub use node::{IdMinter, Node, NodeId, NodeModel, NodeType, RootKind};
pub use normalize::{normalize, ReuseIds};
pub use paths::{reparent_paths, PathChange};
pub use reconcile::{reconcile, Reconciliation};
pub use serialize::{build_value, coerce};
pub use session::{Document, LinkError, MappingSession, ReconcileReport, Side};
