//! Virtual folder tree of a single tenant.
//!
//! Nodes are either directories or files; a file only carries an opaque link
//! to its content. Paths typed by users go through the [`resolver`] before they
//! reach the [`Tree`].

pub(crate) mod error;
mod node;
pub mod path;
mod resolver;
mod traversal;
mod tree;

pub use error::TreeError;
pub use node::{NodeId, NodeRef, TreeNode};
pub use resolver::{PathExpression, missing_ancestors, resolve_for_creation, resolve_for_lookup};
pub use traversal::LineDescriptor;
pub use tree::Tree;
