//! Turns user-typed path expressions into tree nodes or creation targets.
//!
//! An expression may be relative to the working directory, contain runs of
//! `..` anywhere and end in a `*` wildcard. Every intermediate directory the
//! expression passes through before climbing back up is an *endpoint*, so
//! `a/b/../c` addresses both `/a/b` and `/a/c`.

use std::hash::Hash;

use hashlink::LinkedHashSet;
use snafu::ensure;

use crate::filesystem::error::{CdPastRootSnafu, InvalidPathSnafu, TreeError};
use crate::filesystem::node::NodeId;
use crate::filesystem::path::{self, CURRENT_DIR, PARENT_DIR, SEPARATOR, WILDCARD};
use crate::filesystem::tree::Tree;

const WILDCARD_REASON: &str = "Cannot use * as a directory name";

/// A literal run of names followed by how many `..` come right after it.
#[derive(Debug, Default, PartialEq, Eq)]
struct Step<'a> {
    names: Vec<&'a str>,
    climb: usize,
}

/// Keeps the position of the first occurrence, unlike a plain `insert`.
fn insert_once<T: Hash + Eq>(set: &mut LinkedHashSet<T>, value: T) {
    if !set.contains(&value) {
        set.insert(value);
    }
}

fn steps(absolute: &str) -> Vec<Step<'_>> {
    let mut steps = Vec::new();
    let mut current = Step::default();

    for segment in path::segments(absolute).filter(|segment| *segment != CURRENT_DIR) {
        if segment == PARENT_DIR {
            current.climb += 1;
        } else {
            if current.climb > 0 {
                steps.push(std::mem::take(&mut current));
            }
            current.names.push(segment);
        }
    }

    steps.push(current);
    steps
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    absolute: String,
    relative: bool,
    endpoints: Vec<String>,
}

impl PathExpression {
    /// Anchors `raw` at the working directory when it is relative and expands
    /// it into its endpoints, first occurrence first.
    pub fn parse(tree: &Tree, raw: &str) -> Result<Self, TreeError> {
        let normalized = path::normalize(raw);
        let relative = !path::is_absolute(&normalized);
        let absolute = if relative {
            path::normalize(&format!("{}{SEPARATOR}{normalized}", tree.current_path()))
        } else {
            normalized
        };

        let mut endpoints = LinkedHashSet::new();
        let mut working: Vec<&str> = Vec::new();
        let mut last_climb = 0;
        for step in steps(&absolute) {
            working.extend(step.names);
            insert_once(&mut endpoints, path::join(&working));
            ensure!(step.climb <= working.len(), CdPastRootSnafu);
            working.truncate(working.len() - step.climb);
            last_climb = step.climb;
        }
        if last_climb > 0 {
            insert_once(&mut endpoints, path::join(&working));
        }

        Ok(PathExpression {
            absolute,
            relative,
            endpoints: endpoints.into_iter().collect(),
        })
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn absolute(&self) -> &str {
        &self.absolute
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Endpoints as absolute paths to be created. Wildcards are never valid here.
    pub fn creation_paths(&self) -> Result<Vec<String>, TreeError> {
        ensure!(
            !self.absolute.contains(WILDCARD),
            InvalidPathSnafu {
                path: self.absolute.as_str(),
                reason: WILDCARD_REASON,
            }
        );
        Ok(self.endpoints.clone())
    }

    /// Resolves every endpoint to existing nodes.
    ///
    /// A trailing `*` expands to the children of its parent. For relative
    /// input resolving to more than one node the first node is the working
    /// directory anchor and is left out.
    pub fn lookup(&self, tree: &Tree) -> Result<Vec<NodeId>, TreeError> {
        let segments: Vec<&str> = path::segments(&self.absolute).collect();
        let misplaced = segments.iter().enumerate().any(|(i, segment)| {
            segment.contains(WILDCARD) && (i + 1 != segments.len() || *segment != WILDCARD)
        });
        ensure!(
            !misplaced,
            InvalidPathSnafu {
                path: self.absolute.as_str(),
                reason: WILDCARD_REASON,
            }
        );

        let mut groups = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            groups.push(Self::lookup_endpoint(tree, endpoint)?);
        }

        let mut resolved = LinkedHashSet::new();
        for id in groups.into_iter().flatten() {
            insert_once(&mut resolved, id);
        }

        let mut resolved: Vec<NodeId> = resolved.into_iter().collect();
        if self.relative && resolved.len() > 1 {
            resolved.remove(0);
        }
        Ok(resolved)
    }

    fn lookup_endpoint(tree: &Tree, endpoint: &str) -> Result<Vec<NodeId>, TreeError> {
        let (parent, name) = path::split_parent(endpoint);
        if name == WILDCARD {
            let parent = tree.lookup(parent)?;
            Ok(tree
                .get(parent)
                .map(|node| node.children().to_vec())
                .unwrap_or_default())
        } else {
            Ok(vec![tree.lookup(endpoint)?])
        }
    }
}

/// Existing nodes addressed by `raw`, in endpoint order.
pub fn resolve_for_lookup(tree: &Tree, raw: &str) -> Result<Vec<NodeId>, TreeError> {
    PathExpression::parse(tree, raw)?.lookup(tree)
}

/// Absolute paths addressed by `raw`, whether or not they exist yet.
pub fn resolve_for_creation(tree: &Tree, raw: &str) -> Result<Vec<String>, TreeError> {
    PathExpression::parse(tree, raw)?.creation_paths()
}

/// Ancestors of `target` that do not exist yet, shallowest first.
///
/// Neither the root nor `target` itself is ever part of the result.
pub fn missing_ancestors(tree: &Tree, target: &str) -> Vec<String> {
    let normalized = path::normalize(target);
    let segments: Vec<&str> = path::segments(&normalized).collect();

    (1..segments.len())
        .map(|depth| path::join(&segments[..depth]))
        .filter(|ancestor| tree.lookup(ancestor).is_err())
        .collect()
}
