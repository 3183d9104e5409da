//! Command bodies. They only touch the in-memory tree; loading and saving
//! happens around them in the executor.

use hashlink::LinkedHashSet;
use snafu::{OptionExt, ensure};
use tracing::debug;

use crate::commands::report::{BatchOutcome, Listing, ListingEntry, TreeView};
use crate::filesystem::error::{ListNonDirectorySnafu, NodeNotFoundSnafu};
use crate::filesystem::path::{self, ROOT_PATH};
use crate::filesystem::{
    NodeId, Tree, TreeError, missing_ancestors, resolve_for_creation, resolve_for_lookup,
};

pub fn tree_view(tree: &Tree) -> TreeView {
    TreeView {
        pwd: tree.current_path(),
        lines: tree.traverse(),
    }
}

pub fn working_directory(tree: &Tree) -> String {
    tree.current_path()
}

/// Lists the last node `path` resolves to, the working directory by default.
pub fn list(tree: &Tree, path: Option<&str>) -> Result<Listing, TreeError> {
    let target = match path {
        Some(raw) => last_resolved(tree, raw)?,
        None => tree.pwd_id(),
    };
    let node = tree.node(target).context(NodeNotFoundSnafu {
        path: target.to_string(),
    })?;
    ensure!(
        node.is_directory(),
        ListNonDirectorySnafu {
            path: node.full_path(),
        }
    );

    Ok(Listing {
        path: node.full_path(),
        entries: node
            .child_nodes()
            .map(|child| ListingEntry {
                name: child.name().to_string(),
                link: child.link().map(str::to_string),
            })
            .collect(),
    })
}

/// Changes directory, to the root when no path is given, and returns the new one.
pub fn change_directory(tree: &mut Tree, path: Option<&str>) -> Result<String, TreeError> {
    tree.change_directory(path.unwrap_or(ROOT_PATH))?;
    Ok(tree.current_path())
}

/// Creates every folder the paths address, parents first.
///
/// A failed creation abandons the rest of its own path only.
pub fn make_directories(tree: &mut Tree, paths: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for raw in paths {
        let endpoints = match resolve_for_creation(tree, raw) {
            Ok(endpoints) => endpoints,
            Err(error) => {
                outcome.failed(raw.as_str(), error);
                continue;
            }
        };

        let mut pending = LinkedHashSet::new();
        for endpoint in &endpoints {
            for ancestor in missing_ancestors(tree, endpoint) {
                if !pending.contains(&ancestor) {
                    pending.insert(ancestor);
                }
            }
            if tree.lookup(endpoint).is_err() && !pending.contains(endpoint) {
                pending.insert(endpoint.clone());
            }
        }

        let mut pending: Vec<String> = pending.into_iter().collect();
        pending.sort_by_key(|directory| path::depth_of(directory));

        if pending.is_empty() {
            let existing = endpoints.last().map_or(ROOT_PATH, String::as_str);
            outcome.failed(
                raw.as_str(),
                TreeError::NodeExistsError {
                    path: existing.to_string(),
                },
            );
            continue;
        }

        for directory in pending {
            match tree.create(&directory, false, None) {
                Ok(_) => outcome.succeeded(directory),
                Err(error) => {
                    debug!("Stopping mk of '{raw}' at {directory}: {error}");
                    outcome.failed(directory, error);
                    break;
                }
            }
        }
    }

    outcome
}

/// Removes every node the paths resolve to, subtrees included.
pub fn remove(tree: &mut Tree, paths: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for raw in paths {
        let resolved = match resolve_for_lookup(tree, raw) {
            Ok(resolved) => resolved,
            Err(error) => {
                outcome.failed(raw.as_str(), error);
                continue;
            }
        };

        let targets: Vec<(NodeId, String)> = resolved
            .into_iter()
            .filter_map(|id| tree.node(id).map(|node| (id, node.full_path())))
            .collect();

        for (id, full_path) in targets {
            // An earlier target of the same path may already have taken this one with it.
            if !tree.contains(id) {
                outcome.failed(
                    full_path.as_str(),
                    TreeError::NodeNotFoundError {
                        path: full_path.clone(),
                    },
                );
                continue;
            }
            match tree.destroy_node(id) {
                Ok(()) => outcome.succeeded(full_path),
                Err(error) => outcome.failed(full_path, error),
            }
        }
    }

    outcome
}

/// Files every attachment under the target folder, named after the last
/// segment of its reference. Returns the folder path alongside the outcome.
pub fn upload(
    tree: &mut Tree,
    path: Option<&str>,
    attachments: &[String],
) -> Result<(String, BatchOutcome), TreeError> {
    let directory = match path {
        Some(raw) => last_resolved(tree, raw)?,
        None => tree.pwd_id(),
    };
    let directory_path = tree
        .node(directory)
        .map(|node| node.full_path())
        .context(NodeNotFoundSnafu {
            path: directory.to_string(),
        })?;

    let mut outcome = BatchOutcome::default();
    for attachment in attachments {
        let (_, name) = path::split_parent(attachment);
        match tree.insert_child(directory, name, Some(attachment.clone())) {
            Ok(id) => outcome.succeeded(
                tree.node(id)
                    .map_or_else(|| name.to_string(), |node| node.full_path()),
            ),
            Err(error) => outcome.failed(name, error),
        }
    }

    Ok((directory_path, outcome))
}

fn last_resolved(tree: &Tree, raw: &str) -> Result<NodeId, TreeError> {
    resolve_for_lookup(tree, raw)?
        .last()
        .copied()
        .context(NodeNotFoundSnafu {
            path: path::normalize(raw),
        })
}
