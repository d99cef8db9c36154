//! Course hierarchy reconstruction.
//!
//! The search service returns a flat list of course items, each pointing at its
//! parent by id. [`build_tree`] links them into a forest and flattens it back
//! into display order: depth-first, parents before descendants, roots and
//! siblings sorted by ascending id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `parent_id` value marking a root item.
pub const ROOT_PARENT_ID: i64 = 0;

/// A course item as returned by the search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    /// Missing or `null` names decode as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    pub parent_id: i64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A course item placed in display order, annotated with its tree depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub id: i64,
    pub name: String,
    pub depth: usize,
}

/// Builder-owned node: the record it was registered from plus its linked children.
/// Children are positions into the node arena.
#[derive(Debug)]
struct Node<'a> {
    record: &'a Record,
    children: Vec<usize>,
}

/// Reconstruct the hierarchy and return it in display order.
///
/// Items whose `parent_id` is neither [`ROOT_PARENT_ID`] nor the id of another
/// item in `records` are dropped along with everything below them.
///
/// When an id appears more than once, the last item registered under it owns
/// the node (its name is the one displayed and its children slot is the one
/// linked into), while every item carrying that id still places the shared node
/// under its own parent.
pub fn build_tree(records: &[Record]) -> Vec<DisplayRecord> {
    if records.is_empty() {
        return Vec::new();
    }

    // Index pass
    let mut nodes: Vec<Node<'_>> = records
        .iter()
        .map(|record| Node {
            record,
            children: Vec::new(),
        })
        .collect();
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        index.insert(record.id, pos);
    }

    // Link pass
    let mut roots: Vec<usize> = Vec::new();
    for record in records {
        let node = index[&record.id];
        if record.parent_id == ROOT_PARENT_ID {
            roots.push(node);
        } else if let Some(&parent) = index.get(&record.parent_id) {
            nodes[parent].children.push(node);
        }
    }

    // Order pass
    roots.sort_by_key(|&pos| records[pos].id);
    for node in &mut nodes {
        node.children.sort_by_key(|&child| records[child].id);
    }

    // Flatten pass, explicit stack so very deep chains cannot overflow
    let mut display = Vec::with_capacity(records.len());
    let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|&pos| (pos, 0)).collect();
    while let Some((pos, depth)) = stack.pop() {
        let node = &nodes[pos];
        display.push(DisplayRecord {
            id: node.record.id,
            name: node.record.name.clone(),
            depth,
        });
        stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
    }

    display
}
