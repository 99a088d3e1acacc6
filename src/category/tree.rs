//! Arena helpers over the flat category rows of one directory.

use super::RecordCategory;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Nested view of a category and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub children: Vec<CategoryNode>,
}

/// Sort rows by `order`; the stable sort keeps creation order for ties.
pub fn sort_siblings(rows: &mut [RecordCategory]) {
    rows.sort_by_key(|c| c.order);
}

/// Assemble flat rows into root nodes.
///
/// Rows whose parent is missing from `rows` are treated as roots so a
/// partially loaded directory still renders.
pub fn build_tree(mut rows: Vec<RecordCategory>) -> Vec<CategoryNode> {
    sort_siblings(&mut rows);
    let known: HashSet<&str> = rows.iter().map(|c| c.id.as_str()).collect();

    let mut children: HashMap<&str, Vec<&RecordCategory>> = HashMap::new();
    let mut roots = Vec::new();
    for row in &rows {
        match row.parent_id.as_deref() {
            Some(parent) if known.contains(parent) && parent != row.id => {
                children.entry(parent).or_default().push(row)
            }
            _ => roots.push(row),
        }
    }

    // Every node reachable from a root has an acyclic ancestor chain.
    fn assemble(row: &RecordCategory, children: &HashMap<&str, Vec<&RecordCategory>>) -> CategoryNode {
        let kids = children
            .get(row.id.as_str())
            .map(|kids| kids.iter().map(|k| assemble(k, children)).collect())
            .unwrap_or_default();
        CategoryNode {
            id: row.id.clone(),
            name: row.name.clone(),
            children: kids,
        }
    }

    roots
        .into_iter()
        .map(|root| assemble(root, &children))
        .collect()
}

/// Ids of every descendant of `id`, parents before children.
pub fn descendants(rows: &[RecordCategory], id: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([id]);
    let mut frontier = vec![id];
    while let Some(current) = frontier.pop() {
        for row in rows {
            if row.parent_id.as_deref() == Some(current) && seen.insert(row.id.as_str()) {
                found.push(row.id.clone());
                frontier.push(row.id.as_str());
            }
        }
    }
    found
}

/// True when making `new_parent` the parent of `id` would close a loop.
pub fn would_cycle(rows: &[RecordCategory], id: &str, new_parent: &str) -> bool {
    new_parent == id || descendants(rows, id).iter().any(|d| d == new_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::now;

    fn row(id: &str, parent: Option<&str>, order: i64) -> RecordCategory {
        RecordCategory {
            id: id.into(),
            application_id: "app".into(),
            directory_id: "dir".into(),
            name: id.to_uppercase(),
            path: id.into(),
            level: 1,
            parent_id: parent.map(String::from),
            order,
            enabled: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_build_tree_nests_and_orders() {
        let rows = vec![
            row("b", None, 2),
            row("a", None, 1),
            row("a2", Some("a"), 1),
            row("a1", Some("a"), 0),
            row("a1x", Some("a1"), 0),
            row("orphan", Some("gone"), 5),
        ];
        let tree = build_tree(rows);
        let roots: Vec<&str> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["a", "b", "orphan"]);
        let a_kids: Vec<&str> = tree[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(a_kids, vec!["a1", "a2"]);
        assert_eq!(tree[0].children[0].children[0].name, "A1X");
    }

    #[test]
    fn test_descendants_and_cycles() {
        let rows = vec![
            row("a", None, 0),
            row("b", Some("a"), 0),
            row("c", Some("b"), 0),
            row("d", None, 0),
        ];
        let mut below_a = descendants(&rows, "a");
        below_a.sort();
        assert_eq!(below_a, vec!["b", "c"]);
        assert!(would_cycle(&rows, "a", "c"));
        assert!(would_cycle(&rows, "a", "a"));
        assert!(!would_cycle(&rows, "c", "d"));
    }
}
