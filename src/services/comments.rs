// src/services/comments.rs

//! Budgeted depth-first flattening of nested comment trees.

use crate::models::{ListingChild, RawNode};

/// Flatten comment nodes in pre-order, stopping at `max_comments`.
///
/// Only `t1` children are emitted. Other kinds (`more` stubs, links) are
/// skipped together with anything beneath them.
pub fn collect_comments(children: &[ListingChild], max_comments: usize) -> Vec<RawNode> {
    let mut out = Vec::new();
    walk(children, max_comments, &mut out);
    out
}

fn walk(children: &[ListingChild], max_comments: usize, out: &mut Vec<RawNode>) {
    for child in children {
        if out.len() >= max_comments {
            return;
        }
        if !child.is_comment() {
            continue;
        }

        out.push(child.data.clone());

        if let Some(replies) = child.data.replies() {
            walk(&replies.children, max_comments, out);
            if out.len() >= max_comments {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::models::Listing;

    fn children(value: Value) -> Vec<ListingChild> {
        Listing::from_value(&json!({"data": {"children": value}})).children
    }

    fn comment(id: &str, replies: Value) -> Value {
        json!({"kind": "t1", "data": {"id": id, "body": format!("body {id}"), "replies": replies}})
    }

    fn ids(nodes: &[RawNode]) -> Vec<&str> {
        nodes.iter().filter_map(RawNode::id).collect()
    }

    fn nested_tree() -> Vec<ListingChild> {
        // a
        // ├── b
        // │   └── c
        // └── d
        // e
        children(json!([
            comment(
                "a",
                json!({"data": {"children": [
                    comment("b", json!({"data": {"children": [comment("c", json!(""))]}})),
                    comment("d", json!(""))
                ]}})
            ),
            comment("e", json!(""))
        ]))
    }

    #[test]
    fn walks_in_pre_order() {
        let nodes = collect_comments(&nested_tree(), 100);
        assert_eq!(ids(&nodes), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn stops_at_budget_inside_nested_replies() {
        let nodes = collect_comments(&nested_tree(), 3);
        assert_eq!(ids(&nodes), vec!["a", "b", "c"]);

        let nodes = collect_comments(&nested_tree(), 1);
        assert_eq!(ids(&nodes), vec!["a"]);
    }

    #[test]
    fn zero_budget_yields_nothing() {
        assert!(collect_comments(&nested_tree(), 0).is_empty());
    }

    #[test]
    fn skips_non_comment_nodes_and_their_replies() {
        let tree = children(json!([
            {"kind": "more", "data": {"id": "m", "replies": {"data": {"children": [comment("hidden", json!(""))]}}}},
            comment("a", json!(""))
        ]));
        let nodes = collect_comments(&tree, 1);
        assert_eq!(ids(&nodes), vec!["a"]);
    }

    #[test]
    fn malformed_replies_are_leaves() {
        let tree = children(json!([
            comment("a", json!("")),
            comment("b", json!(null)),
            comment("c", json!([1, 2])),
            {"kind": "t1", "data": {"id": "d"}}
        ]));
        let nodes = collect_comments(&tree, 10);
        assert_eq!(ids(&nodes), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn never_exceeds_budget_on_wide_trees() {
        let wide: Vec<Value> = (0..50)
            .map(|i| {
                comment(
                    &format!("p{i}"),
                    json!({"data": {"children": [comment(&format!("r{i}"), json!(""))]}}),
                )
            })
            .collect();
        let tree = children(Value::Array(wide));

        for budget in [1, 7, 42, 100, 150] {
            let nodes = collect_comments(&tree, budget);
            assert_eq!(nodes.len(), budget.min(100));
        }
    }
}
