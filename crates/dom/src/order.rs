//! Document-order comparison for [`DomNode`]s.

use crate::node::DomNode;
use std::cmp::Ordering;

/// Compares two nodes in document order using their ancestor chains.
///
/// An ancestor precedes its descendants. Nodes that do not share a root (one of
/// them was detached) are not comparable.
pub fn compare_by_ancestry<N: DomNode>(a: &N, b: &N) -> Option<Ordering> {
    if a == b {
        return Some(Ordering::Equal);
    }

    let mut chain_a = a.ancestry();
    let mut chain_b = b.ancestry();
    chain_a.reverse();
    chain_b.reverse();

    if chain_a.first() != chain_b.first() {
        return None;
    }

    let shared = chain_a
        .iter()
        .zip(chain_b.iter())
        .take_while(|(x, y)| x == y)
        .count();

    // One chain is a prefix of the other: the shorter one is the ancestor.
    if shared == chain_a.len() {
        return Some(Ordering::Less);
    }
    if shared == chain_b.len() {
        return Some(Ordering::Greater);
    }

    let parent = &chain_a[shared - 1];
    let branch_a = &chain_a[shared];
    let branch_b = &chain_b[shared];
    for child in parent.children() {
        if &child == branch_a {
            return Some(Ordering::Less);
        }
        if &child == branch_b {
            return Some(Ordering::Greater);
        }
    }
    None
}

/// Stable sort of `items` by the document position of the node each one refers to.
///
/// Pairs that compare equal or are not comparable keep their relative insertion
/// order. The comparison is pairwise and tolerates a partial order, which is why
/// this is an insertion sort rather than `slice::sort_by`: input produced by the
/// outline builder is already close to document order.
pub fn sort_in_document_order<T, N, F>(items: &mut [T], node_of: F)
where
    N: DomNode,
    F: Fn(&T) -> &N,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 {
            let ordering = node_of(&items[j - 1]).compare_position(node_of(&items[j]));
            if ordering == Some(Ordering::Greater) {
                items.swap(j - 1, j);
                j -= 1;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;
    use crate::node::DomDocument;
    use crate::selector::parse_selector;

    fn fixture() -> MemoryDom {
        MemoryDom::parse(
            "<html><body><div id='a'><p id='b'>one</p><p id='c'>two</p></div><div id='d'/></body></html>",
        )
        .unwrap()
    }

    fn by_id(dom: &MemoryDom, id: &str) -> crate::memory::MemNode {
        let selector = parse_selector(&format!("[id={}]", id)).unwrap();
        dom.select_first(&selector).unwrap()
    }

    #[test]
    fn ancestor_precedes_descendant() {
        let dom = fixture();
        let a = by_id(&dom, "a");
        let b = by_id(&dom, "b");
        assert_eq!(compare_by_ancestry(&a, &b), Some(Ordering::Less));
        assert_eq!(compare_by_ancestry(&b, &a), Some(Ordering::Greater));
    }

    #[test]
    fn siblings_and_cousins() {
        let dom = fixture();
        let b = by_id(&dom, "b");
        let c = by_id(&dom, "c");
        let d = by_id(&dom, "d");
        assert_eq!(compare_by_ancestry(&b, &c), Some(Ordering::Less));
        assert_eq!(compare_by_ancestry(&d, &b), Some(Ordering::Greater));
        assert_eq!(compare_by_ancestry(&c, &c), Some(Ordering::Equal));
    }

    #[test]
    fn detached_nodes_are_not_comparable() {
        let dom = fixture();
        let b = by_id(&dom, "b");
        let c = by_id(&dom, "c");
        c.remove();
        assert_eq!(compare_by_ancestry(&b, &c), None);
    }

    #[test]
    fn sort_restores_document_order_and_keeps_ties() {
        let dom = fixture();
        let b = by_id(&dom, "b");
        let c = by_id(&dom, "c");
        let d = by_id(&dom, "d");
        let mut items = vec![(d.clone(), 1), (b.clone(), 2), (c.clone(), 3), (b.clone(), 4)];
        sort_in_document_order(&mut items, |(node, _)| node);
        let order: Vec<i32> = items.iter().map(|(_, tag)| *tag).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
    }
}
