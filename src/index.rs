//! Augmented balanced interval tree for overlap and point queries.
//!
//! The index is built once from a finite, immutable element set and is
//! thereafter read-only; there is no insert or delete API. Construction is
//! O(N log N), queries O(log N + k).

use crate::types::interval::{Interval, Spanned};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct Node<T> {
    key: Interval,
    /// Maximum `high` over this node's key and both subtrees. Lets queries
    /// skip left subtrees that end before the window begins.
    max_high: u32,
    /// Elements whose interval equals `key`, unique by full equality.
    elements: Vec<T>,
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(key: Interval) -> Self {
        Self {
            key,
            max_high: 0,
            elements: Vec::new(),
            left: None,
            right: None,
        }
    }
}

/// A query-only index over elements that expose an [`Interval`].
///
/// Elements with duplicate intervals are allowed as long as their associated
/// data differs; exact duplicates collapse to one. An empty input yields an
/// empty, queryable index.
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    root: Option<Box<Node<T>>>,
    node_count: usize,
    element_count: usize,
}

impl<T: Spanned + PartialEq> IntervalIndex<T> {
    /// Builds the index in two phases: a balanced skeleton from the sorted
    /// distinct intervals (midpoint recursion, so depth stays O(log N) no
    /// matter how many elements share an interval), then a population pass
    /// that descends to each element's equal-key node and refreshes
    /// `max_high` along the way.
    pub fn build(elements: Vec<T>) -> Self {
        let mut unique: HashSet<Interval> = HashSet::new();
        for elem in &elements {
            unique.insert(elem.interval());
        }
        let mut keys: Vec<Interval> = unique.into_iter().collect();
        keys.sort();

        let node_count = keys.len();
        let mut index = Self {
            root: Self::scaffold(&keys),
            node_count,
            element_count: 0,
        };

        for elem in elements {
            if index.place(elem) {
                index.element_count += 1;
            }
        }

        debug_assert!(index.max_invariant_holds());
        index
    }

    fn scaffold(keys: &[Interval]) -> Option<Box<Node<T>>> {
        if keys.is_empty() {
            return None;
        }
        let mid = (keys.len() - 1) / 2;
        let mut node = Box::new(Node::new(keys[mid]));
        node.left = Self::scaffold(&keys[..mid]);
        node.right = Self::scaffold(&keys[mid + 1..]);
        Some(node)
    }

    /// Descends to the node whose key equals the element's interval,
    /// updating every visited node's `max_high`. Returns false when an
    /// equal element is already present (exact duplicates collapse).
    fn place(&mut self, elem: T) -> bool {
        let target = elem.interval();
        let mut node = match self.root.as_mut() {
            Some(root) => root,
            None => return false,
        };

        loop {
            if node.max_high < target.high() {
                node.max_high = target.high();
            }
            match target.cmp(&node.key) {
                Ordering::Less => match node.left.as_mut() {
                    Some(left) => node = left,
                    // Unreachable: the scaffold holds every distinct interval.
                    None => return false,
                },
                Ordering::Greater => match node.right.as_mut() {
                    Some(right) => node = right,
                    None => return false,
                },
                Ordering::Equal => {
                    if node.elements.contains(&elem) {
                        return false;
                    }
                    node.elements.push(elem);
                    return true;
                }
            }
        }
    }
}

impl<T> IntervalIndex<T> {
    /// All elements whose interval overlaps `window`.
    ///
    /// Left subtrees ending before the window begins are pruned via
    /// `max_high`; right subtrees are always visited when present.
    pub fn query(&self, window: Interval) -> Vec<&T> {
        let mut matches = Vec::new();
        if let Some(root) = &self.root {
            Self::query_node(root, window, &mut matches);
        }
        matches
    }

    fn query_node<'a>(node: &'a Node<T>, window: Interval, matches: &mut Vec<&'a T>) {
        if window.overlaps(&node.key) {
            matches.extend(node.elements.iter());
        }
        if let Some(left) = &node.left
            && window.low() <= left.max_high
        {
            Self::query_node(left, window, matches);
        }
        if let Some(right) = &node.right {
            Self::query_node(right, window, matches);
        }
    }

    /// All elements whose interval contains the single tick `point`.
    pub fn query_point(&self, point: u32) -> Vec<&T> {
        let mut matches = Vec::new();
        if let Some(root) = &self.root {
            Self::query_point_node(root, point, &mut matches);
        }
        matches
    }

    fn query_point_node<'a>(node: &'a Node<T>, point: u32, matches: &mut Vec<&'a T>) {
        if node.key.contains_point(point) {
            matches.extend(node.elements.iter());
        }
        if let Some(left) = &node.left
            && point <= left.max_high
        {
            Self::query_point_node(left, point, matches);
        }
        if let Some(right) = &node.right {
            Self::query_point_node(right, point, matches);
        }
    }

    /// All elements, in key order.
    pub fn to_vec(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.element_count);
        Self::in_order(&self.root, &mut out);
        out
    }

    fn in_order<'a>(node: &'a Option<Box<Node<T>>>, out: &mut Vec<&'a T>) {
        if let Some(node) = node {
            Self::in_order(&node.left, out);
            out.extend(node.elements.iter());
            Self::in_order(&node.right, out);
        }
    }

    /// The distinct intervals present, in order.
    pub fn intervals(&self) -> Vec<Interval> {
        let mut out = Vec::with_capacity(self.node_count);
        Self::keys_in_order(&self.root, &mut out);
        out
    }

    fn keys_in_order(node: &Option<Box<Node<T>>>, out: &mut Vec<Interval>) {
        if let Some(node) = node {
            Self::keys_in_order(&node.left, out);
            out.push(node.key);
            Self::keys_in_order(&node.right, out);
        }
    }

    /// The earliest start tick in the index.
    pub fn first_tick(&self) -> Option<u32> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(node.key.low())
    }

    /// The last tick covered by any element. Not necessarily the `high` of
    /// the greatest key: the index orders by start ticks, and the
    /// last-starting element may end before an earlier, longer one.
    pub fn last_tick(&self) -> Option<u32> {
        self.root.as_deref().map(|root| root.max_high)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total elements stored across all nodes.
    pub fn len(&self) -> usize {
        self.element_count
    }

    /// Number of nodes, i.e. distinct intervals.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Independent post-order recomputation of the `max_high` augmentation.
    /// Query pruning is only correct while this holds.
    pub fn max_invariant_holds(&self) -> bool {
        fn check<T>(node: &Node<T>) -> Option<u32> {
            let mut expected = node.key.high();
            if let Some(left) = &node.left {
                expected = expected.max(check(left)?);
            }
            if let Some(right) = &node.right {
                expected = expected.max(check(right)?);
            }
            (expected == node.max_high).then_some(expected)
        }
        match &self.root {
            Some(root) => check(root).is_some(),
            None => true,
        }
    }
}
