//! Byte-indexed, weight-balanced rope (spec §3, §4.1).
//!
//! Every node is either a *leaf* holding a byte string, or an *internal*
//! node holding `weight = total bytes in the left subtree`. `index`
//! descends right (subtracting `weight`) when the target offset is `>=
//! weight`, else left; `length(r) = weight(r) + length(right(r))`.
//!
//! Edits are persistent: `insert`/`remove_span` return a new `Rope` that
//! shares untouched structure with the original via reference counting,
//! rather than mutating in place. Rebalancing is not attempted — the
//! spec explicitly tolerates an unbalanced tree.

use std::rc::Rc;

#[derive(Debug)]
enum Node {
    Leaf(Vec<u8>),
    Internal {
        weight: usize,
        left: Link,
        right: Link,
    },
}

type Link = Option<Rc<Node>>;

/// A persistent byte rope. Cloning is O(1) (it clones an `Rc`).
#[derive(Debug, Clone)]
pub struct Rope {
    root: Link,
}

fn link_len(link: &Link) -> usize {
    match link {
        None => 0,
        Some(n) => match &**n {
            Node::Leaf(bytes) => bytes.len(),
            Node::Internal { weight, right, .. } => weight + link_len(right),
        },
    }
}

fn link_index(link: &Link, i: usize) -> u8 {
    match link {
        None => 0,
        Some(n) => match &**n {
            Node::Leaf(bytes) => bytes.get(i).copied().unwrap_or(0),
            Node::Internal {
                weight,
                left,
                right,
            } => {
                if i >= *weight {
                    link_index(right, i - weight)
                } else {
                    link_index(left, i)
                }
            }
        },
    }
}

/// Split `link` into `(before, at-or-after)` at byte offset `i`.
fn split(link: &Link, i: usize) -> (Link, Link) {
    match link {
        None => (None, None),
        Some(n) => match &**n {
            Node::Leaf(bytes) => {
                if i == 0 {
                    (None, Some(n.clone()))
                } else if i >= bytes.len() {
                    (Some(n.clone()), None)
                } else {
                    let (prefix, suffix) = bytes.split_at(i);
                    (
                        Some(Rc::new(Node::Leaf(prefix.to_vec()))),
                        Some(Rc::new(Node::Leaf(suffix.to_vec()))),
                    )
                }
            }
            Node::Internal {
                weight,
                left,
                right,
            } => {
                if i < *weight {
                    let (l, r) = split(left, i);
                    (l, Some(concat(r, right.clone())))
                } else if i == *weight {
                    (left.clone(), right.clone())
                } else {
                    let (l, r) = split(right, i - weight);
                    (Some(concat(left.clone(), l)), r)
                }
            }
        },
    }
}

fn concat(left: Link, right: Link) -> Rc<Node> {
    match (left, right) {
        (None, None) => Rc::new(Node::Leaf(Vec::new())),
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (Some(l), Some(r)) => {
            let weight = link_len(&Some(l.clone()));
            Rc::new(Node::Internal {
                weight,
                left: Some(l),
                right: Some(r),
            })
        }
    }
}

fn concat_link(left: Link, right: Link) -> Link {
    match (&left, &right) {
        (None, None) => None,
        _ => Some(concat(left, right)),
    }
}

impl Rope {
    /// `create`: a single leaf wrapped under one internal parent node.
    pub fn new(bytes: &[u8]) -> Self {
        let leaf = Rc::new(Node::Leaf(bytes.to_vec()));
        let root = Some(Rc::new(Node::Internal {
            weight: bytes.len(),
            left: Some(leaf),
            right: None,
        }));
        Rope { root }
    }

    pub fn empty() -> Self {
        Rope { root: None }
    }

    pub fn len(&self) -> usize {
        link_len(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `index`: out-of-range offsets return 0 rather than erroring.
    pub fn byte_at(&self, i: usize) -> u8 {
        link_index(&self.root, i)
    }

    /// `insert`: byte-indexed insertion. `i >= length` appends, `i == 0`
    /// prepends, otherwise the addressed leaf is split around `i`.
    pub fn insert(&self, i: usize, s: &[u8]) -> Rope {
        if s.is_empty() {
            return self.clone();
        }
        let i = i.min(self.len());
        let (left, right) = split(&self.root, i);
        let mid: Link = Some(Rc::new(Node::Leaf(s.to_vec())));
        Rope {
            root: concat_link(concat_link(left, mid), right),
        }
    }

    /// `remove_span`: removes `count` bytes starting at `offset`, clamped
    /// so `offset + count <= length`. `count == 0` is a no-op.
    pub fn remove_span(&self, offset: usize, count: usize) -> Rope {
        let len = self.len();
        let offset = offset.min(len);
        let count = count.min(len - offset);
        if count == 0 {
            return self.clone();
        }
        let (left, rest) = split(&self.root, offset);
        let (_, right) = split(&rest, count);
        Rope {
            root: concat_link(left, right),
        }
    }

    /// Byte range `[start, end)`. Used by buffer history to capture the
    /// bytes a removal is about to discard.
    pub fn slice(&self, start: usize, end: usize) -> Vec<u8> {
        let end = end.min(self.len());
        if start >= end {
            return Vec::new();
        }
        (start..end).map(|i| self.byte_at(i)).collect()
    }

    /// `to_string`: in-order concatenation of leaves via an explicit
    /// stack, since tree depth is unbounded on an unbalanced rope.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<Rc<Node>> = Vec::new();
        let mut cur = self.root.clone();
        loop {
            while let Some(n) = cur {
                let next = match &*n {
                    Node::Leaf(_) => None,
                    Node::Internal { left, .. } => left.clone(),
                };
                stack.push(n);
                cur = next;
            }
            match stack.pop() {
                None => break,
                Some(n) => match &*n {
                    Node::Leaf(bytes) => out.extend_from_slice(bytes),
                    Node::Internal { right, .. } => cur = right.clone(),
                },
            }
        }
        out
    }
}

impl Default for Rope {
    fn default() -> Self {
        Rope::empty()
    }
}

#[cfg(test)]
#[path = "rope_tests.rs"]
mod tests;
