//! Worklist mark phase shared by the pruner and the transformer.
//!
//! A type is reachable if it is a seed, if a reachable type references it
//! through a field, argument, input field or union membership, or if it is an
//! object implementing a reachable interface. Implementing an interface does
//! not make the interface reachable.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;

/// A set of types that can be walked by [`mark_reachable`].
pub trait ReferenceGraph {
    type Key: Copy + Eq + Hash + Debug;

    fn keys(&self) -> Vec<Self::Key>;

    /// Outgoing references of `key`, excluding implements declarations.
    fn references(&self, key: Self::Key) -> Result<Vec<Self::Key>>;

    /// Interfaces declared by `key` if it is an object type, empty otherwise.
    fn implemented_interfaces(&self, key: Self::Key) -> Vec<Self::Key>;
}

pub fn mark_reachable<G: ReferenceGraph>(
    graph: &G,
    seeds: impl IntoIterator<Item = G::Key>,
) -> Result<HashSet<G::Key>> {
    let mut implementors: HashMap<G::Key, Vec<G::Key>> = HashMap::new();
    for key in graph.keys() {
        for interface in graph.implemented_interfaces(key) {
            implementors.entry(interface).or_default().push(key);
        }
    }

    let mut reachable = HashSet::new();
    let mut queue = VecDeque::new();
    for seed in seeds {
        if reachable.insert(seed) {
            queue.push_back(seed);
        }
    }
    while let Some(key) = queue.pop_front() {
        log::trace!("scanning {:?}", key);
        let mut next = graph.references(key)?;
        if let Some(objects) = implementors.get(&key) {
            next.extend(objects.iter().copied());
        }
        for candidate in next {
            if reachable.insert(candidate) {
                queue.push_back(candidate);
            }
        }
    }
    Ok(reachable)
}
