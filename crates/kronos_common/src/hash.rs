//! Sequence hashing for duplicate-path suppression.

use serde::{Deserialize, Serialize};

/// A 128-bit XXH3 hash of a `u32` index sequence.
///
/// The path enumerator keys its visited and emitted sets by this hash of
/// the full node-index sequence: two paths collide only when they visit
/// the same nodes in the same order. Deduplicating by endpoint pair alone
/// would drop legitimate distinct paths through diamond fanouts, so the
/// whole sequence participates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SeqHash(u128);

impl SeqHash {
    /// Computes the hash of a sequence of raw `u32` indices.
    pub fn of_indices(indices: impl IntoIterator<Item = u32>) -> Self {
        let mut bytes = Vec::new();
        for index in indices {
            bytes.extend_from_slice(&index.to_le_bytes());
        }
        Self(xxhash_rust::xxh3::xxh3_128(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // Node sequences as the enumerator produces them: graph indices in
    // visit order, startpoint first.

    #[test]
    fn same_node_sequence_same_hash() {
        let a = SeqHash::of_indices([0, 3, 5, 1]);
        let b = SeqHash::of_indices([0, 3, 5, 1]);
        assert_eq!(a, b);
    }

    #[test]
    fn diamond_arms_hash_differently() {
        // ff1 -> s -> top_arm -> j -> ff2 versus ff1 -> s -> bot_arm -> j -> ff2:
        // same endpoints, different interior node.
        let top = SeqHash::of_indices([0, 1, 2, 4, 5]);
        let bottom = SeqHash::of_indices([0, 1, 3, 4, 5]);
        assert_ne!(top, bottom);
    }

    #[test]
    fn reversed_traversal_is_distinct() {
        assert_ne!(
            SeqHash::of_indices([0, 1, 2]),
            SeqHash::of_indices([2, 1, 0])
        );
    }

    #[test]
    fn extending_a_path_changes_its_hash() {
        // A queued prefix and its extension must occupy separate visited
        // slots, including a self-loop extension.
        let prefix = SeqHash::of_indices([7]);
        assert_ne!(prefix, SeqHash::of_indices([7, 9]));
        assert_ne!(SeqHash::of_indices([7, 9]), SeqHash::of_indices([7, 9, 9]));
    }

    #[test]
    fn deduplicates_in_a_visited_set() {
        let mut visited = HashSet::new();
        assert!(visited.insert(SeqHash::of_indices([0, 1, 4])));
        assert!(visited.insert(SeqHash::of_indices([0, 2, 4])));
        assert!(!visited.insert(SeqHash::of_indices([0, 1, 4])));
        assert_eq!(visited.len(), 2);
    }
}
