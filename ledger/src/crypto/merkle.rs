//! Merkle root over an ordered list of transaction hashes.
//!
//! Plain binary tree, Bitcoin style: odd levels duplicate their last
//! element, parents are `double_hash(left ++ right)` over the *hex strings*
//! of the children. A single leaf is paired with itself, so the root is
//! always the output of a hash and never a raw leaf.
//!
//! Duplicating the last element makes `[a, b, c]` and `[a, b, c, c]`
//! share a root (CVE-2012-2459). Blocks refuse duplicate transactions before
//! the tree is built, which keeps that from mattering here.

use crate::crypto::hash::double_hash;
use crate::error::{LedgerError, LedgerResult};

/// Compute the Merkle root of `leaves`.
///
/// # Errors
///
/// [`LedgerError::InvalidArgument`] if `leaves` is empty.
///
/// # Example
///
/// ```
/// use ledger_core::crypto::{double_hash, merkle_root};
///
/// let root = merkle_root(&["a", "b", "c"]).unwrap();
/// let left = double_hash("ab");
/// let right = double_hash("cc");
/// assert_eq!(root, double_hash(format!("{left}{right}")));
/// ```
pub fn merkle_root<S: AsRef<str>>(leaves: &[S]) -> LedgerResult<String> {
    if leaves.is_empty() {
        return Err(LedgerError::InvalidArgument(
            "cannot compute a Merkle root over zero leaves".to_string(),
        ));
    }

    let mut level: Vec<String> = pair_level(leaves);
    while level.len() > 1 {
        level = pair_level(&level);
    }

    Ok(level.swap_remove(0))
}

/// Hash adjacent pairs, duplicating the last element of an odd level.
fn pair_level<S: AsRef<str>>(level: &[S]) -> Vec<String> {
    level
        .chunks(2)
        .map(|pair| {
            let left = pair[0].as_ref();
            let right = pair.get(1).map_or(left, |r| r.as_ref());
            let mut combined = String::with_capacity(left.len() + right.len());
            combined.push_str(left);
            combined.push_str(right);
            double_hash(combined)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_leaf_list_is_rejected() {
        let leaves: [&str; 0] = [];
        assert!(matches!(
            merkle_root(&leaves),
            Err(LedgerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn single_leaf_pairs_with_itself() {
        assert_eq!(merkle_root(&["a"]).unwrap(), double_hash("aa"));
    }

    #[test]
    fn two_leaves() {
        assert_eq!(merkle_root(&["a", "b"]).unwrap(), double_hash("ab"));
    }

    #[test]
    fn three_leaves_duplicate_the_last() {
        let expected = double_hash(format!("{}{}", double_hash("ab"), double_hash("cc")));
        assert_eq!(merkle_root(&["a", "b", "c"]).unwrap(), expected);
    }

    #[test]
    fn four_leaves() {
        let expected = double_hash(format!("{}{}", double_hash("ab"), double_hash("cd")));
        assert_eq!(merkle_root(&["a", "b", "c", "d"]).unwrap(), expected);
    }

    #[test]
    fn six_leaves_duplicate_the_last_pair() {
        let p1 = double_hash("ab");
        let p2 = double_hash("cd");
        let p3 = double_hash("ef");
        let left = double_hash(format!("{p1}{p2}"));
        let right = double_hash(format!("{p3}{p3}"));
        let expected = double_hash(format!("{left}{right}"));

        let root = merkle_root(&["a", "b", "c", "d", "e", "f"]).unwrap();
        assert_eq!(root, expected);
    }

    #[test]
    fn order_matters() {
        let ab = merkle_root(&["a", "b"]).unwrap();
        let ba = merkle_root(&["b", "a"]).unwrap();
        assert_ne!(ab, ba);
    }

    proptest! {
        #[test]
        fn root_is_always_a_digest(leaves in prop::collection::vec("[0-9a-f]{1,64}", 1..40)) {
            let root = merkle_root(&leaves).unwrap();
            prop_assert!(crate::crypto::is_digest(&root));
        }

        #[test]
        fn root_is_deterministic(leaves in prop::collection::vec("[a-z]{1,8}", 1..20)) {
            prop_assert_eq!(merkle_root(&leaves).unwrap(), merkle_root(&leaves).unwrap());
        }
    }
}
