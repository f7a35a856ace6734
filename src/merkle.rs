//! Single-subtree Merkle tree construction.
//!
//! Builds the binary hash tree over the WOTS+ leaves of one (layer, tree)
//! position and answers root and authentication-path queries. The tree is
//! materialized as a level-indexed arena: level 0 holds the `2^height`
//! leaves, level `height` holds the root. Construction is deterministic in
//! (seeds, layer, tree, height); leaves are computed in parallel.

use crate::params::XMSS_N;
use crate::wots_plus::adrs::{Adrs, AdrsType};
use crate::wots_plus::WotsPlus;
use rayon::prelude::*;

/// A fully materialized subtree of one hypertree layer.
pub struct MerkleTree {
    height: u32,
    levels: Vec<Vec<[u8; XMSS_N]>>,
}

impl MerkleTree {
    /// Builds the subtree at address (`layer`, `tree`) over `2^height`
    /// WOTS+ leaves derived from `sk_seed`.
    pub fn build(
        pub_seed: &[u8; XMSS_N],
        sk_seed: &[u8],
        layer: u32,
        tree: u64,
        height: u32,
    ) -> Self {
        let wots = WotsPlus::new(pub_seed);
        let hasher = wots.hasher();

        let mut leaf_adrs = Adrs::from(AdrsType::WotsHash);
        leaf_adrs.set_layer_addr(layer);
        leaf_adrs.set_tree_addr(tree);

        let leaf_count = 1_usize << height;
        let leaves: Vec<[u8; XMSS_N]> = (0..leaf_count)
            .into_par_iter()
            .map(|i| wots.pk_gen(sk_seed, &leaf_adrs, i as u32))
            .collect();

        let mut node_adrs = Adrs::from(AdrsType::Tree);
        node_adrs.set_layer_addr(layer);
        node_adrs.set_tree_addr(tree);

        let mut levels = Vec::with_capacity(height as usize + 1);
        levels.push(leaves);
        for z in 1..=height {
            let below = &levels[z as usize - 1];
            let mut level = Vec::with_capacity(below.len() / 2);
            node_adrs.set_tree_height(z);
            for i in 0..below.len() / 2 {
                node_adrs.set_tree_index(i as u32);
                let mut parent = [0u8; XMSS_N];
                hasher.h(&mut parent, &below[2 * i], &below[2 * i + 1], &node_adrs);
                level.push(parent);
            }
            levels.push(level);
        }

        Self { height, levels }
    }

    /// The committed value of this subtree.
    pub fn root(&self) -> [u8; XMSS_N] {
        self.levels[self.height as usize][0]
    }

    /// The sibling nodes on the path from `leaf` to the root, one per
    /// level, leaf level first. Empty for a height-0 tree.
    pub fn auth_path(&self, leaf: u32) -> Vec<[u8; XMSS_N]> {
        (0..self.height)
            .map(|z| self.levels[z as usize][((leaf >> z) ^ 1) as usize])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rand::RngCore;

    fn random_seeds() -> ([u8; XMSS_N], [u8; XMSS_N]) {
        let mut pub_seed = [0u8; XMSS_N];
        let mut sk_seed = [0u8; XMSS_N];
        OsRng.fill_bytes(&mut pub_seed);
        OsRng.fill_bytes(&mut sk_seed);
        (pub_seed, sk_seed)
    }

    #[test]
    fn test_determinism() {
        let (pub_seed, sk_seed) = random_seeds();

        let a = MerkleTree::build(&pub_seed, &sk_seed, 1, 42, 3);
        let b = MerkleTree::build(&pub_seed, &sk_seed, 1, 42, 3);

        assert_eq!(a.root(), b.root());
        for leaf in 0..8 {
            assert_eq!(a.auth_path(leaf), b.auth_path(leaf));
        }
    }

    #[test]
    fn test_position_changes_root() {
        let (pub_seed, sk_seed) = random_seeds();

        let base = MerkleTree::build(&pub_seed, &sk_seed, 0, 0, 2);
        let other_tree = MerkleTree::build(&pub_seed, &sk_seed, 0, 1, 2);
        let other_layer = MerkleTree::build(&pub_seed, &sk_seed, 1, 0, 2);

        assert_ne!(base.root(), other_tree.root());
        assert_ne!(base.root(), other_layer.root());
    }

    #[test]
    fn test_auth_path_length() {
        let (pub_seed, sk_seed) = random_seeds();

        let tree = MerkleTree::build(&pub_seed, &sk_seed, 0, 0, 3);
        for leaf in 0..8 {
            assert_eq!(tree.auth_path(leaf).len(), 3);
        }
    }

    #[test]
    fn test_height_zero_tree() {
        let (pub_seed, sk_seed) = random_seeds();

        let tree = MerkleTree::build(&pub_seed, &sk_seed, 0, 0, 0);
        let leaf = WotsPlus::new(&pub_seed).pk_gen(
            &sk_seed,
            &{
                let mut adrs = Adrs::from(AdrsType::WotsHash);
                adrs.set_layer_addr(0);
                adrs.set_tree_addr(0);
                adrs
            },
            0,
        );
        assert_eq!(tree.root(), leaf);
        assert!(tree.auth_path(0).is_empty());
    }

    #[test]
    fn test_root_hand_computed() {
        // A height-1 root must equal h(leaf0, leaf1) under the tree address.
        let (pub_seed, sk_seed) = random_seeds();

        let tree = MerkleTree::build(&pub_seed, &sk_seed, 0, 7, 1);

        let wots = WotsPlus::new(&pub_seed);
        let mut leaf_adrs = Adrs::from(AdrsType::WotsHash);
        leaf_adrs.set_tree_addr(7);
        let leaf0 = wots.pk_gen(&sk_seed, &leaf_adrs, 0);
        let leaf1 = wots.pk_gen(&sk_seed, &leaf_adrs, 1);
        assert_eq!(tree.auth_path(0), vec![leaf1]);
        assert_eq!(tree.auth_path(1), vec![leaf0]);

        let mut node_adrs = Adrs::from(AdrsType::Tree);
        node_adrs.set_tree_addr(7);
        node_adrs.set_tree_height(1);
        node_adrs.set_tree_index(0);
        let mut root = [0u8; XMSS_N];
        wots.hasher().h(&mut root, &leaf0, &leaf1, &node_adrs);
        assert_eq!(tree.root(), root);
    }
}
