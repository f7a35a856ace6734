//! # XMSS-MT: the multi-tree signing scheme
//!
//! Composes `d` stacked layers of Merkle trees, each of height `h/d`,
//! into one virtual tree with `2^h` one-time signing slots. The bottom
//! layer signs message digests; each layer above certifies the roots of
//! the layer below with its own WOTS+ keypairs. The public key is the
//! top layer's single root plus the public seed.
//!
//! A [`PrivateKey`] owns the only mutable state of the scheme: the
//! monotonically increasing leaf index. Two signatures issued for the
//! same index under the same seed allow practical existential forgery,
//! so index allocation is a serialized, never-repeating operation and a
//! `PrivateKey` cannot be cloned.

use crate::error::{Error, Result};
use crate::hash::XmssHasher;
use crate::merkle::MerkleTree;
use crate::params::{
    signature_bytes, SEED_BYTES, XMSS_MAX_HEIGHT, XMSS_MAX_TREE_HEIGHT, XMSS_N, XMSS_PK_BYTES,
    XMSS_WOTS_BYTES,
};
use crate::utils::{array_struct, bytes_to_u64, u64_to_bytes};
use crate::wots_plus::adrs::{Adrs, AdrsType};
use crate::wots_plus::WotsPlus;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};
use zeroize::Zeroize;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serialization")]
use serde_big_array::BigArray;

array_struct!(Seed, SEED_BYTES);

/// Generates a fresh random seed from the operating system's secure
/// randomness source. The seed is the root of all key derivation:
/// `sk_seed || pub_seed`, each `XMSS_N` bytes.
pub fn generate_seed() -> Seed {
    let mut seed = [0u8; SEED_BYTES];
    OsRng.fill_bytes(&mut seed);
    Seed::from(seed)
}

/// The stateful signing key of the multi-tree scheme.
///
/// Owns the seed material, the (h, d) geometry, and the leaf index.
/// Deliberately not `Clone`: a duplicated key would duplicate the index
/// counter and reintroduce the one-time-key reuse hazard. The secret
/// seed is wiped from memory on drop.
#[derive(Debug)]
pub struct PrivateKey {
    sk_seed: [u8; XMSS_N],
    pub_seed: [u8; XMSS_N],
    root: [u8; XMSS_N],
    h: u32,
    d: u32,
    index: AtomicU64,
}

/// The shareable verification key: top-layer root and public seed.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PublicKey {
    root: [u8; XMSS_N],
    pub_seed: [u8; XMSS_N],
}

/// One layer's share of a signature: the WOTS+ signature over that
/// layer's digest (the user message digest at the bottom, the root of
/// the layer below everywhere else) and the authentication path of the
/// signing leaf.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LayerSignature {
    #[cfg_attr(feature = "serialization", serde(with = "BigArray"))]
    wots_sig: [u8; XMSS_WOTS_BYTES],
    auth: Vec<[u8; XMSS_N]>,
}

/// A complete multi-tree signature: the leaf index used, and one
/// [`LayerSignature`] per layer, bottom first. Immutable once produced.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Signature {
    idx: u64,
    layers: Vec<LayerSignature>,
}

fn wots_base_adrs(layer: u32, tree: u64) -> Adrs {
    let mut adrs = Adrs::from(AdrsType::WotsHash);
    adrs.set_layer_addr(layer);
    adrs.set_tree_addr(tree);
    adrs
}

impl PrivateKey {
    /// Creates the signing key for a virtual tree of total height `h`
    /// split into `d` layers, and computes its top-layer root.
    ///
    /// Fails with [`Error::InvalidParameters`] unless `h` is a positive
    /// multiple of `d`, `h <= XMSS_MAX_HEIGHT`, and the per-layer height
    /// `h/d` fits the ADRS key-pair word (`<= XMSS_MAX_TREE_HEIGHT`).
    pub fn new(seed: &Seed, h: u32, d: u32) -> Result<Self> {
        if h == 0 || d == 0 || h % d != 0 || h > XMSS_MAX_HEIGHT || h / d > XMSS_MAX_TREE_HEIGHT {
            return Err(Error::InvalidParameters { h, d });
        }

        let mut sk_seed = [0u8; XMSS_N];
        let mut pub_seed = [0u8; XMSS_N];
        sk_seed.copy_from_slice(&seed.as_ref()[..XMSS_N]);
        pub_seed.copy_from_slice(&seed.as_ref()[XMSS_N..]);

        let top = MerkleTree::build(&pub_seed, &sk_seed, d - 1, 0, h / d);

        Ok(Self {
            sk_seed,
            pub_seed,
            root: top.root(),
            h,
            d,
            index: AtomicU64::new(0),
        })
    }

    /// The verification key matching this signing key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            root: self.root,
            pub_seed: self.pub_seed,
        }
    }

    /// Number of one-time signing slots this key can still use.
    pub fn remaining(&self) -> u64 {
        (1u64 << self.h) - self.index.load(Ordering::SeqCst)
    }

    /// Returns the current index and advances it, exactly once per call
    /// even under concurrent signing. [`Error::Exhausted`] once all
    /// `2^h` slots are consumed; the counter never wraps.
    fn next_index(&self) -> Result<u64> {
        let cap = 1u64 << self.h;
        self.index
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |idx| {
                if idx < cap {
                    Some(idx + 1)
                } else {
                    None
                }
            })
            .map_err(|_| Error::Exhausted)
    }

    /// Signs a message, consuming one leaf index.
    ///
    /// The index is split into per-layer (tree, leaf) coordinates, least
    /// significant bits at the bottom layer. Layer 0 signs the message
    /// digest; every layer above signs the root of the tree below it.
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        let idx = self.next_index()?;
        let tree_height = self.h / self.d;
        let leaf_mask = (1u64 << tree_height) - 1;

        let hasher = XmssHasher::new(self.pub_seed);
        let wots = WotsPlus::new(&self.pub_seed);

        let mut digest = [0u8; XMSS_N];
        hasher.h_msg(&mut digest, &self.root, idx, message);

        let mut leaf_idx = (idx & leaf_mask) as u32;
        let mut tree_idx = idx >> tree_height;

        let mut layers = Vec::with_capacity(self.d as usize);
        let mut to_sign = digest;
        for layer in 0..self.d {
            let tree =
                MerkleTree::build(&self.pub_seed, &self.sk_seed, layer, tree_idx, tree_height);
            let base_adrs = wots_base_adrs(layer, tree_idx);

            layers.push(LayerSignature {
                wots_sig: wots.sign(&to_sign, &self.sk_seed, &base_adrs, leaf_idx),
                auth: tree.auth_path(leaf_idx),
            });

            // The root just built is what the next layer up certifies.
            to_sign = tree.root();
            leaf_idx = (tree_idx & leaf_mask) as u32;
            tree_idx >>= tree_height;
        }

        Ok(Signature { idx, layers })
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.sk_seed.zeroize();
    }
}

impl PublicKey {
    /// root || pub_seed, fixed width.
    pub fn to_bytes(&self) -> [u8; XMSS_PK_BYTES] {
        let mut bytes = [0u8; XMSS_PK_BYTES];
        bytes[..XMSS_N].copy_from_slice(&self.root);
        bytes[XMSS_N..].copy_from_slice(&self.pub_seed);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != XMSS_PK_BYTES {
            return Err(Error::BadLength(XMSS_PK_BYTES, bytes.len()));
        }
        let mut root = [0u8; XMSS_N];
        let mut pub_seed = [0u8; XMSS_N];
        root.copy_from_slice(&bytes[..XMSS_N]);
        pub_seed.copy_from_slice(&bytes[XMSS_N..]);
        Ok(Self { root, pub_seed })
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.pub_seed == other.pub_seed
    }
}

impl Eq for PublicKey {}

impl Signature {
    /// The leaf index this signature consumed.
    pub fn index(&self) -> u64 {
        self.idx
    }

    /// idx (8-byte big-endian) || per layer bottom-to-top: WOTS+
    /// signature || authentication path.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            8 + self
                .layers
                .iter()
                .map(|l| XMSS_WOTS_BYTES + l.auth.len() * XMSS_N)
                .sum::<usize>(),
        );
        bytes.extend_from_slice(&u64_to_bytes(self.idx));
        for layer in &self.layers {
            bytes.extend_from_slice(&layer.wots_sig);
            for node in &layer.auth {
                bytes.extend_from_slice(node);
            }
        }
        bytes
    }

    /// Parses a signature produced under the given `(h, d)` geometry.
    ///
    /// # Errors
    /// [`Error::InvalidParameters`] for a geometry this crate never
    /// signs under, [`Error::BadLength`] when the byte count does not
    /// match that geometry exactly.
    pub fn from_bytes(bytes: &[u8], h: u32, d: u32) -> Result<Self> {
        if h == 0 || d == 0 || h % d != 0 || h > XMSS_MAX_HEIGHT || h / d > XMSS_MAX_TREE_HEIGHT {
            return Err(Error::InvalidParameters { h, d });
        }
        let expected = signature_bytes(h, d);
        if bytes.len() != expected {
            return Err(Error::BadLength(expected, bytes.len()));
        }

        let tree_height = (h / d) as usize;
        let idx = bytes_to_u64(&bytes[..8]);

        let mut layers = Vec::with_capacity(d as usize);
        let mut offset = 8;
        for _ in 0..d {
            let mut wots_sig = [0u8; XMSS_WOTS_BYTES];
            wots_sig.copy_from_slice(&bytes[offset..offset + XMSS_WOTS_BYTES]);
            offset += XMSS_WOTS_BYTES;

            let mut auth = Vec::with_capacity(tree_height);
            for _ in 0..tree_height {
                let mut node = [0u8; XMSS_N];
                node.copy_from_slice(&bytes[offset..offset + XMSS_N]);
                offset += XMSS_N;
                auth.push(node);
            }
            layers.push(LayerSignature { wots_sig, auth });
        }

        Ok(Self { idx, layers })
    }
}

/// Verifies a multi-tree signature against a message and public key.
///
/// Recomputes the bottom leaf from the WOTS+ signature and the message
/// digest, reconstructs that layer's root through the authentication
/// path, then feeds each reconstructed root into the layer above.
/// Accepts iff the final root equals the public key's root.
///
/// Structural mismatches (an empty or ragged layer sequence, a geometry
/// outside the supported range, an index too large for the implied
/// height) reject outright. Runs against attacker-controlled input and
/// never panics.
pub fn verify(signature: &Signature, message: &[u8], pk: &PublicKey) -> bool {
    let d = signature.layers.len() as u32;
    if d == 0 {
        return false;
    }
    let tree_height = signature.layers[0].auth.len() as u32;
    if tree_height == 0 || tree_height > XMSS_MAX_TREE_HEIGHT {
        return false;
    }
    if signature
        .layers
        .iter()
        .any(|l| l.auth.len() as u32 != tree_height)
    {
        return false;
    }
    let h = match d.checked_mul(tree_height) {
        Some(h) if h <= XMSS_MAX_HEIGHT => h,
        _ => return false,
    };
    if (signature.idx >> h) != 0 {
        return false;
    }

    let hasher = XmssHasher::new(pk.pub_seed);
    let wots = WotsPlus::new(&pk.pub_seed);

    let mut digest = [0u8; XMSS_N];
    hasher.h_msg(&mut digest, &pk.root, signature.idx, message);

    let leaf_mask = (1u64 << tree_height) - 1;
    let mut leaf_idx = (signature.idx & leaf_mask) as u32;
    let mut tree_idx = signature.idx >> tree_height;

    let mut expected = digest;
    for (layer, layer_sig) in signature.layers.iter().enumerate() {
        let base_adrs = wots_base_adrs(layer as u32, tree_idx);
        let mut node = wots.pk_from_sig(&layer_sig.wots_sig, &expected, &base_adrs, leaf_idx);

        let mut node_adrs = Adrs::from(AdrsType::Tree);
        node_adrs.set_layer_addr(layer as u32);
        node_adrs.set_tree_addr(tree_idx);
        for (z, sibling) in layer_sig.auth.iter().enumerate() {
            node_adrs.set_tree_height(z as u32 + 1);
            node_adrs.set_tree_index((leaf_idx as u64 >> (z + 1)) as u32);
            let mut parent = [0u8; XMSS_N];
            if (leaf_idx >> z) & 1 == 0 {
                hasher.h(&mut parent, &node, sibling, &node_adrs);
            } else {
                hasher.h(&mut parent, sibling, &node, &node_adrs);
            }
            node = parent;
        }

        expected = node;
        leaf_idx = (tree_idx & leaf_mask) as u32;
        tree_idx >>= tree_height;
    }

    expected == pk.root
}
