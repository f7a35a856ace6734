use crate::utils::{set_u32_at, set_u64_at};

/// Byte offsets of the ADRS fields. All fields are big-endian and
/// word-aligned; the last word (bytes 28..32) stays zero.
const OFFSET_LAYER: usize = 0;
const OFFSET_TREE: usize = 4;
const OFFSET_TYPE: usize = 12;
const OFFSET_KP_ADDR: usize = 16;
const OFFSET_CHAIN_ADDR: usize = 20;
const OFFSET_HASH_ADDR: usize = 24;
const OFFSET_TREE_HGT: usize = 20;
const OFFSET_TREE_INDEX: usize = 24;

/// The four address types used by the scheme.
/// The 4-byte corresponding value is set as the `type` word in an ADRS.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum AdrsType {
    /// Used for hashing through a WOTS+ chain.
    WotsHash = 0,
    /// Used for compression of a WOTS+ public key into a leaf.
    WotsPk = 1,
    /// Used for compression of two sibling nodes inside a Merkle tree.
    Tree = 2,
    /// Used for secret key generation (start of each chain).
    WotsPrf = 3,
}

/// The address `Adrs` is a 32-byte value providing domain separation for
/// every hash call in the scheme, so that no two distinct hash invocations
/// ever see the same input.
///
/// The fields, in byte order:
/// * `layer address`: a 4-byte value selecting the hypertree layer,
///   0 = bottom.
/// * `tree address`: an 8-byte value selecting the subtree within the
///   layer.
/// * `type`: a 4-byte value set from [`AdrsType`].
/// * three type-dependent 4-byte words: key pair / chain / hash addresses
///   for the WOTS+ types, or tree height / tree index for [`AdrsType::Tree`].
///
/// An `Adrs` is transient: constructed fresh per operation, threaded
/// through the hash calls, never persisted.
#[derive(Copy, Clone, Default, Debug)]
pub struct Adrs([u8; 32]);

impl AsRef<[u8]> for Adrs {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<AdrsType> for Adrs {
    /// Returns a zeroed `Adrs` with only the type word set.
    fn from(adrs_type: AdrsType) -> Self {
        let mut adrs = Self([0; 32]);
        adrs.set_type(adrs_type);
        adrs
    }
}

impl Adrs {
    /// Specify which hypertree layer we're working on.
    pub fn set_layer_addr(&mut self, layer: u32) {
        set_u32_at(self.0.as_mut(), layer, OFFSET_LAYER);
    }

    /// Specify which Merkle tree within the layer (the "tree address")
    /// we're working on.
    pub fn set_tree_addr(&mut self, tree: u64) {
        set_u64_at(self.0.as_mut(), tree, OFFSET_TREE);
    }

    /// Specify the reason we'll use this address structure for, that is,
    /// what hash will we compute with it. This is used so that unrelated
    /// types of hashes don't accidentally get the same address structure.
    pub fn set_type(&mut self, adrs_type: AdrsType) {
        set_u32_at(self.0.as_mut(), adrs_type as u32, OFFSET_TYPE);
    }

    /// Specify which Merkle leaf we're working on; that is, which OTS
    /// keypair we're talking about.
    pub fn set_keypair_addr(&mut self, keypair: u32) {
        set_u32_at(self.0.as_mut(), keypair, OFFSET_KP_ADDR);
    }

    /// Specify which chain within the OTS we're working with
    /// (the chain address).
    pub fn set_chain_addr(&mut self, chain: u32) {
        set_u32_at(self.0.as_mut(), chain, OFFSET_CHAIN_ADDR);
    }

    /// Specify where in the chain we are (the hash address).
    pub fn set_hash_addr(&mut self, hash: u32) {
        set_u32_at(self.0.as_mut(), hash, OFFSET_HASH_ADDR);
    }

    /// Specify the height of the node in the Merkle tree we are in
    /// (the tree height).
    pub fn set_tree_height(&mut self, tree_height: u32) {
        set_u32_at(self.0.as_mut(), tree_height, OFFSET_TREE_HGT);
    }

    /// Specify the distance from the left edge of the node in the Merkle
    /// tree (the tree index).
    pub fn set_tree_index(&mut self, tree_index: u32) {
        set_u32_at(self.0.as_mut(), tree_index, OFFSET_TREE_INDEX);
    }
}
