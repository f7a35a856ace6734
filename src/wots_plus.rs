//! # Winternitz One-Time Signature Scheme Plus (W-OTS+)
//!
//! One-time signatures over a fixed `XMSS_N`-byte digest, built from
//! iterated hash chains. Each keypair lives at a (layer, tree, leaf)
//! position of the hypertree; the position is carried into every hash
//! call through the [`Adrs`] the caller provides, which binds the chain
//! values to that position.
//!
//! Chain starts are always derived on demand from the secret seed via the
//! PRF; no private chain material is ever stored at rest.
//!
//! ## Important Note
//!
//! A W-OTS+ keypair must sign at most one digest. The index discipline
//! enforcing this lives one level up, in the multi-tree signing state.

use crate::hash::XmssHasher;
use crate::params::{
    XMSS_N, XMSS_WOTS_BYTES, XMSS_WOTS_LEN, XMSS_WOTS_LEN1, XMSS_WOTS_LEN2, XMSS_WOTS_LEN2_BYTES,
    XMSS_WOTS_LOGW, XMSS_WOTS_W,
};
use crate::utils::u64_to_bytes;
use crate::wots_plus::adrs::Adrs;
use crate::wots_plus::adrs::AdrsType::{WotsHash, WotsPk, WotsPrf};

pub mod adrs;

/// Encapsulates the W-OTS+ operations and holds the keyed hasher.
#[derive(Clone, Debug)]
pub struct WotsPlus {
    hasher: XmssHasher,
}

impl WotsPlus {
    /// Creates a new `WotsPlus` instance with the specified public seed.
    /// The public seed keys every hash call made by this instance.
    pub fn new(pub_seed: &[u8; XMSS_N]) -> Self {
        let hasher = XmssHasher::new(*pub_seed);
        Self { hasher }
    }

    pub(crate) fn hasher(&self) -> &XmssHasher {
        &self.hasher
    }

    /// Derives the public key of the keypair at `leaf_idx` and compresses
    /// it into its `XMSS_N`-byte leaf value.
    ///
    /// `base_adrs` must carry the layer and tree addresses of the subtree
    /// the keypair belongs to; type and position words are set here.
    pub fn pk_gen(&self, sk_seed: &[u8], base_adrs: &Adrs, leaf_idx: u32) -> [u8; XMSS_N] {
        let mut pk_buf = [0_u8; XMSS_WOTS_BYTES];
        let mut buf_index: usize;

        let mut sk_adrs = *base_adrs;
        sk_adrs.set_keypair_addr(leaf_idx);

        for i in 0..XMSS_WOTS_LEN {
            buf_index = i * XMSS_N;

            // Start with the secret seed
            sk_adrs.set_type(WotsPrf);
            sk_adrs.set_chain_addr(i as u32);
            sk_adrs.set_hash_addr(0_u32);
            self.hasher.prf(
                pk_buf[buf_index..buf_index + XMSS_N].as_mut(),
                sk_seed,
                &sk_adrs,
            );

            // Walk the full chain to the public end value.
            sk_adrs.set_type(WotsHash);
            self.gen_chain_inplace(
                pk_buf[buf_index..buf_index + XMSS_N].as_mut(),
                0,
                XMSS_WOTS_W - 1,
                &mut sk_adrs,
            );
        }

        let mut pk_adrs = *base_adrs;
        pk_adrs.set_type(WotsPk);
        pk_adrs.set_keypair_addr(leaf_idx);

        // Do the final thash to compress the chain ends into the leaf.
        let mut pk = [0u8; XMSS_N];
        self.hasher
            .t_l(pk.as_mut(), &pk_buf, XMSS_WOTS_LEN, &pk_adrs);

        pk
    }

    /// Signs an `XMSS_N`-byte digest with the keypair at `leaf_idx`,
    /// deriving the chain starts from the secret seed.
    pub fn sign(
        &self,
        digest: &[u8],
        sk_seed: &[u8],
        base_adrs: &Adrs,
        leaf_idx: u32,
    ) -> [u8; XMSS_WOTS_BYTES] {
        let mut sig_buf = [0_u8; XMSS_WOTS_BYTES];
        let mut buf_index: usize;

        // Calculate chain steps for the given digest
        let mut steps = [0_u32; XMSS_WOTS_LEN];
        Self::chain_lengths(steps.as_mut(), digest);

        let mut sk_adrs = *base_adrs;
        sk_adrs.set_keypair_addr(leaf_idx);

        for i in 0..XMSS_WOTS_LEN {
            buf_index = i * XMSS_N;

            sk_adrs.set_type(WotsPrf);
            sk_adrs.set_chain_addr(i as u32);
            sk_adrs.set_hash_addr(0_u32);
            self.hasher.prf(
                sig_buf[buf_index..buf_index + XMSS_N].as_mut(),
                sk_seed,
                &sk_adrs,
            );

            // Reveal the intermediate chain value at the digit position.
            sk_adrs.set_type(WotsHash);
            self.gen_chain_inplace(
                sig_buf[buf_index..buf_index + XMSS_N].as_mut(),
                0,
                steps[i] as usize,
                &mut sk_adrs,
            );
        }

        sig_buf
    }

    /// Takes a WOTS signature and an `XMSS_N`-byte digest, computes the
    /// candidate leaf value by completing every chain. Equality with the
    /// expected leaf is the accept condition; a mismatch anywhere yields
    /// a different leaf, never an error.
    pub fn pk_from_sig(
        &self,
        sig: &[u8],
        digest: &[u8],
        base_adrs: &Adrs,
        leaf_idx: u32,
    ) -> [u8; XMSS_N] {
        let mut pk_buf = [0_u8; XMSS_WOTS_BYTES];

        let mut lengths = [0_u32; XMSS_WOTS_LEN];
        Self::chain_lengths(lengths.as_mut(), digest);

        let mut adrs = *base_adrs;
        adrs.set_type(WotsHash);
        adrs.set_keypair_addr(leaf_idx);

        for i in 0..XMSS_WOTS_LEN {
            adrs.set_chain_addr(i as u32);
            pk_buf[i * XMSS_N..(i + 1) * XMSS_N].copy_from_slice(&sig[i * XMSS_N..(i + 1) * XMSS_N]);
            self.gen_chain_inplace(
                pk_buf[i * XMSS_N..(i + 1) * XMSS_N].as_mut(),
                lengths[i] as usize,
                XMSS_WOTS_W - 1 - (lengths[i] as usize),
                &mut adrs,
            );
        }

        let mut pk_adrs = *base_adrs;
        pk_adrs.set_type(WotsPk);
        pk_adrs.set_keypair_addr(leaf_idx);

        let mut pk = [0u8; XMSS_N];
        self.hasher
            .t_l(pk.as_mut(), &pk_buf, XMSS_WOTS_LEN, &pk_adrs);

        pk
    }

    /// Computes the chaining function in place.
    ///
    /// Interprets the buffer as the `start`-th value of the chain and
    /// applies `steps` calls to F. `adrs` has to carry the chain address.
    fn gen_chain_inplace(&self, inout: &mut [u8], start: usize, steps: usize, adrs: &mut Adrs) {
        for i in start..(start + steps) {
            if i >= XMSS_WOTS_W - 1 {
                break;
            }
            adrs.set_hash_addr(i as u32);
            self.hasher.f_inplace(inout[..XMSS_N].as_mut(), adrs);
        }
    }

    /// Converts an array of bytes into integers in base `w`.
    fn base_w(output: &mut [u32], out_len: usize, input: &[u8]) {
        let mut bits = 0;
        let mut total: u8 = 0;
        let mut input_index = 0;

        for out in output[..out_len].iter_mut() {
            if bits == 0 {
                // Load a new byte from input
                total = input[input_index];
                input_index += 1;
                bits += 8;
            }

            bits -= XMSS_WOTS_LOGW;
            // Extract XMSS_WOTS_LOGW bits and convert to u32
            *out = ((total >> bits) & ((XMSS_WOTS_W - 1) as u8)) as u32;
        }
    }

    /// Computes the WOTS+ checksum over a digest (in base_w). The checksum
    /// digits make forging a larger digit require inverting another chain.
    fn wots_checksum(csum_base_w: &mut [u32], msg_base_w: &[u32]) {
        let mut csum: u64 = 0;

        for &msg in msg_base_w.iter().take(XMSS_WOTS_LEN1) {
            csum += (XMSS_WOTS_W as u64) - 1 - msg as u64;
        }

        // Make sure expected empty zero bits are the least significant bits,
        // then encode big-endian into the minimal checksum field.
        let shift = (8 - ((XMSS_WOTS_LEN2 * XMSS_WOTS_LOGW) % 8)) % 8;
        csum <<= shift;
        let csum_bytes = u64_to_bytes(csum);

        Self::base_w(
            csum_base_w,
            XMSS_WOTS_LEN2,
            &csum_bytes[8 - XMSS_WOTS_LEN2_BYTES..],
        );
    }

    /// Takes a digest and derives the matching chain lengths.
    fn chain_lengths(lengths: &mut [u32], digest: &[u8]) {
        Self::base_w(lengths, XMSS_WOTS_LEN1, digest);
        let lengths_msg = lengths[..XMSS_WOTS_LEN1].to_vec();
        Self::wots_checksum(lengths[XMSS_WOTS_LEN1..].as_mut(), &lengths_msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::OsRng;

    fn random_position_adrs(rng: &mut OsRng) -> Adrs {
        let mut adrs = Adrs::from(WotsHash);
        adrs.set_layer_addr(rng.gen_range(0..4));
        adrs.set_tree_addr(rng.gen());
        adrs
    }

    #[test]
    fn test_wots_plus() {
        let mut pub_seed = [0; XMSS_N];
        let mut sk_seed = [0; XMSS_N];
        let mut digest = [0; XMSS_N];
        let mut rng = OsRng;
        rng.fill_bytes(&mut pub_seed);
        rng.fill_bytes(&mut sk_seed);
        rng.fill_bytes(&mut digest);

        let wp = WotsPlus::new(&pub_seed);
        let adrs = random_position_adrs(&mut rng);
        let leaf_idx = rng.gen_range(0..16);

        let pk = wp.pk_gen(&sk_seed, &adrs, leaf_idx);
        let signature = wp.sign(&digest, &sk_seed, &adrs, leaf_idx);
        assert_eq!(wp.pk_from_sig(&signature, &digest, &adrs, leaf_idx), pk);

        let mut fake_signature = signature;
        fake_signature[0] ^= 1;
        assert_ne!(wp.pk_from_sig(&fake_signature, &digest, &adrs, leaf_idx), pk);

        let mut fake_digest = digest;
        fake_digest[XMSS_N - 1] ^= 1;
        assert_ne!(wp.pk_from_sig(&signature, &fake_digest, &adrs, leaf_idx), pk);

        // Same seed and position: everything is reproducible.
        let wp_same = WotsPlus::new(&pub_seed);
        assert_eq!(wp_same.pk_gen(&sk_seed, &adrs, leaf_idx), pk);
        assert_eq!(wp_same.sign(&digest, &sk_seed, &adrs, leaf_idx), signature);
    }

    #[test]
    fn test_position_binds_keypair() {
        let mut rng = OsRng;
        let mut pub_seed = [0; XMSS_N];
        let mut sk_seed = [0; XMSS_N];
        rng.fill_bytes(&mut pub_seed);
        rng.fill_bytes(&mut sk_seed);

        let wp = WotsPlus::new(&pub_seed);
        let adrs = Adrs::from(WotsHash);

        // Distinct leaves of the same tree get unrelated keys.
        assert_ne!(wp.pk_gen(&sk_seed, &adrs, 0), wp.pk_gen(&sk_seed, &adrs, 1));

        // So do identical leaves of distinct trees.
        let mut other_tree = adrs;
        other_tree.set_tree_addr(1);
        assert_ne!(
            wp.pk_gen(&sk_seed, &adrs, 0),
            wp.pk_gen(&sk_seed, &other_tree, 0)
        );
    }

    #[test]
    fn test_chain_lengths_checksum() {
        // An all-zero digest leaves every message digit 0, so the checksum
        // reaches its maximum len1*(w-1).
        let mut lengths = [0u32; XMSS_WOTS_LEN];
        WotsPlus::chain_lengths(&mut lengths, &[0u8; XMSS_N]);
        assert!(lengths[..XMSS_WOTS_LEN1].iter().all(|&l| l == 0));
        let csum = (XMSS_WOTS_LEN1 * (XMSS_WOTS_W - 1)) as u32;
        assert_eq!(lengths[XMSS_WOTS_LEN1], (csum >> 8) & 0xf);
        assert_eq!(lengths[XMSS_WOTS_LEN1 + 1], (csum >> 4) & 0xf);
        assert_eq!(lengths[XMSS_WOTS_LEN1 + 2], csum & 0xf);

        // An all-0xff digest drives every digit to w-1 and the checksum to 0.
        WotsPlus::chain_lengths(&mut lengths, &[0xffu8; XMSS_N]);
        assert!(lengths[..XMSS_WOTS_LEN1]
            .iter()
            .all(|&l| l == (XMSS_WOTS_W - 1) as u32));
        assert!(lengths[XMSS_WOTS_LEN1..].iter().all(|&l| l == 0));
    }
}
