use crate::params::XMSS_N;
use crate::utils::u64_to_bytes;
use crate::wots_plus::adrs::Adrs;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

/// The four derived hash functions of the scheme, each keyed by the public
/// seed and domain-separated by a 32-byte [`Adrs`]:
///
/// * `PRF(PK.seed, ADRS, SK.seed) = SHAKE256(PK.seed || ADRS || SK.seed, 8n)`
/// * `F(PK.seed, ADRS, M1) = SHAKE256(PK.seed || ADRS || M1, 8n)`
/// * `H(PK.seed, ADRS, M1 || M2) = SHAKE256(PK.seed || ADRS || M1 || M2, 8n)`
/// * `T_l(PK.seed, ADRS, M) = SHAKE256(PK.seed || ADRS || M, 8n)`
///
/// plus the message compression
/// `H_msg(PK.seed, root, idx, M) = SHAKE256(PK.seed || root || idx || M, 8n)`,
/// whose randomizers (public seed and leaf index) are both recomputable by
/// a verifier from the public key and the signature.
#[derive(Clone, Debug)]
pub(crate) struct XmssHasher {
    pub pub_seed: [u8; XMSS_N],
}

impl XmssHasher {
    pub(crate) fn new(pub_seed: [u8; XMSS_N]) -> Self {
        Self { pub_seed }
    }

    fn keyed(&self, output: &mut [u8], adrs: &Adrs, parts: &[&[u8]]) {
        let mut hasher = Shake256::default();
        hasher.update(self.pub_seed.as_ref());
        hasher.update(adrs.as_ref());
        for part in parts {
            hasher.update(part);
        }
        let mut reader = hasher.finalize_xof();
        reader.read(output[..XMSS_N].as_mut());
    }

    /// PRF used to derive each WOTS+ chain start from the secret seed.
    pub fn prf(&self, output: &mut [u8], sk_seed: &[u8], adrs: &Adrs) {
        self.keyed(output, adrs, &[sk_seed[..XMSS_N].as_ref()]);
    }

    /// Chain step F.
    pub fn f(&self, output: &mut [u8], input: &[u8], adrs: &Adrs) {
        self.keyed(output, adrs, &[input[..XMSS_N].as_ref()]);
    }

    /// Applies [`Self::f`], but modifies the given input in place.
    pub fn f_inplace(&self, inout: &mut [u8], adrs: &Adrs) {
        let mut hasher = Shake256::default();
        hasher.update(self.pub_seed.as_ref());
        hasher.update(adrs.as_ref());
        hasher.update(inout[..XMSS_N].as_ref());
        let mut reader = hasher.finalize_xof();
        reader.read(inout[..XMSS_N].as_mut());
    }

    /// Compresses two sibling tree nodes into their parent.
    pub fn h(&self, output: &mut [u8], left: &[u8], right: &[u8], adrs: &Adrs) {
        self.keyed(
            output,
            adrs,
            &[left[..XMSS_N].as_ref(), right[..XMSS_N].as_ref()],
        );
    }

    /// Compresses the `in_blocks` concatenated chain ends of a WOTS+
    /// public key into a single leaf value.
    pub fn t_l(&self, output: &mut [u8], input: &[u8], in_blocks: usize, adrs: &Adrs) {
        self.keyed(output, adrs, &[input[..in_blocks * XMSS_N].as_ref()]);
    }

    /// Randomized message compression. The digest a signature actually
    /// covers, bound to the leaf index that produced it.
    pub fn h_msg(&self, output: &mut [u8], root: &[u8], idx: u64, m: &[u8]) {
        let mut hasher = Shake256::default();
        hasher.update(self.pub_seed.as_ref());
        hasher.update(root[..XMSS_N].as_ref());
        hasher.update(u64_to_bytes(idx).as_ref());
        hasher.update(m);
        let mut reader = hasher.finalize_xof();
        reader.read(output[..XMSS_N].as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wots_plus::adrs::AdrsType;

    #[test]
    fn test_domain_separation() {
        let hasher = XmssHasher::new([7u8; XMSS_N]);
        let input = [42u8; XMSS_N];

        let mut adrs = Adrs::from(AdrsType::WotsHash);
        let mut out_a = [0u8; XMSS_N];
        hasher.f(&mut out_a, &input, &adrs);

        // Any ADRS field change must change the digest.
        adrs.set_chain_addr(1);
        let mut out_b = [0u8; XMSS_N];
        hasher.f(&mut out_b, &input, &adrs);
        assert_ne!(out_a, out_b);

        // A different type with otherwise identical fields must too.
        let adrs_prf = Adrs::from(AdrsType::WotsPrf);
        let mut out_c = [0u8; XMSS_N];
        hasher.f(&mut out_c, &input, &adrs_prf);
        assert_ne!(out_a, out_c);
    }

    #[test]
    fn test_f_inplace_matches_f() {
        let hasher = XmssHasher::new([1u8; XMSS_N]);
        let adrs = Adrs::from(AdrsType::WotsHash);
        let input = [9u8; XMSS_N];

        let mut out = [0u8; XMSS_N];
        hasher.f(&mut out, &input, &adrs);

        let mut inout = input;
        hasher.f_inplace(&mut inout, &adrs);
        assert_eq!(out, inout);
    }

    #[test]
    fn test_h_msg_binds_index() {
        let hasher = XmssHasher::new([3u8; XMSS_N]);
        let root = [5u8; XMSS_N];

        let mut d0 = [0u8; XMSS_N];
        let mut d1 = [0u8; XMSS_N];
        hasher.h_msg(&mut d0, &root, 0, b"message");
        hasher.h_msg(&mut d1, &root, 1, b"message");
        assert_ne!(d0, d1);
    }
}
