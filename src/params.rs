//! Fixed XMSS-MT parameter set.
//!
//! The crate implements a single (n, w) configuration over SHAKE256. The
//! total tree height `h` and the number of layers `d` are runtime inputs
//! to key generation; everything here is decided at compile time.

/// Hash output length in bytes.
pub const XMSS_N: usize = 32;

/// Winternitz parameter.
pub const XMSS_WOTS_W: usize = 16;

/* WOTS parameters. */
pub const XMSS_WOTS_LOGW: usize = 4;
pub const XMSS_WOTS_LEN1: usize = 8 * XMSS_N / XMSS_WOTS_LOGW;
pub const XMSS_WOTS_LEN2: usize = 3;

pub const XMSS_WOTS_LEN: usize = XMSS_WOTS_LEN1 + XMSS_WOTS_LEN2;
pub const XMSS_WOTS_BYTES: usize = XMSS_WOTS_LEN * XMSS_N;

/// Byte width of the big-endian checksum field fed back into `base_w`.
pub const XMSS_WOTS_LEN2_BYTES: usize = (XMSS_WOTS_LEN2 * XMSS_WOTS_LOGW + 7) / 8;

/* For clarity */
pub const XMSS_ADDR_BYTES: usize = 32;

/// Seed byte size: sk_seed || pub_seed, each `XMSS_N` bytes.
pub const SEED_BYTES: usize = 2 * XMSS_N;

/// Upper bound on the total tree height so that `2^h` signing slots fit
/// in a `u64` index.
pub const XMSS_MAX_HEIGHT: u32 = 63;

/// Upper bound on the per-layer tree height so that a leaf position fits
/// the 4-byte ADRS key-pair word.
pub const XMSS_MAX_TREE_HEIGHT: u32 = 32;

/// Public-key byte size: root || pub_seed.
pub const XMSS_PK_BYTES: usize = 2 * XMSS_N;

/// Byte width of the leaf index prefixed to every signature.
pub const XMSS_INDEX_BYTES: usize = 8;

/// Byte size of a signature for total height `h` split into `d` layers:
/// the index prefix followed by one WOTS+ signature and one
/// authentication path per layer.
pub const fn signature_bytes(h: u32, d: u32) -> usize {
    XMSS_INDEX_BYTES + d as usize * (XMSS_WOTS_BYTES + (h / d) as usize * XMSS_N)
}
