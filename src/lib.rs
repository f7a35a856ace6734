mod error;
mod hash;
mod utils;

pub mod merkle;
pub mod params;
pub mod wots_plus;
pub mod xmss;

pub use crate::error::{Error, Result};
pub use crate::xmss::{generate_seed, verify, PrivateKey, PublicKey, Seed, Signature};
