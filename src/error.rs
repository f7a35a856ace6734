use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid parameters: height {h} is not a positive multiple of layer count {d}, or exceeds the supported range")]
    InvalidParameters { h: u32, d: u32 },
    #[error("All one-time signing indices of this key have been consumed")]
    Exhausted,
    #[error("Invalid length: expected {0} bytes, found {1} bytes")]
    BadLength(usize, usize),
}

pub type Result<T> = core::result::Result<T, Error>;
