use std::{error, fmt};

use hash_source::HashSource;
use rand::random;

/// The trailing-zero search in `add` walks a 32-bit tail (`HashSource`
/// yields a `u32`), so no row can usefully be longer than this.
pub const MAX_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct Config<H> {
    pub(crate) nmap: usize,
    pub(crate) length: usize,
    pub(crate) r: f64,
    pub(crate) hash: H,
    seed: u64,
}

impl<H> Config<H>
where
    H: HashSource,
{
    /// `seed` drives the one-time bit perturbation performed at construction
    /// when `r > 0`; pass `None` to draw a fresh one from the process RNG.
    pub fn new(hash: H, nmap: usize, length: usize, r: f64, seed: Option<u64>) -> Result<Self, ConfigError> {
        if nmap < 1 {
            return Err(ConfigError::InvalidParameter("nmap must be at least 1"));
        }
        if length < 1 {
            return Err(ConfigError::InvalidParameter("length must be at least 1"));
        }
        if length > MAX_LENGTH {
            return Err(ConfigError::InvalidParameter(
                "length must not exceed 32 (the hash source yields 32 bits)",
            ));
        }
        if !(0.0..=1.0).contains(&r) {
            return Err(ConfigError::InvalidParameter("r must lie within [0, 1]"));
        }

        Ok(Self {
            nmap,
            length,
            r,
            hash,
            seed: seed.unwrap_or_else(random),
        })
    }

    pub fn nmap(&self) -> usize {
        self.nmap
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn hash(&self) -> &H {
        &self.hash
    }

    pub(crate) fn seed(&self) -> u64 {
        self.seed
    }
}

impl<H> PartialEq for Config<H>
where
    H: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.nmap == other.nmap && self.length == other.length && self.hash == other.hash
    }
}

impl<H> Eq for Config<H> where H: Eq {}

#[derive(Clone, Debug)]
pub enum ConfigError {
    InvalidParameter(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl error::Error for ConfigError {}
