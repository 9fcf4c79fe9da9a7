use core::fmt::Debug;
use std::fmt::Display;

use crate::{HpoError, HpoResult};

/// The number of digits of the numerical part of an `HpoTermId`
const ID_DIGITS: usize = 7;

/// The unique identifier of an [`HpoTerm`](`crate::HpoTerm`)
///
/// The textual form is always `HP:` followed by exactly 7 digits,
/// e.g. `HP:0000118`. Internally the id is stored as `u32`.
///
/// # Examples
///
/// ```
/// use phenorank::HpoTermId;
///
/// let id = HpoTermId::try_from("HP:0000118").unwrap();
/// assert_eq!(id.as_u32(), 118u32);
/// assert_eq!(id.to_string(), "HP:0000118");
///
/// assert!(HpoTermId::try_from("HP:118").is_err());
/// assert!(HpoTermId::try_from("HP0000118").is_err());
/// ```
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HpoTermId {
    inner: u32,
}

impl HpoTermId {
    /// Constructs a new `HpoTermId` from its numerical part
    pub const fn from_u32(inner: u32) -> Self {
        Self { inner }
    }

    /// Returns the numerical part of the id
    pub fn as_u32(&self) -> u32 {
        self.inner
    }

    /// Returns `true` if `s` has the form `HP:` followed by 7 digits
    ///
    /// ```
    /// use phenorank::HpoTermId;
    ///
    /// assert!(HpoTermId::is_valid_format("HP:0001250"));
    /// assert!(!HpoTermId::is_valid_format("HP:00012500"));
    /// assert!(!HpoTermId::is_valid_format("HP:000125a"));
    /// ```
    pub fn is_valid_format(s: &str) -> bool {
        match s.strip_prefix("HP:") {
            Some(digits) => digits.len() == ID_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

impl TryFrom<&str> for HpoTermId {
    type Error = HpoError;
    fn try_from(s: &str) -> HpoResult<Self> {
        if !Self::is_valid_format(s) {
            return Err(HpoError::InvalidInput(format!("Illegal phenotype form: {s}")));
        }
        Ok(HpoTermId {
            inner: s[3..].parse::<u32>()?,
        })
    }
}

impl From<u32> for HpoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpoTermId({self})")
    }
}

impl Display for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.inner)
    }
}

impl PartialEq<str> for HpoTermId {
    fn eq(&self, other: &str) -> bool {
        HpoTermId::try_from(other).map_or(false, |other| self == &other)
    }
}
