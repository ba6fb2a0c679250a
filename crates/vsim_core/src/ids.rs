//! Newtypes for people identity plus the monotonic id and name generators.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

macro_rules! def_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self { Self(raw) }
            #[inline]
            pub const fn raw(self) -> u32 { self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix($prefix).unwrap_or(s);
                digits
                    .parse::<u32>()
                    .map(Self)
                    .map_err(|_| CoreError::DomainOutOfRange(concat!(stringify!($name), ": not a number")))
            }
        }
    };
}

def_id!(CandidateId, "C");
def_id!(ElectorId, "E");

/// Monotonically increasing counter handing out raw ids starting at 0.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn next_raw(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    pub fn next_candidate(&mut self) -> CandidateId {
        CandidateId(self.next_raw())
    }

    pub fn next_elector(&mut self) -> ElectorId {
        ElectorId(self.next_raw())
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chloe", "Dimitri", "Elena", "Farid", "Greta", "Hugo",
    "Ines", "Jonas", "Kira", "Louis", "Maya", "Nils", "Olga", "Pablo",
];

const LAST_NAMES: &[&str] = &[
    "Martin", "Bernard", "Dubois", "Moreau", "Laurent", "Simon", "Michel", "Lefevre",
    "Garcia", "Roux", "Fournier", "Girard",
];

/// Deterministic display names for generated candidates.
///
/// Walks first names fastest, then last names; once every pair has been used
/// the last name gains a numeric suffix.
#[derive(Clone, Debug, Default)]
pub struct NameGenerator {
    counter: usize,
}

impl NameGenerator {
    pub fn next_name(&mut self) -> (String, String) {
        let n = self.counter;
        self.counter += 1;

        let first = FIRST_NAMES[n % FIRST_NAMES.len()];
        let pairs = FIRST_NAMES.len() * LAST_NAMES.len();
        let last = LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()];
        let cycle = n / pairs;
        let last = if cycle == 0 { last.to_string() } else { format!("{last}-{}", cycle + 1) };
        (first.to_string(), last)
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
