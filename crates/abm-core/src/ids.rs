//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Unlike dense storage indices these
//! are *external* identifiers (a tour id comes from the tour table), so the
//! inner integer is exposed but never assumed contiguous.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// The raw identifier widened to `u64` (used for RNG keying).
            #[inline(always)]
            pub fn raw(self) -> u64 {
                self.0 as u64
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// A synthetic person: the usual scheduling unit for tour windows.
    pub struct PersonId(u32);
}

typed_id! {
    /// A tour: one chooser row in a scheduling round.
    pub struct TourId(u32);
}

typed_id! {
    /// A time-of-day alternative (start/end/duration triple) in the `tdd` table.
    pub struct TddAltId(u32);
}

typed_id! {
    /// Application-defined tour purpose, used to segment probability models.
    /// `u16` keeps tour tables compact (max 65,535 purposes).
    pub struct PurposeId(u16);
}
