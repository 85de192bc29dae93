//! Mapping from payload size to one of the thirteen segregated free lists.
//!
//! Classes 0 through 3 are exact-fit: every block on one of those lists has
//! exactly the class's declared payload, so a hit is always usable without
//! splitting. Classes 4 through 11 are range-fit buckets of widening
//! payload ranges. Class 12 ("N") is the catch-all for anything above the
//! largest range-fit bucket, and also the fallback every other class probes
//! when its own list comes up empty.

use super::block::{ALIGN, MIN_PAYLOAD};

/// Number of segregated free lists.
pub const NUM_CLASSES: usize = 13;

/// Index of the catch-all variable-size class.
pub const N_CLASS: usize = 12;

/// `true` for the four classes whose members all share exactly one payload
/// size.
pub const fn is_exact_fit(class: usize) -> bool {
    class < 4
}

/// Round a requested payload up to the allocator's minimum and alignment.
pub const fn round_payload(requested: usize) -> usize {
    let at_least_min = if requested < MIN_PAYLOAD {
        MIN_PAYLOAD
    } else {
        requested
    };
    (at_least_min + ALIGN - 1) & !(ALIGN - 1)
}

/// Classify an (already rounded) payload size into one of the 13 lists.
pub const fn class_of(payload: usize) -> usize {
    match payload {
        8 => 0,
        16 => 1,
        24 => 2,
        32 => 3,
        33..=56 => 4,
        57..=80 => 5,
        81..=104 => 6,
        105..=300 => 7,
        301..=500 => 8,
        501..=700 => 9,
        701..=900 => 10,
        901..=1100 => 11,
        _ => N_CLASS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fit_classes_match_the_table() {
        assert_eq!(class_of(8), 0);
        assert_eq!(class_of(16), 1);
        assert_eq!(class_of(24), 2);
        assert_eq!(class_of(32), 3);
        assert!(is_exact_fit(0) && is_exact_fit(3));
        assert!(!is_exact_fit(4));
    }

    #[test]
    fn range_fit_boundaries_are_inclusive() {
        assert_eq!(class_of(33), 4);
        assert_eq!(class_of(56), 4);
        assert_eq!(class_of(57), 5);
        assert_eq!(class_of(1100), 11);
        assert_eq!(class_of(1101), N_CLASS);
    }

    #[test]
    fn round_payload_respects_minimum_and_alignment() {
        assert_eq!(round_payload(0), 8);
        assert_eq!(round_payload(1), 8);
        assert_eq!(round_payload(9), 16);
        assert_eq!(round_payload(32), 32);
        assert_eq!(round_payload(33), 40);
    }
}
