use proptest::prelude::*;

use pollguard_types::{RecordHash, Timestamp, VoterId};

proptest! {
    /// RecordHash roundtrip: new -> as_bytes produces identical bytes.
    #[test]
    fn record_hash_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = RecordHash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// RecordHash::is_zero is true only for all-zero bytes.
    #[test]
    fn record_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = RecordHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// RecordHash bincode serialization roundtrip.
    #[test]
    fn record_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = RecordHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: RecordHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.as_bytes(), hash.as_bytes());
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Timestamp elapsed_since: elapsed_since(now) = now - self (saturating).
    #[test]
    fn timestamp_elapsed_since(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let now = Timestamp::new(base + offset);
        prop_assert_eq!(t.elapsed_since(now), offset);
    }

    /// Timestamp elapsed_since saturates to 0 when now < self.
    #[test]
    fn timestamp_elapsed_since_saturates(
        base in 1u64..1_000_000,
        deficit in 1u64..1_000_000,
    ) {
        let later = Timestamp::new(base + deficit);
        let earlier = Timestamp::new(base);
        prop_assert_eq!(later.elapsed_since(earlier), 0);
    }

    /// Timestamp has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired_correct(
        start in 0u64..500_000,
        duration in 1u64..500_000,
        offset in 0u64..1_000_000,
    ) {
        let t = Timestamp::new(start);
        let now = Timestamp::new(start.saturating_add(offset));
        prop_assert_eq!(t.has_expired(duration, now), offset >= duration);
    }

    /// hour_of_day always lands in [0, 24).
    #[test]
    fn timestamp_hour_of_day_in_range(secs in 0u64..u64::MAX) {
        let hour = Timestamp::new(secs).hour_of_day();
        prop_assert!((0.0..24.0).contains(&hour));
    }

    /// sub_secs never underflows and inverts elapsed_since.
    #[test]
    fn timestamp_sub_secs_saturates(base in 0u64..1_000_000, delta in 0u64..2_000_000) {
        let t = Timestamp::new(base);
        let earlier = t.sub_secs(delta);
        prop_assert_eq!(earlier.as_secs(), base.saturating_sub(delta));
        prop_assert!(earlier <= t);
    }

    /// A voter id is valid iff it contains any non-whitespace character.
    #[test]
    fn voter_id_validity(s in "[ a-zA-Z0-9-]{0,12}") {
        let id = VoterId::new(s.clone());
        prop_assert_eq!(id.is_valid(), !s.trim().is_empty());
        prop_assert_eq!(id.as_str(), s.as_str());
    }
}
