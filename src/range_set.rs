use std::fmt;

use crate::range::Range;

/// A set of codepoints stored as sorted, disjoint, non-adjacent intervals.
///
/// The set can also be read as a dense virtual array of its members in
/// ascending order, see [`RangeSet::index`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<Range>,
    length: u64,
}

impl RangeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single interval.
    pub fn from_range(range: impl Into<Range>) -> Self {
        let mut set = Self::new();
        set.add(range);
        set
    }

    /// Number of codepoints in the set.
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Add an interval, merging every existing interval it touches.
    ///
    /// Example:
    /// - `[ 5-6, 8 ]` + `7` → `[ 5-8 ]`
    pub fn add(&mut self, range: impl Into<Range>) -> &mut Self {
        let mut merged = range.into();
        let start = self
            .ranges
            .iter()
            .position(|r| merged.touches(r))
            .unwrap_or(self.ranges.len());
        let insert_at = if start == self.ranges.len() {
            // No touching interval: keep the list sorted by `low`.
            self.ranges
                .iter()
                .position(|r| r.low > merged.high)
                .unwrap_or(self.ranges.len())
        } else {
            start
        };
        let mut end = insert_at;
        while end < self.ranges.len() && merged.touches(&self.ranges[end]) {
            merged = merged.union(&self.ranges[end]);
            end += 1;
        }
        self.ranges.splice(insert_at..end, [merged]);
        self.update_length();
        self
    }

    pub fn add_set(&mut self, other: &RangeSet) -> &mut Self {
        for range in &other.ranges {
            self.add(*range);
        }
        self
    }

    /// Remove an interval; intervals it cuts through may split in two.
    ///
    /// Example:
    /// - `[ 1-10 ]` - `5` → `[ 1-4, 6-10 ]`
    pub fn subtract(&mut self, range: impl Into<Range>) -> &mut Self {
        let cut = range.into();
        let mut next = Vec::with_capacity(self.ranges.len() + 1);
        for range in &self.ranges {
            if cut.overlaps(range) {
                next.extend(range.subtract(&cut));
            } else {
                next.push(*range);
            }
        }
        self.ranges = next;
        self.update_length();
        self
    }

    pub fn subtract_set(&mut self, other: &RangeSet) -> &mut Self {
        for range in &other.ranges {
            self.subtract(*range);
        }
        self
    }

    /// Keep only the codepoints that also fall inside `range`.
    pub fn intersect(&mut self, range: impl Into<Range>) -> &mut Self {
        let mut next = Vec::new();
        self.intersect_into(&range.into(), &mut next);
        self.ranges = next;
        self.update_length();
        self
    }

    /// Keep only the codepoints that are also members of `other`.
    pub fn intersect_set(&mut self, other: &RangeSet) -> &mut Self {
        let mut next = Vec::new();
        for range in &other.ranges {
            self.intersect_into(range, &mut next);
        }
        self.ranges = next;
        self.update_length();
        self
    }

    /// Look up the `i`-th member codepoint in ascending order.
    ///
    /// Returns `None` when `i` is not below [`RangeSet::len`].
    ///
    /// Example:
    /// - `[ 1-3, 10 ]`, index 3 → `Some(10)`
    pub fn index(&self, mut i: u64) -> Option<u32> {
        for range in &self.ranges {
            if i < range.len() {
                // `i` fits inside this interval, so the sum stays in u32.
                return Some(range.low + i as u32);
            }
            i -= range.len();
        }
        None
    }

    pub fn contains(&self, code: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(code))
    }

    /// Every member codepoint in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(Range::iter)
    }

    fn intersect_into(&self, with: &Range, out: &mut Vec<Range>) {
        out.extend(
            self.ranges
                .iter()
                .filter(|r| with.overlaps(r))
                .map(|r| Range::new(r.low.max(with.low), r.high.min(with.high))),
        );
    }

    fn update_length(&mut self) {
        self.length = self.ranges.iter().map(Range::len).sum();
    }
}

impl From<Range> for RangeSet {
    fn from(range: Range) -> Self {
        RangeSet::from_range(range)
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(Range::to_string).collect();
        write!(f, "[ {} ]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set_of(ranges: &[(u32, u32)]) -> RangeSet {
        let mut set = RangeSet::new();
        for r in ranges {
            set.add(*r);
        }
        set
    }

    #[test]
    fn test_add_merges_adjacent() {
        let mut set = RangeSet::new();
        set.add(5).add(6).add(8).add(7);
        assert_eq!(set.to_string(), "[ 5-8 ]");
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_add_keeps_order() {
        let mut set = RangeSet::new();
        set.add((10, 12)).add(1).add((5, 6));
        assert_eq!(set.to_string(), "[ 1, 5-6, 10-12 ]");
        set.add((2, 9));
        assert_eq!(set.to_string(), "[ 1-12 ]");
        assert_eq!(set.len(), 12);
    }

    #[test]
    fn test_add_set() {
        let mut set = set_of(&[(1, 3)]);
        set.add_set(&set_of(&[(4, 4), (8, 9)]));
        assert_eq!(set.to_string(), "[ 1-4, 8-9 ]");
    }

    #[test]
    fn test_subtract_splits() {
        let mut set = RangeSet::from_range((1, 10));
        set.subtract(5);
        assert_eq!(set.to_string(), "[ 1-4, 6-10 ]");
        assert_eq!(set.len(), 9);
    }

    #[test]
    fn test_subtract_across_intervals() {
        let mut set = set_of(&[(1, 5), (10, 15), (20, 25)]);
        set.subtract((4, 21));
        assert_eq!(set.to_string(), "[ 1-3, 22-25 ]");
        set.subtract_set(&set_of(&[(1, 1), (25, 30)]));
        assert_eq!(set.to_string(), "[ 2-3, 22-24 ]");
    }

    #[test]
    fn test_intersect() {
        let mut set = set_of(&[(1, 5), (10, 15)]);
        set.intersect((4, 11));
        assert_eq!(set.to_string(), "[ 4-5, 10-11 ]");
        assert_eq!(set.len(), 4);

        let mut set = RangeSet::from_range((32, 126));
        set.intersect_set(&set_of(&[(0, 40), (100, 200)]));
        assert_eq!(set.to_string(), "[ 32-40, 100-126 ]");
    }

    #[test]
    fn test_empty_display() {
        let mut set = RangeSet::from_range((1, 3));
        set.intersect(10);
        assert_eq!(set.to_string(), "[  ]");
        assert!(set.is_empty());
    }

    #[test]
    fn test_index() {
        let set = set_of(&[(1, 3), (10, 10), (20, 21)]);
        assert_eq!(set.index(0), Some(1));
        assert_eq!(set.index(2), Some(3));
        assert_eq!(set.index(3), Some(10));
        assert_eq!(set.index(5), Some(21));
        assert_eq!(set.index(6), None);
    }

    fn ranges_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
        proptest::collection::vec((0u32..200, 0u32..20), 0..8)
            .prop_map(|v| v.into_iter().map(|(low, span)| (low, low + span)).collect())
    }

    fn assert_normalized(set: &RangeSet) {
        for pair in set.ranges().windows(2) {
            assert!(pair[0].high + 1 < pair[1].low, "{set} is not normalized");
        }
        let sum: u64 = set.ranges().iter().map(Range::len).sum();
        assert_eq!(set.len(), sum);
    }

    proptest! {
        #[test]
        fn prop_operations_stay_normalized(a in ranges_strategy(), b in ranges_strategy()) {
            let base = set_of(&a);
            let other = set_of(&b);
            assert_normalized(&base);

            let mut added = base.clone();
            added.add_set(&other);
            assert_normalized(&added);

            let mut subtracted = base.clone();
            subtracted.subtract_set(&other);
            assert_normalized(&subtracted);

            let mut intersected = base.clone();
            intersected.intersect_set(&other);
            assert_normalized(&intersected);
        }

        #[test]
        fn prop_operations_are_idempotent(a in ranges_strategy(), low in 0u32..220, span in 0u32..30) {
            let base = set_of(&a);
            let range = (low, low + span);

            let mut once = base.clone();
            once.add(range);
            let mut twice = once.clone();
            twice.add(range);
            prop_assert_eq!(&once, &twice);

            let mut once = base.clone();
            once.subtract(range);
            let mut twice = once.clone();
            twice.subtract(range);
            prop_assert_eq!(&once, &twice);

            let mut once = base.clone();
            once.intersect(range);
            let mut twice = once.clone();
            twice.intersect(range);
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn prop_add_then_subtract_restores_length(a in ranges_strategy(), low in 0u32..220, span in 0u32..30) {
            let range = Range::new(low, low + span);
            let mut base = set_of(&a);
            base.subtract(range);

            let mut set = base.clone();
            set.add(range).subtract(range);
            prop_assert_eq!(set.len(), base.len());
        }

        #[test]
        fn prop_index_enumerates_members(a in ranges_strategy()) {
            let set = set_of(&a);
            let indexed: Vec<u32> = (0..set.len()).filter_map(|i| set.index(i)).collect();
            let mut expected: Vec<u32> = a.iter().flat_map(|&(l, h)| l..=h).collect();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(&indexed, &expected);
            prop_assert_eq!(set.iter().collect::<Vec<_>>(), expected);
            prop_assert_eq!(set.index(set.len()), None);
        }
    }
}
