use std::fmt;
use std::ops::RangeInclusive;

/// An inclusive interval of codepoints, `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub low: u32,
    pub high: u32,
}

impl Range {
    /// Create a new interval. `low` must not exceed `high`.
    pub fn new(low: u32, high: u32) -> Self {
        debug_assert!(low <= high, "range bounds out of order: {low} > {high}");
        Self { low, high }
    }

    /// Number of codepoints covered by the interval.
    pub fn len(&self) -> u64 {
        u64::from(self.high) - u64::from(self.low) + 1
    }

    pub fn contains(&self, code: u32) -> bool {
        self.low <= code && code <= self.high
    }

    /// True unless one interval ends strictly before the other begins.
    ///
    /// Example:
    /// - `[1,5]` and `[5,9]` overlap
    /// - `[1,5]` and `[6,9]` do not
    pub fn overlaps(&self, other: &Range) -> bool {
        !(self.high < other.low || self.low > other.high)
    }

    /// True when the intervals overlap or sit directly next to each other.
    ///
    /// Example:
    /// - `[1,5]` and `[6,9]` touch
    /// - `[1,5]` and `[7,9]` do not
    pub fn touches(&self, other: &Range) -> bool {
        !(self.high.saturating_add(1) < other.low || self.low.saturating_sub(1) > other.high)
    }

    /// Smallest interval covering both. Only meaningful when they touch.
    pub fn union(&self, other: &Range) -> Range {
        Range::new(self.low.min(other.low), self.high.max(other.high))
    }

    /// Remove `other` from this interval, leaving zero, one or two pieces.
    ///
    /// Example:
    /// - `[1,10] - [5,5]` → `[1,4]`, `[6,10]`
    /// - `[1,10] - [0,20]` → nothing
    /// - `[1,10] - [8,12]` → `[1,7]`
    pub fn subtract(&self, other: &Range) -> Vec<Range> {
        if other.low <= self.low && other.high >= self.high {
            return vec![];
        }
        if other.low > self.low && other.high < self.high {
            return vec![
                Range::new(self.low, other.low - 1),
                Range::new(other.high + 1, self.high),
            ];
        }
        if other.low <= self.low {
            vec![Range::new(other.high + 1, self.high)]
        } else {
            vec![Range::new(self.low, other.low - 1)]
        }
    }

    /// Every codepoint of the interval in ascending order.
    pub fn iter(&self) -> RangeInclusive<u32> {
        self.low..=self.high
    }
}

impl From<u32> for Range {
    fn from(code: u32) -> Self {
        Range::new(code, code)
    }
}

impl From<(u32, u32)> for Range {
    fn from((low, high): (u32, u32)) -> Self {
        Range::new(low, high)
    }
}

impl From<RangeInclusive<u32>> for Range {
    fn from(r: RangeInclusive<u32>) -> Self {
        Range::new(*r.start(), *r.end())
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}
