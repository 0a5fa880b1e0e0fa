use super::*;

use smallvec::SmallVec;

/// One way of slitting a jumbo: the number of pieces of each unique width.
///
/// Entry `i` counts pieces of the `i`th width of the [`Instance`] the pattern was built for. All
/// patterns of a run share that ordering.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern {
    counts: SmallVec<[u32; 8]>,
}

impl Pattern {
    /// A pattern with no pieces.
    pub fn zeros(len: usize) -> Self {
        Self {
            counts: SmallVec::from_elem(0, len),
        }
    }

    /// Create a pattern from per-width counts.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            counts: counts.into_iter().collect(),
        }
    }

    /// Per-width counts.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Number of unique widths this pattern is indexed by.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns whether the pattern has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of pieces, which is the number of knives the pattern needs.
    pub fn knives(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Jumbo length taken up by the pieces of this pattern.
    pub fn used_length(&self, widths: &[u32]) -> u64 {
        self.counts
            .iter()
            .zip(widths)
            .map(|(&count, &width)| count as u64 * width as u64)
            .sum()
    }

    pub(crate) fn counts_mut(&mut self) -> &mut [u32] {
        &mut self.counts
    }
}

/// The width ordering, aligned demand and limits for one run.
///
/// Unique widths are sorted ascending. Every [`Pattern`] used by generators and solvers in a run
/// is indexed by this ordering.
#[derive(Clone, Debug)]
pub struct Instance {
    widths: Vec<u32>,
    demand: Vec<u32>,
    raw_widths: Vec<u32>,
    limits: SetupLimits,
}

impl Instance {
    /// Derive the width ordering from a demand. Fails if there is nothing to cut, a width is zero,
    /// or the jumbo has no length.
    pub fn new(demand: &Demand) -> Result<Self> {
        let limits = demand.limits();
        if limits.max_jumbo_length == 0 {
            return Err(Error::InvalidDemand(
                "max jumbo length must be positive".to_string(),
            ));
        }
        if demand.rows().is_empty() {
            return Err(Error::InvalidDemand("no widths to cut".to_string()));
        }
        if let Some(row) = demand.rows().iter().find(|row| row.width == 0) {
            return Err(Error::InvalidDemand(format!(
                "width must be positive (quantity {})",
                row.quantity
            )));
        }

        let mut unique: Vec<(u32, u32)> = demand.unique_demand().into_iter().collect();
        unique.sort_unstable_by_key(|&(width, _)| width);
        let (widths, demand_vec) = unique.into_iter().unzip();

        Ok(Self {
            widths,
            demand: demand_vec,
            raw_widths: demand.raw_widths(),
            limits,
        })
    }

    /// Number of unique widths, which is the length of every pattern.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Returns whether there are no widths.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Unique widths in ascending order.
    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    /// Required quantity for each unique width.
    pub fn demand(&self) -> &[u32] {
        &self.demand
    }

    /// One width per demand row, in the order the rows were added.
    pub fn raw_widths(&self) -> &[u32] {
        &self.raw_widths
    }

    /// Setup limits.
    pub fn limits(&self) -> SetupLimits {
        self.limits
    }

    /// Usable width of the jumbo.
    pub fn max_jumbo_length(&self) -> u32 {
        self.limits.max_jumbo_length
    }

    /// Maximum number of pieces in a pattern.
    pub fn max_knives(&self) -> u32 {
        self.limits.max_knives
    }

    /// Position of a width in the ordering.
    pub fn index_of(&self, width: u32) -> Option<usize> {
        self.widths.binary_search(&width).ok()
    }

    /// Count a list of accepted widths into a pattern. Widths that aren't part of the instance
    /// are ignored.
    pub fn pattern_from_widths<I>(&self, widths: I) -> Pattern
    where
        I: IntoIterator<Item = u32>,
    {
        let mut pattern = Pattern::zeros(self.len());
        for width in widths {
            if let Some(i) = self.index_of(width) {
                pattern.counts[i] += 1;
            }
        }
        pattern
    }

    /// Jumbo length taken up by a pattern.
    pub fn used_length(&self, pattern: &Pattern) -> u64 {
        pattern.used_length(&self.widths)
    }

    /// Unused jumbo length of a feasible pattern. Saturates at zero for overfull patterns.
    pub fn waste(&self, pattern: &Pattern) -> u32 {
        (self.limits.max_jumbo_length as u64).saturating_sub(self.used_length(pattern)) as u32
    }

    /// Returns whether a pattern fits this instance: right length, within the jumbo, and within
    /// the knife limit.
    pub fn is_feasible(&self, pattern: &Pattern) -> bool {
        pattern.len() == self.len()
            && self.used_length(pattern) <= self.limits.max_jumbo_length as u64
            && pattern.knives() <= self.limits.max_knives
    }
}
