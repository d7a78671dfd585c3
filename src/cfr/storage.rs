//! Storage for MCCFR regrets and strategies.
//!
//! Each information set owns its cumulative regrets, the current
//! regret-matched strategy and the reach-weighted strategy sum. The table is
//! a plain `FxHashMap` keyed by the game's compact key type; the solver is
//! single-threaded, so no locking is involved.

use rustc_hash::FxHashMap;

use crate::cfr::game::InfoKey;

/// Regret matching.
///
/// Writes a strategy proportional to the positive part of `regrets` into
/// `out`, or the uniform distribution if no regret is positive. The result is
/// always non-negative and sums to one.
pub fn regret_matching(regrets: &[f64], out: &mut [f64]) {
    debug_assert_eq!(regrets.len(), out.len());
    let n = regrets.len();
    if n == 0 {
        return;
    }

    let positive_sum: f64 = regrets.iter().map(|&r| r.max(0.0)).sum();
    if positive_sum > 0.0 && positive_sum.is_finite() {
        for (o, &r) in out.iter_mut().zip(regrets) {
            *o = r.max(0.0) / positive_sum;
        }
    } else {
        out.fill(1.0 / n as f64);
    }
}

/// Uniform distribution over `n` actions.
pub fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        Vec::new()
    } else {
        vec![1.0 / n as f64; n]
    }
}

/// Per-information-set learning state.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoSet {
    regrets: Vec<f64>,
    strategy: Vec<f64>,
    strategy_sum: Vec<f64>,
}

impl InfoSet {
    /// Fresh info set with `num_actions` actions and a uniform strategy.
    pub fn new(num_actions: usize) -> Self {
        Self {
            regrets: vec![0.0; num_actions],
            strategy: uniform(num_actions),
            strategy_sum: vec![0.0; num_actions],
        }
    }

    /// Number of actions.
    pub fn num_actions(&self) -> usize {
        self.strategy.len()
    }

    /// Cumulative regrets.
    pub fn regrets(&self) -> &[f64] {
        &self.regrets
    }

    /// Current regret-matched strategy.
    pub fn strategy(&self) -> &[f64] {
        &self.strategy
    }

    /// Cumulative reach-weighted strategy.
    pub fn strategy_sum(&self) -> &[f64] {
        &self.strategy_sum
    }

    /// Add regret deltas, optionally flooring the totals at zero.
    pub fn add_regrets(&mut self, deltas: &[f64], floor_at_zero: bool) {
        for (r, &d) in self.regrets.iter_mut().zip(deltas) {
            *r += d;
            if floor_at_zero && *r < 0.0 {
                *r = 0.0;
            }
        }
    }

    /// Recompute the current strategy from cumulative regrets.
    pub fn update_strategy(&mut self) {
        regret_matching(&self.regrets, &mut self.strategy);
    }

    /// Add `weight * strategy` to the strategy sum.
    pub fn accumulate_strategy(&mut self, weight: f64) {
        for (s, &p) in self.strategy_sum.iter_mut().zip(&self.strategy) {
            *s += weight * p;
        }
    }

    /// Normalized strategy sum, uniform if nothing has been accumulated.
    pub fn average_strategy(&self) -> Vec<f64> {
        let total: f64 = self.strategy_sum.iter().sum();
        if total > 0.0 && total.is_finite() {
            self.strategy_sum.iter().map(|&s| s / total).collect()
        } else {
            uniform(self.num_actions())
        }
    }

    /// Scale regrets and strategy sum (discounted CFR), then re-match.
    pub fn discount(&mut self, positive: f64, negative: f64, strategy: f64) {
        for r in &mut self.regrets {
            *r *= if *r > 0.0 { positive } else { negative };
        }
        for s in &mut self.strategy_sum {
            *s *= strategy;
        }
        self.update_strategy();
    }
}

/// Table of information sets keyed by a compact key.
#[derive(Debug, Clone)]
pub struct InfoSetTable<K: InfoKey> {
    sets: FxHashMap<K, InfoSet>,
}

impl<K: InfoKey> Default for InfoSetTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: InfoKey> InfoSetTable<K> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            sets: FxHashMap::default(),
        }
    }

    /// Look up an info set.
    pub fn get(&self, key: &K) -> Option<&InfoSet> {
        self.sets.get(key)
    }

    /// Get or lazily create the info set for `key`.
    ///
    /// An existing entry with a different action count is re-initialised.
    pub fn entry(&mut self, key: K, num_actions: usize) -> &mut InfoSet {
        let set = self
            .sets
            .entry(key)
            .or_insert_with(|| InfoSet::new(num_actions));
        if set.num_actions() != num_actions {
            log::debug!(
                "info set {:?} changed from {} to {} actions; resetting",
                key,
                set.num_actions(),
                num_actions
            );
            *set = InfoSet::new(num_actions);
        }
        set
    }

    /// Current strategy for `key`, uniform for unseen sets.
    pub fn current_strategy(&self, key: &K, num_actions: usize) -> Vec<f64> {
        match self.sets.get(key) {
            Some(set) if set.num_actions() == num_actions => set.strategy().to_vec(),
            _ => uniform(num_actions),
        }
    }

    /// Average strategy for `key`, uniform for unseen sets.
    pub fn average_strategy(&self, key: &K, num_actions: usize) -> Vec<f64> {
        match self.sets.get(key) {
            Some(set) if set.num_actions() == num_actions => set.average_strategy(),
            _ => uniform(num_actions),
        }
    }

    /// Apply a discount to every info set.
    pub fn discount(&mut self, positive: f64, negative: f64, strategy: f64) {
        for set in self.sets.values_mut() {
            set.discount(positive, negative, strategy);
        }
    }

    /// Number of info sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Iterate over all info sets.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &InfoSet)> {
        self.sets.iter()
    }

    /// Remove every info set.
    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_distribution(p: &[f64]) {
        assert!(p.iter().all(|&x| x >= 0.0 && x.is_finite()), "{:?}", p);
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum {} for {:?}", sum, p);
    }

    #[test]
    fn test_regret_matching_is_a_distribution() {
        let cases: [&[f64]; 6] = [
            &[0.0, 0.0, 0.0],
            &[-1.0, -5.0, -0.1],
            &[3.0, -2.0, 1.0],
            &[10.0],
            &[1e-300, 0.0],
            &[f64::MAX, f64::MAX],
        ];
        for regrets in cases {
            let mut out = vec![0.0; regrets.len()];
            regret_matching(regrets, &mut out);
            assert_distribution(&out);
        }
    }

    #[test]
    fn test_regret_matching_proportional() {
        let mut out = [0.0; 3];
        regret_matching(&[3.0, -2.0, 1.0], &mut out);
        assert!((out[0] - 0.75).abs() < 1e-12);
        assert_eq!(out[1], 0.0);
        assert!((out[2] - 0.25).abs() < 1e-12);

        regret_matching(&[-1.0, -1.0, -1.0], &mut out);
        assert!(out.iter().all(|&p| (p - 1.0 / 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_info_set_update_cycle() {
        let mut set = InfoSet::new(2);
        assert_eq!(set.strategy(), &[0.5, 0.5]);
        assert_eq!(set.average_strategy(), vec![0.5, 0.5]);

        set.add_regrets(&[2.0, -1.0], false);
        set.update_strategy();
        assert_eq!(set.strategy(), &[1.0, 0.0]);

        set.accumulate_strategy(0.5);
        assert_eq!(set.strategy_sum(), &[0.5, 0.0]);
        assert_eq!(set.average_strategy(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_cfr_plus_floor() {
        let mut set = InfoSet::new(2);
        set.add_regrets(&[-3.0, 1.0], true);
        assert_eq!(set.regrets(), &[0.0, 1.0]);
    }

    #[test]
    fn test_discount_scales_by_sign() {
        let mut set = InfoSet::new(2);
        set.add_regrets(&[4.0, -4.0], false);
        set.accumulate_strategy(1.0);
        set.discount(0.5, 0.25, 0.1);
        assert_eq!(set.regrets(), &[2.0, -1.0]);
        assert!((set.strategy_sum()[0] - 0.05).abs() < 1e-12);
        assert_eq!(set.strategy(), &[1.0, 0.0]);
    }

    #[test]
    fn test_table_entry_and_fallbacks() {
        let mut table: InfoSetTable<u32> = InfoSetTable::new();
        assert!(table.is_empty());
        assert_eq!(table.current_strategy(&7, 4), vec![0.25; 4]);

        table.entry(7, 2).add_regrets(&[1.0, 0.0], false);
        table.entry(7, 2).update_strategy();
        assert_eq!(table.current_strategy(&7, 2), vec![1.0, 0.0]);
        assert_eq!(table.len(), 1);

        // action count mismatch resets instead of panicking
        let set = table.entry(7, 3);
        assert_eq!(set.num_actions(), 3);
        assert_eq!(set.regrets(), &[0.0, 0.0, 0.0]);

        table.clear();
        assert!(table.get(&7).is_none());
    }
}
