//! Resource pools of interchangeable units.
//!
//! Each pool tracks one next-free instant per unit. Callers only ask for the
//! earliest free instant and commit intervals; which unit gets claimed is the
//! pool's business.

use std::collections::BTreeMap;

use crate::models::{CapacityConfig, ResourceType};

/// Tolerance (hours) when deciding that a unit is free at a given instant.
pub const TIME_EPSILON_HOURS: f64 = 1e-5;

/// One resource type's units.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePool {
    next_free: Vec<f64>,
}

impl ResourcePool {
    /// Creates a pool with `units` units, all free from t=0.
    pub fn new(units: u32) -> Self {
        Self {
            next_free: vec![0.0; units as usize],
        }
    }

    /// Number of units.
    pub fn units(&self) -> usize {
        self.next_free.len()
    }

    /// Earliest instant any unit is free; `None` for an empty pool.
    pub fn earliest_free(&self) -> Option<f64> {
        self.next_free.iter().copied().reduce(f64::min)
    }

    /// Claims a unit for `[start, end)` and returns its index.
    ///
    /// The first unit already free at `start` (within [`TIME_EPSILON_HOURS`])
    /// is claimed; otherwise the unit that frees up first. `None` for an
    /// empty pool.
    pub fn commit(&mut self, start: f64, end: f64) -> Option<usize> {
        let unit = self
            .next_free
            .iter()
            .position(|&t| t <= start + TIME_EPSILON_HOURS)
            .or_else(|| self.argmin())?;
        self.next_free[unit] = end;
        Some(unit)
    }

    /// Moves every unit's next-free instant forward to at least `t`.
    pub(crate) fn advance_to(&mut self, t: f64) {
        for next in &mut self.next_free {
            *next = next.max(t);
        }
    }

    fn argmin(&self) -> Option<usize> {
        self.next_free
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}

/// All pools of one schedule run, built from a capacity configuration.
///
/// Types absent from the configuration get the default unit count.
#[derive(Debug, Clone)]
pub struct ResourcePools {
    pools: BTreeMap<ResourceType, ResourcePool>,
}

impl ResourcePools {
    /// Builds one pool per resource type.
    pub fn from_capacity(capacity: &CapacityConfig) -> Self {
        let pools = ResourceType::ALL
            .iter()
            .map(|&rt| (rt, ResourcePool::new(capacity.units(rt))))
            .collect();
        Self { pools }
    }

    /// Pool of a resource type.
    pub fn pool(&self, resource: ResourceType) -> Option<&ResourcePool> {
        self.pools.get(&resource)
    }

    /// Earliest free instant of a type; `None` when it has no units.
    pub fn earliest_free(&self, resource: ResourceType) -> Option<f64> {
        self.pools.get(&resource).and_then(ResourcePool::earliest_free)
    }

    /// Resource-imposed ready time for a set of required types and the local
    /// bottleneck.
    ///
    /// The bottleneck is the first type (in slice order) whose earliest free
    /// instant strictly exceeds the running maximum, which starts at 0.
    /// `None` when any required type has no units.
    pub fn ready_time(&self, required: &[ResourceType]) -> Option<(f64, Option<ResourceType>)> {
        let mut ready = 0.0;
        let mut bottleneck = None;
        for &rt in required {
            let free = self.earliest_free(rt)?;
            if free > ready {
                ready = free;
                bottleneck = Some(rt);
            }
        }
        Some((ready, bottleneck))
    }

    /// Claims one unit of a type for `[start, end)`.
    pub fn commit(&mut self, resource: ResourceType, start: f64, end: f64) -> Option<usize> {
        self.pools.get_mut(&resource)?.commit(start, end)
    }

    /// Smallest next-free instant across all non-empty pools.
    pub fn earliest_event(&self) -> Option<f64> {
        self.pools
            .values()
            .filter_map(ResourcePool::earliest_free)
            .reduce(f64::min)
    }

    /// Advances every pool to the smallest next-free instant across all
    /// pools. Returns the instant, if any pool has units.
    pub(crate) fn fast_forward(&mut self) -> Option<f64> {
        let t = self.earliest_event()?;
        for pool in self.pools.values_mut() {
            pool.advance_to(t);
        }
        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_earliest_free() {
        let mut pool = ResourcePool::new(2);
        assert_eq!(pool.earliest_free(), Some(0.0));
        pool.commit(0.0, 5.0);
        assert_eq!(pool.earliest_free(), Some(0.0));
        pool.commit(0.0, 3.0);
        assert_eq!(pool.earliest_free(), Some(3.0));
    }

    #[test]
    fn test_pool_commit_first_free() {
        let mut pool = ResourcePool::new(3);
        assert_eq!(pool.commit(0.0, 4.0), Some(0));
        assert_eq!(pool.commit(0.0, 2.0), Some(1));
        // every unit is free at 4.0; the first one wins
        assert_eq!(pool.commit(4.0, 6.0), Some(0));
        assert_eq!(pool.commit(1.0, 2.0), Some(2));
    }

    #[test]
    fn test_pool_commit_epsilon() {
        let mut pool = ResourcePool::new(1);
        pool.commit(0.0, 2.0);
        assert_eq!(pool.commit(2.0 - 1e-7, 3.0), Some(0));
    }

    #[test]
    fn test_pool_commit_fallback_argmin() {
        let mut pool = ResourcePool::new(2);
        pool.commit(0.0, 9.0);
        pool.commit(0.0, 4.0);
        // nobody is free at 1.0; the unit freeing first is claimed
        assert_eq!(pool.commit(1.0, 5.0), Some(1));
    }

    #[test]
    fn test_empty_pool() {
        let mut pool = ResourcePool::new(0);
        assert_eq!(pool.units(), 0);
        assert!(pool.earliest_free().is_none());
        assert!(pool.commit(0.0, 1.0).is_none());
    }

    #[test]
    fn test_pools_default_units() {
        let cap = CapacityConfig::new().with_units(ResourceType::IsoPress, 3);
        let pools = ResourcePools::from_capacity(&cap);
        assert_eq!(pools.pool(ResourceType::IsoPress).map(ResourcePool::units), Some(3));
        assert_eq!(pools.pool(ResourceType::Co2Line).map(ResourcePool::units), Some(1));
    }

    #[test]
    fn test_ready_time_bottleneck() {
        let cap = CapacityConfig::new();
        let mut pools = ResourcePools::from_capacity(&cap);
        pools.commit(ResourceType::AssemblyBench, 0.0, 2.0);
        pools.commit(ResourceType::ConventionalCell, 0.0, 5.0);

        let required = [ResourceType::AssemblyBench, ResourceType::ConventionalCell];
        let (ready, bottleneck) = pools.ready_time(&required).unwrap();
        assert!((ready - 5.0).abs() < 1e-12);
        assert_eq!(bottleneck, Some(ResourceType::ConventionalCell));

        // equal free times: the first type in order stays the bottleneck
        pools.commit(ResourceType::AssemblyBench, 2.0, 5.0);
        let (_, bottleneck) = pools.ready_time(&required).unwrap();
        assert_eq!(bottleneck, Some(ResourceType::AssemblyBench));
    }

    #[test]
    fn test_ready_time_all_free() {
        let pools = ResourcePools::from_capacity(&CapacityConfig::new());
        let (ready, bottleneck) = pools.ready_time(&[ResourceType::PrepBench]).unwrap();
        assert!((ready - 0.0).abs() < 1e-12);
        assert!(bottleneck.is_none());
        assert_eq!(pools.ready_time(&[]), Some((0.0, None)));
    }

    #[test]
    fn test_ready_time_zero_units() {
        let cap = CapacityConfig::new().with_units(ResourceType::IsoPress, 0);
        let pools = ResourcePools::from_capacity(&cap);
        assert!(pools.ready_time(&[ResourceType::IsoPress]).is_none());
    }

    #[test]
    fn test_fast_forward() {
        let mut pools = ResourcePools::from_capacity(&CapacityConfig::new());
        for rt in ResourceType::ALL {
            pools.commit(rt, 0.0, 3.0);
        }
        pools.commit(ResourceType::IsoPress, 3.0, 8.0);
        assert_eq!(pools.fast_forward(), Some(3.0));
        assert_eq!(pools.earliest_free(ResourceType::IsoPress), Some(8.0));
        assert_eq!(pools.earliest_free(ResourceType::Co2Line), Some(3.0));
    }
}
