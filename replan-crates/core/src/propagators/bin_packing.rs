//! Multi-dimensional bin packing: every item is placed in one bin, and on each dimension the load
//! of a bin is the total size of the items placed in it.
use crate::basic_types::PropagationStatus;
use crate::engine::domain_events::DomainEvents;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;
use crate::engine::EmptyDomain;
use crate::replan_assert_simple;

/// The [`PropagatorConstructor`] for the [`BinPackingPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct BinPackingPropagatorArgs {
    /// `loads[d][b]` is the load of bin `b` on dimension `d`.
    pub(crate) loads: Box<[Box<[DomainId]>]>,
    /// `sizes[d][i]` is the size of item `i` on dimension `d`.
    pub(crate) sizes: Box<[Box<[i32]>]>,
    /// `bins[i]` is the index of the bin item `i` is placed in.
    pub(crate) bins: Box<[DomainId]>,
}

impl PropagatorConstructor for BinPackingPropagatorArgs {
    type PropagatorImpl = BinPackingPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinPackingPropagatorArgs { loads, sizes, bins } = self;
        replan_assert_simple!(loads.len() == sizes.len());
        replan_assert_simple!(sizes.iter().all(|sizes| sizes.len() == bins.len()));

        for &bin in bins.iter() {
            context.register(bin, DomainEvents::ANY_INT);
        }
        for &load in loads.iter().flat_map(|loads| loads.iter()) {
            context.register(load, DomainEvents::BOUNDS);
        }

        let totals = sizes
            .iter()
            .map(|sizes| sizes.iter().map(|&size| size as i64).sum())
            .collect();
        let num_bins = loads.first().map_or(0, |loads| loads.len());

        BinPackingPropagator {
            loads,
            sizes,
            bins,
            totals,
            assigned: vec![0; num_bins],
            potential: vec![0; num_bins],
        }
    }
}

/// Propagator for the multi-dimensional bin-packing constraint.
///
/// Every call recomputes the mandatory and potential load of each bin from scratch, then prunes
/// item placements that would overflow a bin and bounds the loads until nothing changes.
#[derive(Clone, Debug)]
pub(crate) struct BinPackingPropagator {
    loads: Box<[Box<[DomainId]>]>,
    sizes: Box<[Box<[i32]>]>,
    bins: Box<[DomainId]>,
    /// Total size of all items on each dimension.
    totals: Box<[i64]>,
    assigned: Vec<i64>,
    potential: Vec<i64>,
}

impl BinPackingPropagator {
    fn num_bins(&self) -> usize {
        self.assigned.len()
    }

    fn bin_index(&self, value: i32) -> Option<usize> {
        usize::try_from(value)
            .ok()
            .filter(|&index| index < self.num_bins())
    }

    /// Compute the mandatory and potential loads of every bin on `dimension`.
    fn compute_loads<Context: ReadDomains>(&mut self, context: &Context, dimension: usize) {
        self.assigned.iter_mut().for_each(|load| *load = 0);
        self.potential.iter_mut().for_each(|load| *load = 0);

        for (item, &bin) in self.bins.iter().enumerate() {
            let size = self.sizes[dimension][item] as i64;
            if let Some(value) = context.fixed_value(bin) {
                if let Some(index) = self.bin_index(value) {
                    self.assigned[index] += size;
                    self.potential[index] += size;
                }
                continue;
            }
            for value in context.iterate_domain(bin) {
                if let Some(index) = self.bin_index(value) {
                    self.potential[index] += size;
                }
            }
        }
    }

    /// Apply the filtering rules on one dimension; returns whether a domain changed.
    fn filter_dimension(
        &mut self,
        context: &mut PropagationContextMut,
        dimension: usize,
    ) -> Result<bool, EmptyDomain> {
        let mut changed = false;

        // Values outside the bins can never be used.
        for &bin in self.bins.iter() {
            if context.lower_bound(bin) < 0 {
                changed |= context.set_lower_bound(bin, 0)?;
            }
            if context.upper_bound(bin) >= self.num_bins() as i32 {
                changed |= context.set_upper_bound(bin, self.num_bins() as i32 - 1)?;
            }
        }

        self.compute_loads(&*context, dimension);

        for (item, &bin) in self.bins.iter().enumerate() {
            if context.is_fixed(bin) {
                continue;
            }
            let size = self.sizes[dimension][item] as i64;
            let candidates = context.iterate_domain(bin).collect::<Vec<_>>();
            for value in candidates {
                let index = value as usize;
                let capacity = context.upper_bound(self.loads[dimension][index]) as i64;
                if self.assigned[index] + size > capacity {
                    changed |= context.remove(bin, value)?;
                }
            }
        }

        self.compute_loads(&*context, dimension);

        let mut sum_lower_bounds = 0_i64;
        let mut sum_upper_bounds = 0_i64;
        for index in 0..self.num_bins() {
            let load = self.loads[dimension][index];
            changed |= context.set_lower_bound(load, clamp(self.assigned[index]))?;
            changed |= context.set_upper_bound(load, clamp(self.potential[index]))?;
            sum_lower_bounds += context.lower_bound(load) as i64;
            sum_upper_bounds += context.upper_bound(load) as i64;
        }

        // The loads of all bins add up to the total size.
        let total = self.totals[dimension];
        for index in 0..self.num_bins() {
            let load = self.loads[dimension][index];
            let lower_bound = context.lower_bound(load) as i64;
            let upper_bound = context.upper_bound(load) as i64;

            let others_upper = sum_upper_bounds - upper_bound;
            let others_lower = sum_lower_bounds - lower_bound;
            let tightened_lower = clamp(total - others_upper);
            let tightened_upper = clamp(total - others_lower);

            if context.set_lower_bound(load, tightened_lower)? {
                changed = true;
                sum_lower_bounds += context.lower_bound(load) as i64 - lower_bound;
            }
            if context.set_upper_bound(load, tightened_upper)? {
                changed = true;
                sum_upper_bounds += context.upper_bound(load) as i64 - upper_bound;
            }
        }

        Ok(changed)
    }
}

fn clamp(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl Propagator for BinPackingPropagator {
    fn name(&self) -> &str {
        "BinPacking"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatus {
        loop {
            let mut changed = false;
            for dimension in 0..self.loads.len() {
                changed |= self.filter_dimension(&mut context, dimension)?;
            }
            if !changed {
                return Ok(());
            }
        }
    }

    fn is_entailed(&self, context: PropagationContext) -> Entailment {
        if !self.bins.iter().all(|&bin| context.is_fixed(bin)) {
            return Entailment::Undefined;
        }

        let satisfied = self.loads.iter().enumerate().all(|(dimension, loads)| {
            loads.iter().enumerate().all(|(index, &load)| {
                let placed = self
                    .bins
                    .iter()
                    .enumerate()
                    .filter(|&(_, &bin)| context.fixed_value(bin) == Some(index as i32))
                    .map(|(item, _)| self.sizes[dimension][item] as i64)
                    .sum::<i64>();
                context.fixed_value(load).map(|value| value as i64) == Some(placed)
            })
        });

        if satisfied {
            Entailment::True
        } else {
            Entailment::Undefined
        }
    }
}
