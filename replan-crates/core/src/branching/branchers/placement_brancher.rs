use std::cmp::Reverse;

use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// A VM to place: its host variable and the index of its current host, if any.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlacementItem {
    pub(crate) host: DomainId,
    pub(crate) source: Option<i32>,
    /// The total amount of resources the VM will consume.
    pub(crate) weight: i64,
}

/// Places the VMs one by one, heaviest first.
///
/// A VM stays on its current host whenever possible. Otherwise it goes to the node with the most
/// free capacity left on the guiding dimension (worst fit), or to a random node of its domain.
#[derive(Debug)]
pub(crate) struct PlacementBrancher {
    items: Vec<PlacementItem>,
    loads: Vec<DomainId>,
    capacities: Vec<i32>,
    random_placement: bool,
}

impl PlacementBrancher {
    /// `loads` and `capacities` describe the dimension guiding the worst fit, indexed by node.
    pub(crate) fn new(
        mut items: Vec<PlacementItem>,
        loads: Vec<DomainId>,
        capacities: Vec<i32>,
        random_placement: bool,
    ) -> Self {
        // Stable, so equally heavy VMs keep their order.
        items.sort_by_key(|item| Reverse(item.weight));
        PlacementBrancher {
            items,
            loads,
            capacities,
            random_placement,
        }
    }

    fn worst_fit(&self, context: &SelectionContext, host: DomainId) -> i32 {
        context
            .iterate_domain(host)
            .min_by_key(|&node| {
                let slack = usize::try_from(node)
                    .ok()
                    .and_then(|index| Some((*self.capacities.get(index)?, *self.loads.get(index)?)))
                    .map_or(i64::MIN, |(capacity, load)| {
                        i64::from(capacity) - i64::from(context.lower_bound(load))
                    });
                Reverse(slack)
            })
            .unwrap_or_else(|| context.lower_bound(host))
    }
}

impl Brancher for PlacementBrancher {
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision> {
        let item = *self.items.iter().find(|item| !context.is_fixed(item.host))?;
        if let Some(source) = item.source.filter(|&source| context.contains(item.host, source)) {
            return Some(Decision::new(item.host, source));
        }
        let value = if self.random_placement {
            let values = context.iterate_domain(item.host).collect::<Vec<_>>();
            let index = context.random().generate_usize_in_range(0..values.len());
            values[index]
        } else {
            self.worst_fit(context, item.host)
        };
        Some(Decision::new(item.host, value))
    }
}
