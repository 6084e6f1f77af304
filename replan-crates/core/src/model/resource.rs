use std::collections::BTreeMap;

use super::Node;
use super::Vm;

/// A resource shared by the VMs hosted on a node, such as CPU or memory.
///
/// Every node offers a capacity and every VM consumes an amount; elements without an explicit
/// value use the defaults. A VM may also request a different amount for the end of the
/// reconfiguration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareableResource {
    name: String,
    default_capacity: i32,
    default_consumption: i32,
    capacities: BTreeMap<Node, i32>,
    consumptions: BTreeMap<Vm, i32>,
    future_consumptions: BTreeMap<Vm, i32>,
}

impl ShareableResource {
    pub fn new(name: impl Into<String>, default_capacity: i32, default_consumption: i32) -> Self {
        ShareableResource {
            name: name.into(),
            default_capacity,
            default_consumption,
            capacities: BTreeMap::new(),
            consumptions: BTreeMap::new(),
            future_consumptions: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self, node: Node) -> i32 {
        self.capacities
            .get(&node)
            .copied()
            .unwrap_or(self.default_capacity)
    }

    pub fn consumption(&self, vm: Vm) -> i32 {
        self.consumptions
            .get(&vm)
            .copied()
            .unwrap_or(self.default_consumption)
    }

    /// The amount `vm` consumes once the reconfiguration is over.
    pub fn future_consumption(&self, vm: Vm) -> i32 {
        self.future_consumptions
            .get(&vm)
            .copied()
            .unwrap_or_else(|| self.consumption(vm))
    }

    pub fn set_capacity(&mut self, node: Node, capacity: i32) -> &mut Self {
        let _ = self.capacities.insert(node, capacity);
        self
    }

    pub fn set_consumption(&mut self, vm: Vm, consumption: i32) -> &mut Self {
        let _ = self.consumptions.insert(vm, consumption);
        self
    }

    /// Request `vm` to consume `consumption` at the end of the reconfiguration.
    pub fn set_future_consumption(&mut self, vm: Vm, consumption: i32) -> &mut Self {
        let _ = self.future_consumptions.insert(vm, consumption);
        self
    }

    /// Forget the request for a different future consumption, if any.
    pub fn clear_future_consumption(&mut self, vm: Vm) {
        let _ = self.future_consumptions.remove(&vm);
    }

    pub fn sum_capacities(&self, nodes: impl IntoIterator<Item = Node>) -> i64 {
        nodes
            .into_iter()
            .map(|node| self.capacity(node) as i64)
            .sum()
    }

    pub fn sum_consumptions(&self, vms: impl IntoIterator<Item = Vm>) -> i64 {
        vms.into_iter()
            .map(|vm| self.consumption(vm) as i64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_override_the_defaults() {
        let mut cpu = ShareableResource::new("cpu", 8, 1);
        let _ = cpu
            .set_capacity(Node::new(1), 4)
            .set_consumption(Vm::new(2), 3);

        assert_eq!(8, cpu.capacity(Node::new(0)));
        assert_eq!(4, cpu.capacity(Node::new(1)));
        assert_eq!(1, cpu.consumption(Vm::new(0)));
        assert_eq!(3, cpu.consumption(Vm::new(2)));
        assert_eq!(12, cpu.sum_capacities([Node::new(0), Node::new(1)]));
    }

    #[test]
    fn future_consumption_defaults_to_the_current_one() {
        let mut mem = ShareableResource::new("mem", 16, 2);
        let vm = Vm::new(0);
        assert_eq!(2, mem.future_consumption(vm));

        let _ = mem.set_future_consumption(vm, 6);
        assert_eq!(6, mem.future_consumption(vm));
        assert_eq!(2, mem.consumption(vm));

        mem.clear_future_consumption(vm);
        assert_eq!(2, mem.future_consumption(vm));
    }
}
