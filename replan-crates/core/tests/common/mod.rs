#![allow(dead_code, reason = "not every test file uses every helper")]

use replan_core::model::Element;
use replan_core::model::Model;
use replan_core::model::Node;
use replan_core::model::ShareableResource;
use replan_core::model::Vm;
use replan_core::plan::Action;
use replan_core::plan::ReconfigurationPlan;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A model of `num_nodes` online nodes sharing a `cpu` resource of the given capacity; VMs
/// consume one unit unless told otherwise.
pub fn datacenter(num_nodes: usize, cpu_capacity: i32) -> (Model, Vec<Node>) {
    let mut model = Model::default();
    let nodes = (0..num_nodes)
        .map(|_| {
            let node = model.new_node();
            model.mapping_mut().add_online_node(node);
            node
        })
        .collect();
    model.add_resource(ShareableResource::new("cpu", cpu_capacity, 1));
    (model, nodes)
}

pub fn running_vm(model: &mut Model, host: Node, cpu: i32) -> Vm {
    let vm = model.new_vm();
    assert!(model.mapping_mut().add_running_vm(vm, host));
    let _ = model
        .resource_mut("cpu")
        .expect("the model has a cpu resource")
        .set_consumption(vm, cpu);
    vm
}

pub fn ready_vm(model: &mut Model, cpu: i32) -> Vm {
    let vm = model.new_vm();
    model.mapping_mut().add_ready_vm(vm);
    let _ = model
        .resource_mut("cpu")
        .expect("the model has a cpu resource")
        .set_consumption(vm, cpu);
    vm
}

pub fn actions_of(plan: &ReconfigurationPlan, vm: Vm) -> Vec<&Action> {
    plan.actions()
        .iter()
        .filter(|action| action.element() == Element::from(vm))
        .collect()
}

/// Every node of `model` hosts no more cpu than it offers.
pub fn respects_cpu_capacities(model: &Model) -> bool {
    let Some(cpu) = model.resource("cpu") else {
        return true;
    };
    model.mapping().all_nodes().all(|node| {
        let load = cpu.sum_consumptions(model.mapping().running_vms_on(node));
        load <= i64::from(cpu.capacity(node))
    })
}
