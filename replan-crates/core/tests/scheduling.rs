#![cfg(test)]

mod common;

use std::time::Duration;

use common::*;
use replan_core::constraints::Ban;
use replan_core::constraints::Killed;
use replan_core::constraints::Offline;
use replan_core::constraints::Precedence;
use replan_core::constraints::Running;
use replan_core::constraints::SatConstraint;
use replan_core::constraints::Sleeping;
use replan_core::constraints::Spread;
use replan_core::plan::ActionType;
use replan_core::DefaultScheduler;
use replan_core::Instance;
use replan_core::SchedulerError;
use replan_core::SchedulerParameters;

#[test]
fn evacuating_a_node_migrates_its_vm_to_the_free_node() {
    init_logging();
    let (mut model, nodes) = datacenter(3, 4);
    let v1 = running_vm(&mut model, nodes[0], 3);
    let v2 = running_vm(&mut model, nodes[1], 3);
    let constraints: [SatConstraint; 2] = [
        Spread::new([v1, v2]).into(),
        Offline::new([nodes[0]]).into(),
    ];
    let instance = Instance::new(model, constraints);

    let result = DefaultScheduler::default()
        .solve(&instance)
        .expect("the instance is satisfiable");
    let plan = &result.plan;
    assert_eq!(2, plan.len());

    let migrations = actions_of(plan, v1);
    assert_eq!(1, migrations.len());
    let migration = migrations[0];
    assert_eq!(ActionType::MigrateVm, migration.action_type());
    assert_eq!(Some(nodes[0]), migration.source());
    assert_eq!(Some(nodes[2]), migration.destination());
    assert!(actions_of(plan, v2).is_empty());

    let shutdown = plan
        .actions()
        .iter()
        .find(|action| action.action_type() == ActionType::ShutdownNode)
        .expect("the node is turned off");
    assert!(shutdown.start >= migration.end);

    let result_model = plan.result().expect("the plan is applicable");
    assert!(instance
        .constraints
        .iter()
        .all(|constraint| constraint.is_satisfied(&result_model)));
}

#[test]
fn vms_that_do_not_fit_make_the_instance_infeasible() {
    init_logging();
    let (mut model, _) = datacenter(1, 2);
    let v1 = ready_vm(&mut model, 2);
    let v2 = ready_vm(&mut model, 2);
    let instance = Instance::new(model, [Running::new([v1, v2]).into()]);

    let result = DefaultScheduler::default().solve(&instance);

    assert!(matches!(result, Err(SchedulerError::Infeasible)));
}

#[test]
fn an_exhausting_search_is_unstatable_once_the_time_limit_expires() {
    init_logging();
    let (mut model, nodes) = datacenter(200, 20);
    let vms = (0..2000)
        .map(|index| running_vm(&mut model, nodes[index % nodes.len()], 1))
        .collect::<Vec<_>>();
    // One VM too many to spread: no propagation notices it, the search has to.
    let instance = Instance::new(model, [Spread::new(vms[..201].iter().copied()).into()]);
    let parameters = SchedulerParameters::default().with_time_limit(Duration::from_secs(1));

    let result = DefaultScheduler::new(parameters).solve(&instance);

    assert!(matches!(result, Err(SchedulerError::Unstatable(1))));
}

#[test]
fn booted_vms_respect_the_node_capacities() {
    init_logging();
    let (mut model, _) = datacenter(3, 4);
    let vms = (0..6).map(|_| ready_vm(&mut model, 2)).collect::<Vec<_>>();
    let instance = Instance::new(model, [Running::new(vms.iter().copied()).into()]);

    let result = DefaultScheduler::default()
        .solve(&instance)
        .expect("the VMs fit exactly");

    assert_eq!(6, result.plan.len());
    assert!(result
        .plan
        .actions()
        .iter()
        .all(|action| action.action_type() == ActionType::BootVm));
    let result_model = result.plan.result().expect("the plan is applicable");
    assert!(respects_cpu_capacities(&result_model));
    assert!(vms.iter().all(|&vm| result_model.mapping().is_running(vm)));
}

#[test]
fn ordered_migrations_do_not_overlap() {
    init_logging();
    let (mut model, nodes) = datacenter(3, 4);
    let v0 = running_vm(&mut model, nodes[0], 1);
    let v1 = running_vm(&mut model, nodes[1], 1);
    let constraints: [SatConstraint; 3] = [
        Ban::new([v0], [nodes[0]]).into(),
        Ban::new([v1], [nodes[1]]).into(),
        Precedence::new(v0, v1).into(),
    ];
    let instance = Instance::new(model, constraints);

    let result = DefaultScheduler::default()
        .solve(&instance)
        .expect("both VMs can move");

    let first = actions_of(&result.plan, v0);
    let second = actions_of(&result.plan, v1);
    assert_eq!(1, first.len());
    assert_eq!(1, second.len());
    assert!(second[0].start >= first[0].end);
}

#[test]
fn vms_swap_nodes_with_room_to_spare() {
    init_logging();
    let (mut model, nodes) = datacenter(2, 4);
    let v0 = running_vm(&mut model, nodes[0], 1);
    let v1 = running_vm(&mut model, nodes[1], 1);
    let constraints: [SatConstraint; 2] = [
        Ban::new([v0], [nodes[0]]).into(),
        Ban::new([v1], [nodes[1]]).into(),
    ];
    let instance = Instance::new(model, constraints);
    let parameters = SchedulerParameters::default().with_optimisation(true);

    let result = DefaultScheduler::new(parameters)
        .solve(&instance)
        .expect("each node can host both VMs during the swap");

    let first = actions_of(&result.plan, v0);
    let second = actions_of(&result.plan, v1);
    assert_eq!(1, first.len());
    assert_eq!(1, second.len());
    assert_eq!(Some(nodes[1]), first[0].destination());
    assert_eq!(Some(nodes[0]), second[0].destination());
    assert_eq!(0, first[0].start);
    assert_eq!(0, second[0].start);
    let result_model = result.plan.result().expect("the plan is applicable");
    assert!(respects_cpu_capacities(&result_model));
}

#[test]
fn full_nodes_cannot_swap_their_vms() {
    init_logging();
    let (mut model, nodes) = datacenter(2, 1);
    let v0 = running_vm(&mut model, nodes[0], 1);
    let v1 = running_vm(&mut model, nodes[1], 1);
    let constraints: [SatConstraint; 2] = [
        Ban::new([v0], [nodes[0]]).into(),
        Ban::new([v1], [nodes[1]]).into(),
    ];
    let instance = Instance::new(model, constraints);

    let result = DefaultScheduler::default().solve(&instance);

    assert!(matches!(result, Err(SchedulerError::Infeasible)));
}

#[test]
fn state_changes_yield_the_matching_actions() {
    init_logging();
    let (mut model, nodes) = datacenter(2, 4);
    let doomed = running_vm(&mut model, nodes[0], 1);
    let asleep = running_vm(&mut model, nodes[1], 1);
    let fresh = ready_vm(&mut model, 1);
    let constraints: [SatConstraint; 3] = [
        Killed::new([doomed]).into(),
        Sleeping::new([asleep]).into(),
        Running::new([fresh]).into(),
    ];
    let instance = Instance::new(model, constraints);

    let result = DefaultScheduler::default()
        .solve(&instance)
        .expect("every transition is possible");

    let types_of = |vm| {
        actions_of(&result.plan, vm)
            .into_iter()
            .map(|action| action.action_type())
            .collect::<Vec<_>>()
    };
    assert_eq!(vec![ActionType::KillVm], types_of(doomed));
    assert_eq!(vec![ActionType::SuspendVm], types_of(asleep));
    assert_eq!(vec![ActionType::BootVm], types_of(fresh));
}

#[test]
fn repair_mode_only_moves_misplaced_vms() {
    init_logging();
    let (mut model, nodes) = datacenter(3, 4);
    let misplaced = running_vm(&mut model, nodes[0], 1);
    let others = (0..4)
        .map(|index| running_vm(&mut model, nodes[index % 3], 1))
        .collect::<Vec<_>>();
    let instance = Instance::new(model, [Ban::new([misplaced], [nodes[0]]).into()]);
    let parameters = SchedulerParameters::default().with_repair(true);

    let result = DefaultScheduler::new(parameters)
        .solve(&instance)
        .expect("the VM can move");

    assert_eq!(1, actions_of(&result.plan, misplaced).len());
    assert!(others
        .iter()
        .all(|&vm| actions_of(&result.plan, vm).is_empty()));
}
