//! Sandbox scenarios against a live design.

use strata_library::{LibraryCellDef, LibraryCellId, PinDirection};
use strata_netlist::{CellId, Design, NetId};
use strata_sandbox::{RelatedState, Sandbox, SandboxError};

struct Fixture {
    design: Design,
    and2: LibraryCellId,
    nand2: LibraryCellId,
    inv: LibraryCellId,
    /// drv -> n_in -> gate -> n_out -> load
    drv: CellId,
    gate: CellId,
    load: CellId,
    n_in: NetId,
    n_side: NetId,
    n_out: NetId,
}

fn fixture() -> Fixture {
    let mut design = Design::new("top");
    let gate_def = |name: &str| {
        LibraryCellDef::new(name)
            .pin("A", PinDirection::Input)
            .pin("B", PinDirection::Input)
            .pin("Y", PinDirection::Output)
            .arc("A", "Y")
            .arc("B", "Y")
    };
    let and2 = design.register_library_cell(&gate_def("AND2")).unwrap();
    let nand2 = design.register_library_cell(&gate_def("NAND2")).unwrap();
    let inv = design
        .register_library_cell(
            &LibraryCellDef::new("INV")
                .pin("A", PinDirection::Input)
                .pin("Y", PinDirection::Output)
                .arc("A", "Y"),
        )
        .unwrap();
    design.initialize().unwrap();

    let top = design.top_module();
    let drv = design.create_instance("drv", inv, top).unwrap();
    let gate = design.create_instance("gate", and2, top).unwrap();
    let load = design.create_instance("load", inv, top).unwrap();
    let n_in = design.create_net("n_in", top).unwrap();
    let n_side = design.create_net("n_side", top).unwrap();
    let n_out = design.create_net("n_out", top).unwrap();
    let connections = [
        (drv, "Y", n_in),
        (gate, "A", n_in),
        (gate, "B", n_side),
        (gate, "Y", n_out),
        (load, "A", n_out),
    ];
    for (cell, pin, net) in connections {
        let pin = design.pin_by_name(cell, pin).unwrap();
        design.connect(pin, net).unwrap();
    }
    Fixture {
        design,
        and2,
        nand2,
        inv,
        drv,
        gate,
        load,
        n_in,
        n_side,
        n_out,
    }
}

#[test]
fn extract_cuts_every_boundary_net() {
    let f = fixture();
    let sb = Sandbox::extract(&f.design, [f.gate]).unwrap();

    let gate = sb.mirror_of_instance(f.gate).unwrap();
    assert_eq!(sb.instance(gate).related, Some(f.gate.into()));
    assert!(sb.mirror_of_instance(f.drv).is_none());
    assert!(sb.mirror_of_instance(f.load).is_none());

    // n_in has an outside driver: a virtual input port drives it.
    let n_in = sb.mirror_of_net(f.n_in).unwrap();
    let driver = sb.any_driver(n_in).unwrap();
    assert!(sb.is_virtual_pin(driver));
    let port = sb.pin(driver).instance;
    assert_eq!(sb.attached_pin(port), sb.pin_by_name(gate, "A"));

    // n_out has an outside sink: a virtual output port sinks it.
    let n_out = sb.mirror_of_net(f.n_out).unwrap();
    let sinks: Vec<_> = sb.sinks(n_out).collect();
    assert_eq!(sinks.len(), 1);
    assert!(sb.is_virtual_pin(sinks[0]));
    assert_eq!(
        sb.attached_pin(sb.pin(sinks[0]).instance),
        sb.pin_by_name(gate, "Y")
    );

    // n_side has nothing outside: no port.
    let n_side = sb.mirror_of_net(f.n_side).unwrap();
    assert_eq!(sb.net_pins(n_side).len(), 1);
    assert_eq!(sb.virtual_ports().count(), 2);
    assert!(!sb.is_virtual_net(n_in));
}

#[test]
fn traversal_crosses_the_cut_without_special_cases() {
    let f = fixture();
    let mut sb = Sandbox::extract(&f.design, [f.gate]).unwrap();
    let n_in = sb.mirror_of_net(f.n_in).unwrap();
    let source = sb.any_driver(n_in).unwrap();
    let cone = sb.fanout_cone(&[source]);

    let gate = sb.mirror_of_instance(f.gate).unwrap();
    let y = sb.pin_by_name(gate, "Y").unwrap();
    assert!(cone.contains(&y));
    let n_out = sb.mirror_of_net(f.n_out).unwrap();
    let exit = sb.sinks(n_out).next().unwrap();
    assert!(cone.contains(&exit));
    assert!(!cone.contains(&sb.pin_by_name(gate, "B").unwrap()));
}

#[test]
fn sandbox_edits_leave_the_design_alone() {
    let f = fixture();
    let mut design = f.design;
    let revision = design.revision();
    let mut sb = Sandbox::extract(&design, [f.gate, f.load]).unwrap();
    let gate = sb.mirror_of_instance(f.gate).unwrap();
    let y = sb.pin_by_name(gate, "Y").unwrap();

    assert!(sb.disconnect(y));
    sb.remap(design.library(), gate, f.nand2).unwrap();
    let extra = sb.create_instance(design.library(), "trial_inv", f.inv).unwrap();
    let n_out = sb.mirror_of_net(f.n_out).unwrap();
    let extra_y = sb.pin_by_name(extra, "Y").unwrap();
    sb.connect(extra_y, n_out).unwrap();

    assert_eq!(design.revision(), revision);
    assert_eq!(design.library_cell_of(f.gate), f.and2);
    let design_y = design.pin_by_name(f.gate, "Y").unwrap();
    assert_eq!(design.pin(design_y).net, Some(f.n_out));
    assert!(design.find_instance("trial_inv").is_none());

    // Propagation is explicit.
    let pending = sb.pending_remaps(&design);
    assert_eq!(pending, vec![(f.gate, f.nand2)]);
    for (cell, library_cell) in pending {
        design.remap(cell, library_cell).unwrap();
    }
    assert_eq!(design.library_cell_of(f.gate), f.nand2);
    assert!(sb.pending_remaps(&design).is_empty());
}

#[test]
fn related_links_report_staleness() {
    let f = fixture();
    let mut design = f.design;
    let sb = Sandbox::extract(&design, [f.gate]).unwrap();
    let gate = sb.mirror_of_instance(f.gate).unwrap();
    let n_side = sb.mirror_of_net(f.n_side).unwrap();
    let n_in = sb.mirror_of_net(f.n_in).unwrap();
    let a = sb.pin_by_name(gate, "A").unwrap();
    let port = sb.virtual_ports().next().unwrap();

    assert_eq!(sb.related_state(&design, gate), RelatedState::Live);
    assert_eq!(sb.related_state(&design, n_side), RelatedState::Live);
    assert_eq!(sb.related_state(&design, port), RelatedState::Unrelated);

    design.set_fixed(f.gate, true);
    assert_eq!(sb.related_state(&design, gate), RelatedState::Modified);
    assert_eq!(sb.related_state(&design, a), RelatedState::Live);

    let design_a = design.pin_by_name(f.gate, "A").unwrap();
    design.disconnect(design_a);
    assert_eq!(sb.related_state(&design, a), RelatedState::Modified);
    assert_eq!(sb.related_state(&design, n_in), RelatedState::Modified);

    let design_b = design.pin_by_name(f.gate, "B").unwrap();
    design.disconnect(design_b);
    design.remove_net(f.n_side).unwrap();
    assert_eq!(sb.related_state(&design, n_side), RelatedState::Removed);
}

#[test]
fn removed_design_cell_cannot_be_imported() {
    let f = fixture();
    let mut design = f.design;
    let pins: Vec<_> = design.pins(f.load).to_vec();
    for pin in pins {
        design.disconnect(pin);
    }
    design.remove_instance(f.load).unwrap();
    let mut sb = Sandbox::new("late");
    assert!(matches!(
        sb.import_cell(&design, f.load),
        Err(SandboxError::Netlist(_))
    ));
    assert_eq!(sb.instances().count(), 0);
}

#[test]
fn importing_a_neighbour_moves_the_cut() {
    let f = fixture();
    let mut sb = Sandbox::extract(&f.design, [f.gate]).unwrap();
    let n_in = sb.mirror_of_net(f.n_in).unwrap();
    assert_eq!(sb.virtual_ports().count(), 2);

    let drv = sb.import_cell(&f.design, f.drv).unwrap();
    let drv_y = sb.pin_by_name(drv, "Y").unwrap();
    let drivers: Vec<_> = sb.drivers(n_in).collect();
    assert_eq!(drivers, vec![drv_y]);
    assert_eq!(
        drivers.len(),
        f.design.drivers(f.n_in).count(),
        "mirror and design agree on the driver count"
    );
    assert!(sb.net_pins(n_in).iter().all(|&p| !sb.is_virtual_pin(p)));

    // Only the cut on n_out is left.
    let ports: Vec<_> = sb.virtual_ports().collect();
    assert_eq!(ports.len(), 1);
    let n_out = sb.mirror_of_net(f.n_out).unwrap();
    assert_eq!(sb.pin(sb.pins(ports[0])[0]).net, Some(n_out));
}
