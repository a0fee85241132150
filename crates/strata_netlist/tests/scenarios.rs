//! End-to-end scenarios exercising the public mutation protocol.

use std::cell::RefCell;
use std::rc::Rc;
use strata_diagnostics::DiagnosticSink;
use strata_library::{LibraryCellDef, LibraryCellId, PinDirection};
use strata_netlist::{CellId, Design, EventKind, InstanceId, NetId, NetlistError, PinId};

struct Cells {
    and2: LibraryCellId,
    nand2: LibraryCellId,
    inv: LibraryCellId,
    dff: LibraryCellId,
}

fn design_with_cells() -> (Design, Cells) {
    let mut d = Design::new("top");
    let two_input = |name: &str| {
        LibraryCellDef::new(name)
            .pin("A", PinDirection::Input)
            .pin("B", PinDirection::Input)
            .pin("Y", PinDirection::Output)
            .arc("A", "Y")
            .arc("B", "Y")
    };
    let and2 = d.register_library_cell(&two_input("AND2")).unwrap();
    let nand2 = d.register_library_cell(&two_input("NAND2")).unwrap();
    let inv = d
        .register_library_cell(
            &LibraryCellDef::new("INV")
                .pin("A", PinDirection::Input)
                .pin("Y", PinDirection::Output)
                .arc("A", "Y"),
        )
        .unwrap();
    let dff = d
        .register_library_cell(
            &LibraryCellDef::new("DFF")
                .pin("D", PinDirection::Input)
                .pin("Q", PinDirection::Output),
        )
        .unwrap();
    (
        d,
        Cells {
            and2,
            nand2,
            inv,
            dff,
        },
    )
}

fn pin(d: &Design, cell: CellId, name: &str) -> PinId {
    d.pin_by_name(cell, name).unwrap()
}

fn assert_clean(d: &Design) {
    let sink = DiagnosticSink::new();
    let violations = d.check_integrity(&sink);
    assert_eq!(violations, 0, "{:?}", sink.take_all());
}

#[test]
fn and_gate_connectivity() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let u1 = d.create_instance("u1", cells.and2, top).unwrap();
    let n1 = d.create_net("n1", top).unwrap();
    let n2 = d.create_net("n2", top).unwrap();
    let n3 = d.create_net("n3", top).unwrap();
    let (a, b, y) = (pin(&d, u1, "A"), pin(&d, u1, "B"), pin(&d, u1, "Y"));
    d.connect(a, n1).unwrap();
    d.connect(b, n2).unwrap();
    d.connect(y, n3).unwrap();

    assert_eq!(d.any_driver(n3), Some(y));
    assert_eq!(d.any_driver(n1), None);
    assert!(d.instance_arc(u1, a, y).is_some());
    assert!(d.instance_arc(u1, y, a).is_none());
    assert_eq!(d.net_pins(n3), &[y]);

    let u2 = d.create_instance("u2", cells.inv, top).unwrap();
    let sink = pin(&d, u2, "A");
    assert!(d.net_arc(n3, y, sink).is_none());
    d.connect(sink, n3).unwrap();
    let arc = d.net_arc(n3, y, sink).unwrap();
    assert_eq!(d.arc(arc).from, y);
    assert_eq!(d.arc(arc).to, sink);
    assert_eq!(d.sinks(n3).collect::<Vec<_>>(), vec![sink]);
    assert_clean(&d);
}

#[test]
fn remap_preserves_connectivity_and_notifies_once() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let u1 = d.create_instance("u1", cells.and2, top).unwrap();
    let n = d.create_net("n", top).unwrap();
    let y = pin(&d, u1, "Y");
    d.connect(y, n).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let _sub = d
        .observers()
        .on_post_cell_remap(move |_, cell, previous| log.borrow_mut().push((cell, previous)));

    d.remap(u1, cells.nand2).unwrap();
    assert_eq!(*seen.borrow(), vec![(u1, cells.and2)]);
    assert_eq!(d.library_cell_of(u1), cells.nand2);
    assert_eq!(pin(&d, u1, "Y"), y);
    assert_eq!(d.pin(y).net, Some(n));
    assert!(d.instance_arc(u1, pin(&d, u1, "B"), y).is_some());
    assert_clean(&d);
}

#[test]
fn incompatible_remap_changes_nothing() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let u1 = d.create_instance("u1", cells.and2, top).unwrap();
    let revision = d.revision();
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let _sub = d
        .observers()
        .on_post_cell_remap(move |_, _, _| *counter.borrow_mut() += 1);

    let err = d.remap(u1, cells.inv).unwrap_err();
    assert!(matches!(
        err,
        NetlistError::IncompatibleLibraryCellForRemapping { .. }
    ));
    assert_eq!(d.library_cell_of(u1), cells.and2);
    assert_eq!(d.pins(u1).len(), 3);
    assert_eq!(d.revision(), revision);
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn observers_run_in_registration_order_and_can_leave() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let order = Rc::new(RefCell::new(Vec::new()));
    let subscribe = |d: &Design, tag: usize| {
        let order = Rc::clone(&order);
        d.observers()
            .on_post_instance_create(move |_, _| order.borrow_mut().push(tag))
    };
    let first = subscribe(&d, 1);
    let second = subscribe(&d, 2);
    let third = subscribe(&d, 3);

    d.create_instance("u1", cells.inv, top).unwrap();
    assert_eq!(*order.borrow(), vec![1, 2, 3]);

    second.unsubscribe();
    order.borrow_mut().clear();
    d.create_instance("u2", cells.inv, top).unwrap();
    assert_eq!(*order.borrow(), vec![1, 3]);
    assert_eq!(
        d.observers().subscriber_count(EventKind::PostInstanceCreate),
        2
    );
    assert!(first.is_attached());
    assert!(third.is_attached());
}

#[test]
fn each_create_is_delivered_once_in_creation_order() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let _sub = {
        let seen = Rc::clone(&seen);
        d.observers()
            .on_post_instance_create(move |_, inst| seen.borrow_mut().push(inst))
    };

    let created: Vec<InstanceId> = (0..5)
        .map(|i| {
            let lib = if i % 2 == 0 { cells.inv } else { cells.and2 };
            d.create_instance(&format!("g{i}"), lib, top).unwrap().into()
        })
        .collect();
    assert_eq!(*seen.borrow(), created);
}

#[test]
fn disconnect_is_idempotent() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let u1 = d.create_instance("u1", cells.inv, top).unwrap();
    let n = d.create_net("n", top).unwrap();
    let a = pin(&d, u1, "A");
    d.connect(a, n).unwrap();

    assert!(d.disconnect(a));
    let revision = d.revision();
    assert!(!d.disconnect(a));
    assert_eq!(d.revision(), revision);
    assert_eq!(d.pin(a).net, None);
    assert!(d.net_pins(n).is_empty());
    assert_clean(&d);
}

#[test]
fn driver_cache_tracks_output_pins() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let n = d.create_net("n", top).unwrap();
    let drivers: Vec<PinId> = (0..3)
        .map(|i| {
            let u = d.create_instance(&format!("d{i}"), cells.inv, top).unwrap();
            pin(&d, u, "Y")
        })
        .collect();
    let sink_cell = d.create_instance("s", cells.inv, top).unwrap();
    d.connect(pin(&d, sink_cell, "A"), n).unwrap();

    let check = |d: &Design| match d.any_driver(n) {
        Some(driver) => {
            assert_eq!(d.pin(driver).net, Some(n));
            assert_eq!(d.pin(driver).direction, PinDirection::Output);
        }
        None => assert_eq!(d.pin_count(n, PinDirection::Output), 0),
    };

    check(&d);
    for &p in &drivers {
        d.connect(p, n).unwrap();
        check(&d);
    }
    assert_eq!(d.drivers(n).count(), 3);
    for &p in &drivers {
        d.disconnect(p);
        check(&d);
    }
    assert!(!d.has_driver(n));
    assert_clean(&d);
}

fn chain(d: &mut Design, cells: &Cells, length: usize) -> Vec<NetId> {
    let top = d.top_module();
    let input = d.create_port("in", PinDirection::Input, top).unwrap();
    let mut net = d.create_net("w0", top).unwrap();
    let source = d.port_pin(input);
    d.connect(source, net).unwrap();
    let mut nets = vec![net];
    for i in 0..length {
        let u = d.create_instance(&format!("u{i}"), cells.inv, top).unwrap();
        let (a, y) = (pin(d, u, "A"), pin(d, u, "Y"));
        d.connect(a, net).unwrap();
        net = d.create_net(&format!("w{}", i + 1), top).unwrap();
        d.connect(y, net).unwrap();
        nets.push(net);
    }
    nets
}

#[test]
fn net_order_increases_along_driven_paths() {
    let (mut d, cells) = design_with_cells();
    let nets = chain(&mut d, &cells, 4);
    let order = d.topological_order().unwrap().to_vec();
    assert_eq!(order, nets);
    for pair in nets.windows(2) {
        assert!(d.net_order(pair[0]).unwrap() < d.net_order(pair[1]).unwrap());
    }
}

#[test]
fn sequential_cells_break_combinational_paths() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let ff = d.create_instance("ff", cells.dff, top).unwrap();
    let u = d.create_instance("u", cells.inv, top).unwrap();
    let q = d.create_net("q", top).unwrap();
    let dn = d.create_net("d", top).unwrap();
    d.connect(pin(&d, ff, "Q"), q).unwrap();
    d.connect(pin(&d, u, "A"), q).unwrap();
    d.connect(pin(&d, u, "Y"), dn).unwrap();
    d.connect(pin(&d, ff, "D"), dn).unwrap();

    assert!(!d.has_combinational_cycle());
    let ff_q = pin(&d, ff, "Q");
    let ff_d = pin(&d, ff, "D");
    assert!(d.structural_startpoints().contains(&ff_q));
    assert!(d.structural_endpoints().contains(&ff_d));
}

#[test]
fn combinational_loop_is_reported() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let u1 = d.create_instance("u1", cells.inv, top).unwrap();
    let u2 = d.create_instance("u2", cells.inv, top).unwrap();
    let a = d.create_net("a", top).unwrap();
    let b = d.create_net("b", top).unwrap();
    d.connect(pin(&d, u1, "Y"), a).unwrap();
    d.connect(pin(&d, u2, "A"), a).unwrap();
    d.connect(pin(&d, u2, "Y"), b).unwrap();
    d.connect(pin(&d, u1, "A"), b).unwrap();

    assert!(d.has_combinational_cycle());
    assert!(matches!(
        d.topological_order(),
        Err(NetlistError::CombinationalCycle { .. })
    ));

    d.disconnect(pin(&d, u1, "A"));
    assert!(!d.has_combinational_cycle());
    assert!(d.topological_order().is_ok());
}

#[test]
fn hierarchy_scenario_keeps_integrity() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    let sub = d.create_module("sub").unwrap();
    let sub_in = d.create_port("i", PinDirection::Input, sub).unwrap();
    let sub_out = d.create_port("o", PinDirection::Output, sub).unwrap();
    let inner = d.create_instance("inner", cells.inv, sub).unwrap();
    let si = d.create_net("si", sub).unwrap();
    let so = d.create_net("so", sub).unwrap();
    d.connect(d.port_pin(sub_in), si).unwrap();
    d.connect(pin(&d, inner, "A"), si).unwrap();
    d.connect(pin(&d, inner, "Y"), so).unwrap();
    d.connect(d.port_pin(sub_out), so).unwrap();

    let s = d.instantiate_module("s", sub, top).unwrap();
    let x = d.create_net("x", top).unwrap();
    let z = d.create_net("z", top).unwrap();
    let driver = d.create_instance("drv", cells.inv, top).unwrap();
    d.connect(pin(&d, driver, "Y"), x).unwrap();
    d.connect(d.pin_by_name(s, "i").unwrap(), x).unwrap();
    d.connect(d.pin_by_name(s, "o").unwrap(), z).unwrap();

    d.initialize().unwrap();
    let x_order = d.net_order(x).unwrap();
    assert!(x_order < d.net_order(si).unwrap());
    assert!(d.net_order(so).unwrap() < d.net_order(z).unwrap());
    assert!(d.library().is_frozen());
    assert_clean(&d);

    assert!(matches!(
        d.remove_net(x),
        Err(NetlistError::NetHasConnectedPins { .. })
    ));
}

#[test]
fn instance_arcs_never_run_backwards() {
    let (mut d, cells) = design_with_cells();
    let top = d.top_module();
    // A shared undriven input feeding a short and a long path that reconverge.
    let shared = d.create_net("shared", top).unwrap();
    let mut tail = shared;
    for i in 0..3 {
        let u = d.create_instance(&format!("long{i}"), cells.inv, top).unwrap();
        let next = d.create_net(&format!("l{i}"), top).unwrap();
        let (a, y) = (pin(&d, u, "A"), pin(&d, u, "Y"));
        d.connect(a, tail).unwrap();
        d.connect(y, next).unwrap();
        tail = next;
    }
    let join = d.create_instance("join", cells.and2, top).unwrap();
    let out = d.create_net("out", top).unwrap();
    let (a, b, y) = (pin(&d, join, "A"), pin(&d, join, "B"), pin(&d, join, "Y"));
    d.connect(a, shared).unwrap();
    d.connect(b, tail).unwrap();
    d.connect(y, out).unwrap();

    d.refresh();
    for cell in d.cells().collect::<Vec<_>>() {
        for &arc in &d.instance(cell).arcs {
            let arc = d.arc(arc);
            let (Some(from), Some(to)) = (d.pin(arc.from).net, d.pin(arc.to).net) else {
                continue;
            };
            assert!(
                d.net_order(from).unwrap() <= d.net_order(to).unwrap(),
                "{} -> {}",
                d.pin_path(arc.from),
                d.pin_path(arc.to)
            );
        }
    }
    assert_clean(&d);
}
