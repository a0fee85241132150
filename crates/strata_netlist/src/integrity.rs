//! Referential-integrity checker.
//!
//! [`Design::check_integrity`] walks every record and reports each violated
//! structural invariant as an error diagnostic. A design built only through
//! the public mutation API never produces any.

use crate::arc::ArcKind;
use crate::design::Design;
use crate::ids::{InstanceId, NetId, PinId};
use crate::instance::InstanceKind;
use strata_common::{InternalError, StrataResult};
use strata_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use strata_library::PinDirection;

const PIN_OWNERSHIP: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 101);
const PIN_NET_SYMMETRY: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 102);
const DIRECTION_COUNTS: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 103);
const DRIVER_CACHE: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 104);
const LIBRARY_INTERFACE: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 105);
const ARC_DIRECTION: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 106);
const MODULE_MEMBERSHIP: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 107);
const COMBINATIONAL_CYCLE: DiagnosticCode = DiagnosticCode::new(Category::Topology, 1);

struct Checker<'a> {
    design: &'a Design,
    sink: &'a DiagnosticSink,
    count: usize,
}

impl Checker<'_> {
    fn report(&mut self, code: DiagnosticCode, message: String, subject: String) {
        self.sink
            .emit(Diagnostic::error(code, message).with_subject(subject));
        self.count += 1;
    }

    fn instance(&mut self, id: InstanceId) {
        let d = self.design;
        let inst = &d.instances[id];
        let name = d.instance_name(id).to_string();

        let siblings = &d.modules[inst.parent].instances;
        if siblings.get(inst.index_in_parent as usize) != Some(&id) {
            self.report(
                MODULE_MEMBERSHIP,
                format!("instance is not at index {} of its module", inst.index_in_parent),
                name.clone(),
            );
        }

        for (index, &pin) in inst.pins.iter().enumerate() {
            let Some(p) = d.pins.try_get(pin) else {
                self.report(PIN_OWNERSHIP, format!("pin {index} was released"), name.clone());
                continue;
            };
            if p.instance != id || p.index as usize != index {
                self.report(
                    PIN_OWNERSHIP,
                    format!("pin {index} points back to a different owner or position"),
                    name.clone(),
                );
            }
            if inst.pins.iter().filter(|&&q| q == pin).count() != 1 {
                self.report(PIN_OWNERSHIP, format!("pin {index} is listed twice"), name.clone());
            }
        }

        if let InstanceKind::Cell { library_cell } = inst.kind {
            let lib = &d.library;
            let template = lib.pins(library_cell);
            if template.len() != inst.pins.len() {
                self.report(
                    LIBRARY_INTERFACE,
                    format!(
                        "has {} pins but library cell '{}' declares {}",
                        inst.pins.len(),
                        lib.cell_name(library_cell),
                        template.len()
                    ),
                    name.clone(),
                );
            } else {
                for (&pin, &lib_pin) in inst.pins.iter().zip(template) {
                    if d.pins.try_get(pin).map(|p| p.direction) != Some(lib.pin(lib_pin).direction)
                    {
                        self.report(
                            LIBRARY_INTERFACE,
                            format!(
                                "pin '{}' direction differs from the library",
                                lib.pin_name(lib_pin)
                            ),
                            name.clone(),
                        );
                    }
                }
            }
        }
    }

    fn pin(&mut self, id: PinId) {
        let d = self.design;
        let p = &d.pins[id];
        let owned = d
            .instances
            .try_get(p.instance)
            .is_some_and(|inst| inst.pins.contains(&id));
        if !owned {
            self.report(
                PIN_OWNERSHIP,
                "pin is not listed by its instance".to_string(),
                format!("pin {}", id.as_raw()),
            );
            return;
        }
        if let Some(net) = p.net {
            let listed = d
                .nets
                .try_get(net)
                .map_or(0, |n| n.pins.iter().filter(|&&q| q == id).count());
            if listed != 1 {
                self.report(
                    PIN_NET_SYMMETRY,
                    format!("pin appears {listed} time(s) in its net"),
                    d.pin_path(id),
                );
            }
        }
    }

    fn net(&mut self, id: NetId) {
        let d = self.design;
        let net = &d.nets[id];
        let name = d.net_name(id).to_string();

        if d.modules[net.parent].nets.get(net.index_in_parent as usize) != Some(&id) {
            self.report(
                MODULE_MEMBERSHIP,
                format!("net is not at index {} of its module", net.index_in_parent),
                name.clone(),
            );
        }

        for (index, &pin) in net.pins.iter().enumerate() {
            let ok = d
                .pins
                .try_get(pin)
                .is_some_and(|p| p.net == Some(id) && p.index_in_net as usize == index);
            if !ok {
                self.report(
                    PIN_NET_SYMMETRY,
                    format!("member {index} does not point back to this net"),
                    name.clone(),
                );
            }
        }

        for direction in PinDirection::ALL {
            let actual = net
                .pins
                .iter()
                .filter(|&&p| d.pins.try_get(p).is_some_and(|p| p.direction == direction))
                .count() as u32;
            let counted = net.counts.get(direction);
            if actual != counted {
                self.report(
                    DIRECTION_COUNTS,
                    format!("counts {counted} {direction} pin(s) but has {actual}"),
                    name.clone(),
                );
            }
        }

        let has_output = net
            .pins
            .iter()
            .any(|&p| d.pins.try_get(p).is_some_and(|p| p.is_driver()));
        let driver_ok = match net.driver {
            Some(driver) => {
                net.pins.contains(&driver)
                    && d.pins.try_get(driver).is_some_and(|p| p.is_driver())
            }
            None => !has_output,
        };
        if !driver_ok {
            self.report(
                DRIVER_CACHE,
                "cached driver is not an output pin of the net".to_string(),
                name,
            );
        }
    }

    fn arcs(&mut self) {
        let d = self.design;
        for (id, arc) in d.arcs.iter() {
            let (Some(from), Some(to)) = (d.pins.try_get(arc.from), d.pins.try_get(arc.to)) else {
                self.report(
                    ARC_DIRECTION,
                    "arc endpoint was released".to_string(),
                    format!("arc {}", id.as_raw()),
                );
                continue;
            };
            let valid = match arc.kind {
                ArcKind::Instance { .. } => {
                    from.instance == to.instance
                        && from.direction == PinDirection::Input
                        && to.direction == PinDirection::Output
                }
                ArcKind::Net { net } => {
                    from.net == Some(net) && to.net == Some(net) && from.is_driver() && to.is_sink()
                }
            };
            if !valid {
                self.report(
                    ARC_DIRECTION,
                    "arc does not run from a driver to a sink".to_string(),
                    format!("{} -> {}", d.pin_path(arc.from), d.pin_path(arc.to)),
                );
            }
        }
    }
}

impl Design {
    /// Checks every structural invariant, reporting each violation to `sink`.
    ///
    /// Returns the number of violations found. Cycles recorded by the last
    /// topology pass are reported as warnings and not counted.
    pub fn check_integrity(&self, sink: &DiagnosticSink) -> usize {
        let mut checker = Checker {
            design: self,
            sink,
            count: 0,
        };
        for id in self.instances.ids() {
            checker.instance(id);
        }
        for id in self.pins.ids() {
            checker.pin(id);
        }
        for id in self.nets.ids() {
            checker.net(id);
        }
        checker.arcs();
        // Cycles are legal netlists; they only block ordering.
        if let Some(topology) = self.cached_topology() {
            for &(from, to) in topology.cycle_arcs() {
                sink.emit(
                    Diagnostic::warning(COMBINATIONAL_CYCLE, "combinational cycle")
                        .with_subject(self.pin_path(to))
                        .with_note(format!(
                            "edge {} -> {} closes the cycle",
                            self.pin_path(from),
                            self.pin_path(to)
                        )),
                );
            }
        }
        if checker.count > 0 {
            tracing::warn!(violations = checker.count, design = %self.name, "integrity check failed");
        }
        checker.count
    }

    /// Runs the integrity checker and turns the first violation into an
    /// [`InternalError`].
    ///
    /// Intended for debug assertions in hosts that only mutate through the
    /// public API, where any violation is a bug in the database itself.
    pub fn verify(&self) -> StrataResult<()> {
        let sink = DiagnosticSink::new();
        if self.check_integrity(&sink) == 0 {
            return Ok(());
        }
        let first = sink.take_all().into_iter().next();
        Err(match first {
            Some(diag) => InternalError::new(format!(
                "{}: {} ({})",
                diag.code,
                diag.message,
                diag.subject.unwrap_or_default()
            )),
            None => InternalError::new("integrity check failed"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_library::LibraryCellDef;

    fn small_design() -> (Design, NetId, PinId) {
        let mut d = Design::new("top");
        let inv = d
            .register_library_cell(
                &LibraryCellDef::new("INV")
                    .pin("A", PinDirection::Input)
                    .pin("Y", PinDirection::Output)
                    .arc("A", "Y"),
            )
            .unwrap();
        let top = d.top_module();
        let u1 = d.create_instance("u1", inv, top).unwrap();
        let u2 = d.create_instance("u2", inv, top).unwrap();
        let n = d.create_net("n", top).unwrap();
        let y = d.pin_by_name(u1, "Y").unwrap();
        d.connect(y, n).unwrap();
        d.connect(d.pin_by_name(u2, "A").unwrap(), n).unwrap();
        (d, n, y)
    }

    #[test]
    fn clean_design_passes() {
        let (d, _, _) = small_design();
        let sink = DiagnosticSink::new();
        assert_eq!(d.check_integrity(&sink), 0);
        assert!(!sink.has_errors());
    }

    #[test]
    fn corrupted_driver_cache_is_reported() {
        let (mut d, n, _) = small_design();
        d.nets[n].driver = None;
        let sink = DiagnosticSink::new();
        assert_eq!(d.check_integrity(&sink), 1);
        let diags = sink.take_all();
        assert_eq!(diags[0].code, DRIVER_CACHE);
        assert_eq!(diags[0].subject.as_deref(), Some("n"));
    }

    #[test]
    fn cached_cycles_are_warnings() {
        let (mut d, _, _) = small_design();
        let u1 = d.find_instance("u1").unwrap();
        let u2 = d.find_instance("u2").unwrap();
        let top = d.top_module();
        let back = d.create_net("back", top).unwrap();
        let u2_y = d.pin_by_name(u2, "Y").unwrap();
        let u1_a = d.pin_by_name(u1, "A").unwrap();
        d.connect(u2_y, back).unwrap();
        d.connect(u1_a, back).unwrap();
        assert!(d.has_combinational_cycle());

        let sink = DiagnosticSink::new();
        assert_eq!(d.check_integrity(&sink), 0);
        assert!(!sink.has_errors());
        assert_eq!(sink.count_with_code(COMBINATIONAL_CYCLE), 1);
    }

    #[test]
    fn verify_turns_violations_into_internal_errors() {
        let (mut d, n, _) = small_design();
        assert!(d.verify().is_ok());
        d.nets[n].driver = None;
        let err = d.verify().unwrap_err();
        assert!(err.message.starts_with("N104"));
    }

    #[test]
    fn corrupted_counts_are_reported() {
        let (mut d, n, _) = small_design();
        d.nets[n].counts.increment(PinDirection::Input);
        let sink = DiagnosticSink::new();
        assert_eq!(d.check_integrity(&sink), 1);
        assert_eq!(sink.take_all()[0].code, DIRECTION_COUNTS);
    }

    #[test]
    fn broken_back_link_is_reported() {
        let (mut d, _, y) = small_design();
        d.pins[y].net = None;
        let sink = DiagnosticSink::new();
        assert!(d.check_integrity(&sink) >= 1);
        assert!(sink
            .take_all()
            .iter()
            .any(|diag| diag.code == PIN_NET_SYMMETRY));
    }
}
