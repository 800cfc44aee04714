//! Conformance tests for interface aggregation, interface-backed ports,
//! and interface instantiation emission.

use quartz_codegen::{extract_interface_info, generate_verilog};
use quartz_ir::{Design, GeneratorId, InterfaceId, IrError, PortDirection};

fn bus_definition(design: &mut Design, width: u32) -> InterfaceId {
    let bus = design.interface_def("bus");
    design
        .interface_def_port(bus, "clk", PortDirection::In, 1)
        .unwrap();
    design.interface_def_var(bus, "data", width).unwrap();
    design
        .interface_def_modport(bus, "host", &["data"], &[])
        .unwrap();
    design
        .interface_def_modport(bus, "device", &[], &["data"])
        .unwrap();
    bus
}

fn instantiate_bus(design: &mut Design, g: GeneratorId, bus: InterfaceId) {
    design.interface_instance(g, bus, "bus_if").unwrap();
    let clk = design.port(g, PortDirection::In, "clk", 1).unwrap();
    let stmt = design
        .interface_instantiation(g, "bus_if", &[("clk", clk)])
        .unwrap();
    design.add_stmt(g, stmt).unwrap();
}

#[test]
fn one_definition_per_name() {
    let mut design = Design::new();
    let top = design.add_generator("top");
    let child = design.add_generator("child");
    let inst = design.instantiate(top, child, "u0", &[]).unwrap();
    design.add_stmt(top, inst).unwrap();

    let bus = bus_definition(&mut design, 8);
    instantiate_bus(&mut design, top, bus);
    instantiate_bus(&mut design, child, bus);

    let interfaces = extract_interface_info(&design).unwrap();
    assert_eq!(interfaces.len(), 1);
    let text = &interfaces["bus"];
    assert_eq!(
        text,
        "interface bus(\n\
         \x20 input logic clk\n\
         );\n\
         \x20 logic [7:0] data;\n\
         \x20 modport host(input data);\n\
         \x20 modport device(output data);\n\
         endinterface\n"
    );
    assert_eq!(text.matches("logic [7:0] data").count(), 1);
}

#[test]
fn structurally_equal_definitions_are_accepted() {
    let mut design = Design::new();
    let top = design.add_generator("top");
    let child = design.add_generator("child");
    let inst = design.instantiate(top, child, "u0", &[]).unwrap();
    design.add_stmt(top, inst).unwrap();

    // two distinct definition objects with identical structure
    let bus_a = bus_definition(&mut design, 8);
    let bus_b = bus_definition(&mut design, 8);
    instantiate_bus(&mut design, top, bus_a);
    instantiate_bus(&mut design, child, bus_b);

    let interfaces = extract_interface_info(&design).unwrap();
    assert_eq!(interfaces.len(), 1);
}

#[test]
fn conflicting_definitions_are_fatal() {
    let mut design = Design::new();
    let top = design.add_generator("top");
    let child = design.add_generator("child");
    let inst = design.instantiate(top, child, "u0", &[]).unwrap();
    design.add_stmt(top, inst).unwrap();

    let bus_a = bus_definition(&mut design, 8);
    let bus_b = bus_definition(&mut design, 16);
    instantiate_bus(&mut design, top, bus_a);
    instantiate_bus(&mut design, child, bus_b);

    let err = extract_interface_info(&design).unwrap_err();
    match err {
        IrError::InterfaceMismatch { message, .. } => {
            assert!(message.contains("top"), "message was: {message}");
            assert!(message.contains("child"), "message was: {message}");
        }
        other => panic!("expected InterfaceMismatch, got {other:?}"),
    }
}

#[test]
fn empty_modport_is_fatal() {
    let mut design = Design::new();
    let top = design.add_generator("top");
    let bus = design.interface_def("bus");
    design.interface_def_var(bus, "data", 8).unwrap();
    design.interface_def_modport(bus, "idle", &[], &[]).unwrap();
    instantiate_bus_without_ports(&mut design, top, bus);

    let err = extract_interface_info(&design).unwrap_err();
    assert!(matches!(err, IrError::InvariantViolation { .. }));
}

fn instantiate_bus_without_ports(design: &mut Design, g: GeneratorId, bus: InterfaceId) {
    design.interface_instance(g, bus, "bus_if").unwrap();
    let stmt = design.interface_instantiation(g, "bus_if", &[]).unwrap();
    design.add_stmt(g, stmt).unwrap();
}

#[test]
fn interface_ports_collapse_in_the_port_list() {
    let mut design = Design::new();
    let m = design.add_generator("consumer");
    let bus = bus_definition(&mut design, 8);
    design.interface_port(m, bus, "bus_if", None).unwrap();
    design.port(m, PortDirection::In, "clk", 1).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["consumer"];
    assert!(
        text.starts_with(
            "module consumer (\n\
             \x20 bus bus_if,\n\
             \x20 input logic clk\n\
             );\n"
        ),
        "port list was:\n{text}"
    );
}

#[test]
fn interface_instantiation_emits_before_statements() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let bus = bus_definition(&mut design, 8);
    instantiate_bus(&mut design, m, bus);

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    assert!(
        text.contains("bus bus_if (\n\x20 .clk(clk)\n);\n"),
        "interface instantiation missing in:\n{text}"
    );
}

#[test]
fn interface_connection_appends_the_modport() {
    let mut design = Design::new();
    let parent = design.add_generator("parent");
    let child = design.add_generator("child");
    let bus = bus_definition(&mut design, 8);
    let p_bus = design.interface_port(parent, bus, "p_bus", None).unwrap();
    design
        .interface_port(child, bus, "c_bus", Some("host"))
        .unwrap();
    let inst = design
        .instantiate(parent, child, "u0", &[("c_bus", p_bus)])
        .unwrap();
    design.add_stmt(parent, inst).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["parent"];
    assert!(
        text.contains(".c_bus(p_bus.host)"),
        "modport suffix missing in:\n{text}"
    );
}

#[test]
fn interface_signals_drive_logic_without_extra_declarations() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let bus = bus_definition(&mut design, 8);
    instantiate_bus(&mut design, m, bus);
    let data = design.interface_signal(m, "bus_if", "data").unwrap();
    let out = design.port(m, PortDirection::Out, "out", 8).unwrap();
    let assign = design
        .assign(m, out, data, quartz_ir::AssignKind::Undefined)
        .unwrap();
    design.add_stmt(m, assign).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    assert!(text.contains("assign out = bus_if.data;"));
    // the proxy is not declared as a module-level variable
    assert!(!text.contains("logic [7:0] bus_if.data;"));
}
