//! Conformance tests for module emission: exact output for the core
//! statement shapes, ordering properties, and the debug line map.

use quartz_codegen::{create_stub, generate_verilog, generate_verilog_debug};
use quartz_ir::{AssignKind, Design, EdgeType, ExprOp, IrError, PortDirection};

#[test]
fn top_level_assign_exact_output() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let a = design.port(m, PortDirection::In, "a", 4).unwrap();
    let b = design.port(m, PortDirection::Out, "b", 4).unwrap();
    let one = design.constant(m, 1, 4, false).unwrap();
    let sum = design.binary(m, ExprOp::Add, a, one).unwrap();
    let assign = design.assign(m, b, sum, AssignKind::Undefined).unwrap();
    design.add_stmt(m, assign).unwrap();

    let sources = generate_verilog(&design).unwrap();
    assert_eq!(
        sources["m"],
        "module m (\n\
         \x20 input logic [3:0] a,\n\
         \x20 output logic [3:0] b\n\
         );\n\
         \n\
         assign b = a + 4'h1;\n\
         endmodule   // m\n"
    );
}

#[test]
fn sequential_block_with_nonblocking_assign() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let clk = design.port(m, PortDirection::In, "clk", 1).unwrap();
    let d = design.port(m, PortDirection::In, "d", 4).unwrap();
    let q = design.port(m, PortDirection::Out, "q", 4).unwrap();
    let ff = design.seq_block(m, &[(EdgeType::Posedge, clk)]).unwrap();
    let assign = design.assign(m, q, d, AssignKind::NonBlocking).unwrap();
    design.add_to_block(ff, assign).unwrap();
    design.add_stmt(m, ff).unwrap();

    let sources = generate_verilog(&design).unwrap();
    assert_eq!(
        sources["m"],
        "module m (\n\
         \x20 input logic clk,\n\
         \x20 input logic [3:0] d,\n\
         \x20 output logic [3:0] q\n\
         );\n\
         \n\
         \n\
         always_ff @(posedge clk) begin\n\
         \x20 q <= d;\n\
         end\n\
         endmodule   // m\n"
    );

    // requesting the same assignment again yields the same node
    let again = design.assign(m, q, d, AssignKind::NonBlocking).unwrap();
    assert_eq!(again, assign);
}

#[test]
fn else_if_is_flattened() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let a = design.port(m, PortDirection::In, "a", 1).unwrap();
    let b = design.port(m, PortDirection::In, "b", 1).unwrap();
    let x = design.var(m, "x", 2).unwrap();

    let comb = design.comb_block(m);
    let one = design.constant(m, 1, 2, false).unwrap();
    let two = design.constant(m, 2, 2, false).unwrap();
    let three = design.constant(m, 3, 2, false).unwrap();

    let outer = design.if_stmt(m, a).unwrap();
    let s1 = design.assign(m, x, one, AssignKind::Undefined).unwrap();
    let outer_then = design.then_body(outer).unwrap();
    design.add_to_block(outer_then, s1).unwrap();

    let inner = design.if_stmt(m, b).unwrap();
    let s2 = design.assign(m, x, two, AssignKind::Undefined).unwrap();
    let inner_then = design.then_body(inner).unwrap();
    design.add_to_block(inner_then, s2).unwrap();
    let s3 = design.assign(m, x, three, AssignKind::Undefined).unwrap();
    let inner_else = design.else_body(inner).unwrap();
    design.add_to_block(inner_else, s3).unwrap();

    let outer_else = design.else_body(outer).unwrap();
    design.add_to_block(outer_else, inner).unwrap();
    design.add_to_block(comb, outer).unwrap();
    design.add_stmt(m, comb).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    let expected_block = "always_comb begin\n\
                          \x20 if (a) begin\n\
                          \x20   x = 2'h1;\n\
                          \x20 end\n\
                          \x20 else if (b) begin\n\
                          \x20   x = 2'h2;\n\
                          \x20 end\n\
                          \x20 else x = 2'h3;\n\
                          end\n";
    assert!(
        text.contains(expected_block),
        "flattened else-if missing in:\n{text}"
    );
    assert!(!text.contains("else begin\n    if"));
}

#[test]
fn switch_sorts_cases_and_renders_empty_default() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let s = design.port(m, PortDirection::In, "s", 2).unwrap();
    let x = design.var(m, "x", 2).unwrap();
    let y = design.var(m, "y", 2).unwrap();

    let comb = design.comb_block(m);
    let sw = design.switch_stmt(m, s).unwrap();

    // insert out of order; emission sorts ascending with default last
    let k1 = design.constant(m, 1, 2, false).unwrap();
    let arm1 = design.switch_case(sw, Some(k1)).unwrap();
    let v1 = design.constant(m, 1, 2, false).unwrap();
    let a1 = design.assign(m, y, v1, AssignKind::Undefined).unwrap();
    design.add_to_block(arm1, a1).unwrap();

    design.switch_case(sw, None).unwrap();

    let k0 = design.constant(m, 0, 2, false).unwrap();
    let arm0 = design.switch_case(sw, Some(k0)).unwrap();
    let v0 = design.constant(m, 2, 2, false).unwrap();
    let a0 = design.assign(m, x, v0, AssignKind::Undefined).unwrap();
    design.add_to_block(arm0, a0).unwrap();

    design.add_to_block(comb, sw).unwrap();
    design.add_stmt(m, comb).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    let expected = "\x20 unique case (s)\n\
                    \x20   2'h0: x = 2'h2;\n\
                    \x20   2'h1: y = 2'h1;\n\
                    \x20   default: begin end\n\
                    \x20 endcase\n";
    assert!(text.contains(expected), "switch body missing in:\n{text}");
}

#[test]
fn empty_non_default_case_is_fatal() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let s = design.port(m, PortDirection::In, "s", 2).unwrap();
    let comb = design.comb_block(m);
    let sw = design.switch_stmt(m, s).unwrap();
    let k0 = design.constant(m, 0, 2, false).unwrap();
    design.switch_case(sw, Some(k0)).unwrap();
    design.add_to_block(comb, sw).unwrap();
    design.add_stmt(m, comb).unwrap();

    let err = generate_verilog(&design).unwrap_err();
    assert!(matches!(err, IrError::InvariantViolation { .. }));
}

#[test]
fn const_literals_round_trip() {
    fn parse_literal(text: &str) -> (u32, i64) {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (width, hex) = rest.split_once("'h").unwrap();
        let magnitude = i64::from_str_radix(hex, 16).unwrap();
        (
            width.parse().unwrap(),
            if negative { -magnitude } else { magnitude },
        )
    }

    let mut design = Design::new();
    let m = design.add_generator("m");
    for &(value, width, signed) in &[
        (127i64, 8u32, true),
        (-128, 8, true),
        (255, 8, false),
        (0, 1, false),
        (1, 4, false),
    ] {
        let c = design.constant(m, value, width, signed).unwrap();
        let text = design.var_text(c);
        let (parsed_width, parsed_value) = parse_literal(&text);
        assert_eq!(parsed_width, width, "width of {text}");
        assert_eq!(parsed_value, value, "value of {text}");
    }
    let c = design.constant(m, 127, 8, true).unwrap();
    assert_eq!(design.var_text(c), "8'h7F");
}

#[test]
fn ports_emit_in_ascending_name_order() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    for name in ["zeta", "alpha", "mid"] {
        design.port(m, PortDirection::In, name, 1).unwrap();
    }
    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    let alpha = text.find("input logic alpha").unwrap();
    let mid = text.find("input logic mid").unwrap();
    let zeta = text.find("input logic zeta").unwrap();
    assert!(alpha < mid && mid < zeta);
}

#[test]
fn emission_is_deterministic() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let clk = design.port(m, PortDirection::In, "clk", 1).unwrap();
    let d = design.port(m, PortDirection::In, "d", 8).unwrap();
    let q = design.port(m, PortDirection::Out, "q", 8).unwrap();
    let ff = design.seq_block(m, &[(EdgeType::Posedge, clk)]).unwrap();
    let assign = design.assign(m, q, d, AssignKind::NonBlocking).unwrap();
    design.add_to_block(ff, assign).unwrap();
    design.add_stmt(m, ff).unwrap();

    let first = generate_verilog(&design).unwrap();
    let second = generate_verilog(&design).unwrap();
    assert_eq!(first, second);
}

#[test]
fn long_right_hand_sides_wrap_with_hanging_indent() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let mut expr = design
        .var(m, "extremely_long_signal_name_number_0", 8)
        .unwrap();
    for index in 1..6 {
        let name = format!("extremely_long_signal_name_number_{index}");
        let next = design.var(m, &name, 8).unwrap();
        expr = design.binary(m, ExprOp::Add, expr, next).unwrap();
    }
    let out = design.var(m, "out", 8).unwrap();
    let assign = design.assign(m, out, expr, AssignKind::Undefined).unwrap();
    design.add_stmt(m, assign).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    let lines: Vec<&str> = text.lines().collect();
    let first = lines
        .iter()
        .position(|l| l.starts_with("assign out = "))
        .unwrap();
    assert!(
        !lines[first].ends_with(';'),
        "expected the right-hand side to wrap:\n{text}"
    );
    assert!(
        lines[first + 1].starts_with("    "),
        "continuation lines should carry a four-space hanging indent:\n{text}"
    );
}

#[test]
fn enum_typedef_and_enum_variable() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    design
        .enum_def(m, "state_t", 2, &[("BUSY", 1), ("IDLE", 0)])
        .unwrap();
    design.enum_var(m, "state", "state_t").unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    let expected = "typedef enum logic[1:0] {\n\
                    \x20 IDLE = 2'h0,\n\
                    \x20 BUSY = 2'h1\n\
                    } state_t;\n\
                    state_t state;\n";
    assert!(text.contains(expected), "enum block missing in:\n{text}");
}

#[test]
fn module_instantiation_with_parameters() {
    let mut design = Design::new();
    let parent = design.add_generator("parent");
    let child = design.add_generator("child");
    design.port(child, PortDirection::In, "a", 4).unwrap();
    design.port(child, PortDirection::Out, "b", 4).unwrap();
    design.param(child, "WIDTH", 4).unwrap();
    let x = design.var(parent, "x", 4).unwrap();
    let y = design.var(parent, "y", 4).unwrap();
    let inst = design
        .instantiate(parent, child, "child_inst", &[("a", x), ("b", y)])
        .unwrap();
    design.add_stmt(parent, inst).unwrap();

    let sources = generate_verilog(&design).unwrap();
    assert!(sources.contains_key("parent"));
    assert!(sources.contains_key("child"));
    let text = &sources["parent"];
    let expected = "child #(\n\
                    \x20 .WIDTH(4)) child_inst (\n\
                    \x20 .a(x),\n\
                    \x20 .b(y)\n\
                    );\n";
    assert!(text.contains(expected), "instantiation missing in:\n{text}");
}

#[test]
fn chained_parameter_uses_parent_name() {
    let mut design = Design::new();
    let parent = design.add_generator("parent");
    let child = design.add_generator("child");
    let p = design.param(parent, "P", 8).unwrap();
    let w = design.param(child, "WIDTH", 8).unwrap();
    design.set_param_parent(w, p).unwrap();
    let inst = design.instantiate(parent, child, "u0", &[]).unwrap();
    design.add_stmt(parent, inst).unwrap();

    let sources = generate_verilog(&design).unwrap();
    assert!(sources["parent"].contains(".WIDTH(P)"));
}

#[test]
fn chained_parameter_from_foreign_generator_is_fatal() {
    let mut design = Design::new();
    let parent = design.add_generator("parent");
    let child = design.add_generator("child");
    let other = design.add_generator("other");
    let foreign = design.param(other, "Q", 8).unwrap();
    let w = design.param(child, "WIDTH", 8).unwrap();
    design.set_param_parent(w, foreign).unwrap();
    let inst = design.instantiate(parent, child, "u0", &[]).unwrap();
    design.add_stmt(parent, inst).unwrap();

    let err = generate_verilog(&design).unwrap_err();
    assert!(matches!(err, IrError::UnresolvedParam { .. }));
}

#[test]
fn function_declaration_and_call() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let f = design.function_block(m, "clamp").unwrap();
    design.function_port(f, "x", 8, false).unwrap();
    let value = design.var(m, "value", 8).unwrap();
    let ret = design.return_stmt(m, value).unwrap();
    design.add_to_block(f, ret).unwrap();

    let call = design.function_call(m, "clamp", &[value]).unwrap();
    let call_stmt = design.function_call_stmt(m, call).unwrap();
    let initial = design.initial_block(m);
    design.add_to_block(initial, call_stmt).unwrap();
    design.add_stmt(m, initial).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    let expected = "function clamp(\n\
                    \x20 input logic [7:0] x\n\
                    );\n\
                    begin\n\
                    \x20 return value;\n\
                    end\n\
                    endfunction\n";
    assert!(text.contains(expected), "function missing in:\n{text}");
    assert!(text.contains("initial begin\n  clamp (value);\nend\n"));
}

#[test]
fn function_call_statement_rejected_at_top_level() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let value = design.var(m, "value", 8).unwrap();
    let call = design.function_call(m, "f", &[value]).unwrap();
    let call_stmt = design.function_call_stmt(m, call).unwrap();
    design.add_stmt(m, call_stmt).unwrap();

    let err = generate_verilog(&design).unwrap_err();
    assert!(matches!(err, IrError::InvariantViolation { .. }));
}

#[test]
fn input_self_drive_is_fatal() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let a = design.port(m, PortDirection::In, "a", 4).unwrap();
    let x = design.var(m, "x", 4).unwrap();
    let assign = design.assign(m, a, x, AssignKind::Undefined).unwrap();
    design.add_stmt(m, assign).unwrap();

    let err = generate_verilog(&design).unwrap_err();
    assert!(matches!(err, IrError::InvariantViolation { .. }));
}

#[test]
fn external_generators_are_skipped() {
    let mut design = Design::new();
    let top = design.add_generator("top");
    let ext = design.add_generator("blackbox");
    design.set_external(ext, true);
    let inst = design.instantiate(top, ext, "u0", &[]).unwrap();
    design.add_stmt(top, inst).unwrap();

    let sources = generate_verilog(&design).unwrap();
    assert!(sources.contains_key("top"));
    assert!(!sources.contains_key("blackbox"));
}

#[test]
fn labeled_blocks_carry_their_label() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let x = design.var(m, "x", 1).unwrap();
    let one = design.constant(m, 1, 1, false).unwrap();
    let comb = design.comb_block(m);
    design.set_block_label(comb, "logic_main").unwrap();
    let assign = design.assign(m, x, one, AssignKind::Undefined).unwrap();
    design.add_to_block(comb, assign).unwrap();
    design.add_stmt(m, comb).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    assert!(text.contains("always_comb begin :logic_main\n"));
    assert!(text.contains("end :logic_main\n"));
}

#[test]
fn comments_precede_their_statement() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    let x = design.var(m, "x", 4).unwrap();
    design.set_var_comment(x, "scratch\nregister");
    let y = design.var(m, "y", 4).unwrap();
    let assign = design.assign(m, x, y, AssignKind::Undefined).unwrap();
    design.set_stmt_comment(assign, "forwarding");
    design.add_stmt(m, assign).unwrap();

    let sources = generate_verilog(&design).unwrap();
    let text = &sources["m"];
    assert!(text.contains("// scratchregister\nlogic [3:0] x;\n"));
    assert!(text.contains("// forwarding\nassign x = y;\n"));
}

#[test]
fn debug_flag_records_line_numbers() {
    let mut design = Design::new();
    let m = design.add_generator("m");
    design.set_debug(m, true);
    let a = design.port(m, PortDirection::In, "a", 4).unwrap();
    let b = design.port(m, PortDirection::Out, "b", 4).unwrap();
    let assign = design.assign(m, b, a, AssignKind::Undefined).unwrap();
    design.add_stmt(m, assign).unwrap();

    let (sources, debug) = generate_verilog_debug(&design).unwrap();
    let text = &sources["m"];
    // the assign lands on line 6: header, two ports, `);`, blank, assign
    assert_eq!(text.lines().nth(5).unwrap(), "assign b = a;");
    assert_eq!(debug.stmt_lines[&(m, assign.stmt)], 6);
    assert_eq!(debug.var_lines[&(a.generator, a.var)], 2);
}

#[test]
fn stub_repeats_the_port_list_only() {
    let mut design = Design::new();
    let top = design.add_generator("top");
    design.port(top, PortDirection::In, "a", 4).unwrap();
    design.port(top, PortDirection::Out, "b", 4).unwrap();
    let x = design.var(top, "x", 4).unwrap();
    let y = design.var(top, "y", 4).unwrap();
    let assign = design.assign(top, x, y, AssignKind::Undefined).unwrap();
    design.add_stmt(top, assign).unwrap();

    let stub = create_stub(&design).unwrap();
    assert_eq!(
        stub,
        "module top (\n\
         \x20 input logic [3:0] a,\n\
         \x20 output logic [3:0] b\n\
         );\n\
         \n\
         endmodule   // top\n"
    );
}
