//! End-to-end tests: check, compile, serialize and execute whole programs.

use pretty_assertions::assert_eq;

use super::*;
use crate::ast::*;
use crate::error::RuntimeError;
use crate::types::{TypeChecker, TypeEnvironment};

fn build(statements: Vec<Stmt>) -> Chunk {
    let program = Program::new(statements);
    let mut checker = TypeChecker::new();
    checker.check(&program).expect("program should type check");
    let env: TypeEnvironment = checker.into_environment();
    Compiler::new(&env)
        .compile(&program)
        .expect("program should compile")
}

fn execute(code: &[Instruction], input: &str) -> (VMResult<()>, String) {
    let mut vm = VM::new(input.as_bytes(), Vec::new());
    let result = vm.run(code);
    (result, String::from_utf8(vm.into_output()).unwrap())
}

fn add(left: Expr, right: Expr) -> Expr {
    Expr::binary(left, BinaryOp::Add, right)
}

fn less(left: Expr, right: Expr) -> Expr {
    Expr::binary(left, BinaryOp::Less, right)
}

#[test]
fn test_declaration_initializes_defaults() {
    let chunk = build(vec![
        Stmt::declare("int", ["a"]),
        Stmt::declare("float", ["b"]),
        Stmt::declare("bool", ["c"]),
        Stmt::declare("string", ["d"]),
    ]);

    let expected = [
        ("a", Value::Int(0)),
        ("b", Value::Float(0.0)),
        ("c", Value::Bool(false)),
        ("d", Value::String(String::new())),
    ];
    for (index, (name, default)) in expected.into_iter().enumerate() {
        let pair = &chunk.code[index * 2..index * 2 + 2];
        assert_eq!(pair[0].opcode, OpCode::Push);
        assert_eq!(pair[1].opcode, OpCode::Save);
        assert_eq!(pair[1].operand.as_deref(), Some(name));

        let mut vm = VM::new(&b""[..], Vec::new());
        vm.run(pair).unwrap();
        assert_eq!(vm.variable(name), Some(&default));
    }
}

#[test]
fn test_int_literal_into_float_inserts_one_itof() {
    let chunk = build(vec![
        Stmt::declare("float", ["x"]),
        Stmt::expression(Expr::assign("x", Expr::int(7))),
    ]);
    let code: Vec<String> = chunk.iter().skip(2).map(|i| i.to_string()).collect();
    assert_eq!(code[..3].to_vec(), vec!["push i 7", "itof", "save f x"]);
    assert_eq!(
        chunk.iter().filter(|i| i.opcode == OpCode::Itof).count(),
        1
    );
}

#[test]
fn test_assignment_statement_is_stack_neutral() {
    let chunk = build(vec![
        Stmt::declare("int", ["a"]),
        Stmt::declare("float", ["f"]),
        Stmt::expression(Expr::assign("a", add(Expr::int(2), Expr::int(3)))),
        Stmt::expression(Expr::assign("f", Expr::variable("a"))),
        Stmt::expression(less(Expr::variable("a"), Expr::variable("f"))),
    ]);
    let mut vm = VM::new(&b""[..], Vec::new());
    vm.run_chunk(&chunk).unwrap();
    assert!(vm.stack().is_empty());
    assert_eq!(vm.variable("f"), Some(&Value::Float(5.0)));
}

#[test]
fn test_chained_assignment_updates_innermost_first() {
    // i = j = k = 55;
    let chunk = build(vec![
        Stmt::declare("int", ["i", "j", "k"]),
        Stmt::expression(Expr::assign(
            "i",
            Expr::assign("j", Expr::assign("k", Expr::int(55))),
        )),
    ]);

    let saves: Vec<&str> = chunk
        .iter()
        .skip(6)
        .filter(|i| i.opcode == OpCode::Save)
        .filter_map(|i| i.operand.as_deref())
        .collect();
    assert_eq!(saves, vec!["k", "j", "i"]);

    let mut vm = VM::new(&b""[..], Vec::new());
    vm.run_chunk(&chunk).unwrap();
    for name in ["i", "j", "k"] {
        assert_eq!(vm.variable(name), Some(&Value::Int(55)));
    }
    assert!(vm.stack().is_empty());
}

#[test]
fn test_while_loop_runs_three_times() {
    let chunk = build(vec![
        Stmt::declare("int", ["a"]),
        Stmt::expression(Expr::assign("a", Expr::int(0))),
        Stmt::while_loop(
            less(Expr::variable("a"), Expr::int(3)),
            Stmt::block(vec![
                Stmt::expression(Expr::assign("a", add(Expr::variable("a"), Expr::int(1)))),
                Stmt::write(vec![Expr::string("pass "), Expr::variable("a")]),
            ]),
        ),
    ]);
    let mut vm = VM::new(&b""[..], Vec::new());
    vm.run_chunk(&chunk).unwrap();
    assert_eq!(vm.variable("a"), Some(&Value::Int(3)));
    assert_eq!(
        String::from_utf8(vm.into_output()).unwrap(),
        "pass 1\npass 2\npass 3\n"
    );
}

#[test]
fn test_write_prints_in_argument_order() {
    let chunk = build(vec![
        Stmt::declare("int", ["a", "b"]),
        Stmt::expression(Expr::assign("a", Expr::int(1))),
        Stmt::expression(Expr::assign("b", Expr::int(2))),
        Stmt::write(vec![Expr::variable("a"), Expr::variable("b")]),
    ]);
    let (result, output) = execute(chunk.instructions(), "");
    result.unwrap();
    assert_eq!(output, "12\n");
}

#[test]
fn test_division_by_zero_halts_run() {
    let chunk = build(vec![
        Stmt::write(vec![Expr::string("before")]),
        Stmt::write(vec![Expr::binary(Expr::int(5), BinaryOp::Divide, Expr::int(0))]),
        Stmt::write(vec![Expr::string("after")]),
    ]);
    let (result, output) = execute(chunk.instructions(), "");
    assert!(matches!(result, Err(RuntimeError::DivisionByZero)));
    assert_eq!(output, "before\n");
}

#[test]
fn test_for_loop_with_mixed_comparison() {
    // for (i = 0; i < limit; i = i + 1) write i;   with limit a float
    let chunk = build(vec![
        Stmt::declare("int", ["i"]),
        Stmt::declare("float", ["limit"]),
        Stmt::expression(Expr::assign("limit", Expr::float(2.5))),
        Stmt::for_loop(
            Some(Expr::assign("i", Expr::int(0))),
            Some(less(Expr::variable("i"), Expr::variable("limit"))),
            Some(Expr::assign("i", add(Expr::variable("i"), Expr::int(1)))),
            Stmt::write(vec![Expr::variable("i")]),
        ),
    ]);
    let (result, output) = execute(chunk.instructions(), "");
    result.unwrap();
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn test_if_else_and_not_equal() {
    let program = |n: i64| {
        build(vec![
            Stmt::declare("int", ["n"]),
            Stmt::expression(Expr::assign("n", Expr::int(n))),
            Stmt::if_else(
                Expr::binary(
                    Expr::binary(Expr::variable("n"), BinaryOp::Modulo, Expr::int(2)),
                    BinaryOp::NotEqual,
                    Expr::int(0),
                ),
                Stmt::write(vec![Expr::string("odd")]),
                Some(Stmt::write(vec![Expr::string("even")])),
            ),
        ])
    };
    assert_eq!(execute(program(3).instructions(), "").1, "odd\n");
    assert_eq!(execute(program(10).instructions(), "").1, "even\n");
}

#[test]
fn test_read_then_concat() {
    let chunk = build(vec![
        Stmt::declare("string", ["name"]),
        Stmt::declare("int", ["age"]),
        Stmt::read(["name", "age"]),
        Stmt::write(vec![
            Expr::binary(Expr::string("hi "), BinaryOp::Concat, Expr::variable("name")),
            Expr::string(" "),
            add(Expr::variable("age"), Expr::int(1)),
        ]),
    ]);
    let (result, output) = execute(chunk.instructions(), "Ada Lovelace\n36\n");
    result.unwrap();
    assert_eq!(output, "hi Ada Lovelace 37\n");
}

#[test]
fn test_text_roundtrip_matches_direct_execution() {
    let chunk = build(vec![
        Stmt::declare("int", ["i"]),
        Stmt::declare("float", ["total"]),
        Stmt::declare("string", ["msg"]),
        Stmt::declare("bool", ["done"]),
        Stmt::expression(Expr::assign("msg", Expr::string("say \"hi\"\tnow"))),
        Stmt::for_loop(
            Some(Expr::assign("i", Expr::int(1))),
            Some(Expr::binary(Expr::variable("i"), BinaryOp::LessEqual, Expr::int(4))),
            Some(Expr::assign("i", add(Expr::variable("i"), Expr::int(1)))),
            Stmt::expression(Expr::assign(
                "total",
                add(
                    Expr::variable("total"),
                    Expr::binary(Expr::variable("i"), BinaryOp::Divide, Expr::float(3.0)),
                ),
            )),
        ),
        Stmt::expression(Expr::assign(
            "done",
            Expr::and(
                Expr::binary(Expr::variable("total"), BinaryOp::GreaterEqual, Expr::float(3.0)),
                Expr::unary(UnaryOp::Not, Expr::bool(false)),
            ),
        )),
        Stmt::write(vec![
            Expr::variable("msg"),
            Expr::variable("total"),
            Expr::variable("done"),
            Expr::unary(UnaryOp::Negate, Expr::float(0.1)),
        ]),
    ]);

    let reparsed = assemble(&chunk.to_string()).unwrap();
    assert_eq!(reparsed.code, chunk.code);

    let direct = execute(chunk.instructions(), "");
    let via_text = execute(reparsed.instructions(), "");
    direct.0.unwrap();
    via_text.0.unwrap();
    assert_eq!(direct.1, via_text.1);
    assert!(direct.1.starts_with("say \"hi\"\tnow"));
}

#[test]
fn test_assignment_as_operand_yields_target_value() {
    // x = (y = 2) * 3;  write x, ",", y, ",", (f = x);
    let chunk = build(vec![
        Stmt::declare("int", ["x", "y"]),
        Stmt::declare("float", ["f"]),
        Stmt::expression(Expr::assign(
            "x",
            Expr::binary(
                Expr::grouping(Expr::assign("y", Expr::int(2))),
                BinaryOp::Multiply,
                Expr::int(3),
            ),
        )),
        Stmt::write(vec![
            Expr::variable("x"),
            Expr::string(","),
            Expr::variable("y"),
            Expr::string(","),
            Expr::grouping(Expr::assign("f", Expr::variable("x"))),
        ]),
    ]);

    let code: Vec<String> = chunk.iter().skip(6).take(8).map(|i| i.to_string()).collect();
    assert_eq!(
        code,
        vec![
            "push i 2", "save i y", "load i y", "push i 3", "mul i", "save i x", "load i x",
            "pop",
        ]
    );

    let mut vm = VM::new(&b""[..], Vec::new());
    vm.run_chunk(&chunk).unwrap();
    assert!(vm.stack().is_empty());
    assert_eq!(vm.variable("f"), Some(&Value::Float(6.0)));
    assert_eq!(String::from_utf8(vm.into_output()).unwrap(), "6,2,6.0\n");
}
