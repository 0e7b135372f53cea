//! Benchmarks for code generation, wire text parsing and execution.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stacklang::ast::{BinaryOp, Expr, Program, Stmt};
use stacklang::bytecode::{assemble, Chunk, VM};
use std::io;

/// Sum of 0..n with an Int counter and a Float accumulator.
fn loop_sum(n: i64) -> Program {
    Program::new(vec![
        Stmt::declare("int", ["i"]),
        Stmt::declare("float", ["total"]),
        Stmt::for_loop(
            Some(Expr::assign("i", Expr::int(0))),
            Some(Expr::binary(Expr::variable("i"), BinaryOp::Less, Expr::int(n))),
            Some(Expr::assign(
                "i",
                Expr::binary(Expr::variable("i"), BinaryOp::Add, Expr::int(1)),
            )),
            Stmt::expression(Expr::assign(
                "total",
                Expr::binary(Expr::variable("total"), BinaryOp::Add, Expr::variable("i")),
            )),
        ),
        Stmt::write(vec![Expr::variable("total")]),
    ])
}

/// Iterative Fibonacci, all Int.
fn fib_iterative(n: i64) -> Program {
    Program::new(vec![
        Stmt::declare("int", ["a", "b", "t", "k"]),
        Stmt::expression(Expr::assign("b", Expr::int(1))),
        Stmt::expression(Expr::assign("k", Expr::int(n))),
        Stmt::while_loop(
            Expr::binary(Expr::variable("k"), BinaryOp::Greater, Expr::int(0)),
            Stmt::block(vec![
                Stmt::expression(Expr::assign(
                    "t",
                    Expr::binary(Expr::variable("a"), BinaryOp::Add, Expr::variable("b")),
                )),
                Stmt::expression(Expr::assign("a", Expr::variable("b"))),
                Stmt::expression(Expr::assign("b", Expr::variable("t"))),
                Stmt::expression(Expr::assign(
                    "k",
                    Expr::binary(Expr::variable("k"), BinaryOp::Subtract, Expr::int(1)),
                )),
            ]),
        ),
        Stmt::write(vec![Expr::variable("a")]),
    ])
}

fn compile(program: &Program) -> Chunk {
    stacklang::compile(program).expect("compile error")
}

fn execute(chunk: &Chunk) {
    let mut vm = VM::new(io::empty(), io::sink());
    vm.run_chunk(chunk).expect("vm runtime error");
}

fn execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("execution");

    for n in [100, 1_000, 10_000].iter() {
        let chunk = compile(&loop_sum(*n));
        group.bench_with_input(BenchmarkId::new("loop_sum", n), &chunk, |b, chunk| {
            b.iter(|| execute(black_box(chunk)))
        });
    }

    for n in [10, 40, 80].iter() {
        let chunk = compile(&fib_iterative(*n));
        group.bench_with_input(BenchmarkId::new("fib_iterative", n), &chunk, |b, chunk| {
            b.iter(|| execute(black_box(chunk)))
        });
    }

    group.finish();
}

/// Benchmark compilation time alone (not execution).
fn compilation_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("compilation_overhead");

    let program = loop_sum(1_000);
    group.bench_function("compile_loop", |b| {
        b.iter(|| compile(black_box(&program)))
    });

    let program = fib_iterative(50);
    group.bench_function("compile_fib", |b| {
        b.iter(|| compile(black_box(&program)))
    });

    group.finish();
}

/// Round trip through the wire format.
fn wire_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("wire_text");
    let text = compile(&fib_iterative(50)).to_string();

    group.bench_function("assemble_fib", |b| {
        b.iter(|| assemble(black_box(&text)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, execution, compilation_overhead, wire_text);

criterion_main!(benches);
