//! stacklang CLI: run a program written in instruction text.

use std::env;
use std::fs;
use std::io;
use std::process;

use stacklang::bytecode::{self, VmConfig, VM};
use stacklang::error::StackLangError;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI options parsed from arguments.
struct Options {
    file: String,
    disassemble: bool,
    check_only: bool,
    vm: VmConfig,
}

fn print_usage() {
    eprintln!("stacklang {} - typed stack machine", VERSION);
    eprintln!();
    eprintln!("Usage: stacklang [options] <program.sbc>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --disassemble    Print an annotated listing before running");
    eprintln!("  --check          Parse the program and resolve its labels, then exit");
    eprintln!(
        "  --max-stack <N>  Maximum operand stack depth (default {})",
        bytecode::vm::STACK_MAX
    );
    eprintln!("  -h, --help       Show this help");
    eprintln!();
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=stacklang=trace) for execution logs.");
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut file = None;
    let mut disassemble = false;
    let mut check_only = false;
    let mut vm = VmConfig::default();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--disassemble" => disassemble = true,
            "--check" => check_only = true,
            "--max-stack" => {
                i += 1;
                let depth = args.get(i).and_then(|n| n.parse::<usize>().ok());
                match depth {
                    Some(depth) if depth > 0 => vm.max_stack_depth = depth,
                    _ => {
                        eprintln!("--max-stack requires a positive number");
                        print_usage();
                        process::exit(64);
                    }
                }
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(64);
            }
            _ => {
                if file.is_some() {
                    eprintln!("Only one program file can be specified");
                    print_usage();
                    process::exit(64);
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let Some(file) = file else {
        print_usage();
        process::exit(64);
    };

    Options {
        file,
        disassemble,
        check_only,
        vm,
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    // Use RUST_LOG environment variable to control log level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

fn exit_code(error: &StackLangError) -> i32 {
    match error {
        StackLangError::Type(_) | StackLangError::Compile(_) | StackLangError::Assemble(_) => 65,
        StackLangError::Runtime(_) => 70,
        StackLangError::Io(_) => 74,
    }
}

fn run(options: &Options) -> Result<(), StackLangError> {
    let text = fs::read_to_string(&options.file)?;
    let chunk = bytecode::assemble(&text)?;

    if options.disassemble {
        bytecode::print_disassembly(&chunk, &options.file);
        println!("---");
    }

    if options.check_only {
        bytecode::vm::check_labels(chunk.instructions())?;
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut vm = VM::with_config(stdin.lock(), stdout.lock(), options.vm);
    vm.run_chunk(&chunk)?;
    Ok(())
}

fn main() {
    init_logging();
    let options = parse_args();

    if let Err(e) = run(&options) {
        eprintln!("{}: {}", options.file, e);
        process::exit(exit_code(&e));
    }
}
