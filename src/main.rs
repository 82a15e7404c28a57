//! cycle-qubo CLI
//!
//! Build QUBO instances for maximum-weight circulations and read solver
//! output back.
//!
//! # Usage
//!
//! ```bash
//! # Write net.qubo.tsv next to the graph
//! cycle-qubo build --input net.graph.tsv
//!
//! # Check the solver's candidates in net.sol.tsv
//! cycle-qubo interpret --input net.graph.tsv
//!
//! # Generate a random 40-vertex instance
//! cycle-qubo generate --size 40 --seed 7 --output net.graph.tsv
//!
//! # Classical baseline: write net.graph.dimacs, then read net.sol.dimacs
//! cycle-qubo dimacs --input net.graph.tsv
//! cycle-qubo classical --input net.graph.tsv
//! ```

use cycle_qubo::core::config::{Encoding, QuboConfig};
use cycle_qubo::core::error::QuboError;
use cycle_qubo::core::graph::FlowGraph;
use cycle_qubo::graph::simplify::{simplify, Simplified};
use cycle_qubo::io::{dimacs, tsv};
use cycle_qubo::pipeline::{BuiltInstance, Pipeline};
use cycle_qubo::solution::evaluate_circulation;
use cycle_qubo::simulation::instance::{generate_instance, generate_seeded, InstanceConfig};
use log::info;
use std::io;
use std::path::PathBuf;
use std::process;

fn print_usage() {
    eprintln!(
        r#"cycle-qubo — QUBO encoding of maximum-weight circulations

USAGE:
    cycle-qubo <COMMAND> [OPTIONS]

COMMANDS:
    build       Simplify a graph and write its QUBO matrix
    interpret   Check solver candidates and decompose the first feasible one
    generate    Generate a random graph instance
    dimacs      Simplify a graph and write it as a DIMACS min-cost flow problem
    classical   Read a DIMACS solution back and decompose its circulation
    help        Show this message

OPTIONS (build, interpret):
    --input <FILE>          Graph file (capacity rows, then weight rows)
    --multiplier <X>        Penalty multiplier (default: 1, relative to weights)
    --absolute              Do not scale the multiplier by the average weight
    --ring-ratio <X>        Penalty ratio between deepest and first ring (default: 1)
    --arc-disaggregated     One binary variable per arc
    --disaggregated         One binary variable per vertex and per arc
    --config <FILE>         JSON configuration; flags override its values
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (build):
    --output <FILE>         QUBO file (default: input with .qubo.tsv)

OPTIONS (interpret):
    --solutions <FILE>      Candidate file (default: input with .sol.tsv)

OPTIONS (dimacs, classical):
    --input <FILE>          Graph file
    --arc-disaggregated     Lower every arc capacity to 1 first
    --output <FILE>         dimacs: problem file (default: input with .graph.dimacs)
    --solutions <FILE>      classical: solution file (default: input with .sol.dimacs)
    --format <FORMAT>       classical: text (default) or json

OPTIONS (generate):
    --size <N>              Number of vertices, at least 4 (default: 30)
    --seed <N>              Random seed (default: from entropy)
    --output <FILE>         Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG                Log filter (default: info)

EXAMPLES:
    cycle-qubo build --input net.graph.tsv --multiplier 2 --ring-ratio 0.5
    cycle-qubo interpret --input net.graph.tsv --solutions run1.sol.tsv --format json
    cycle-qubo generate --size 40 --seed 7 --output net.graph.tsv
    cycle-qubo dimacs --input net.graph.tsv"#
    );
}

fn exit_with(error: QuboError) -> ! {
    eprintln!("Error: {}", error);
    process::exit(1);
}

/// JSON output schema for `build`.
#[derive(serde::Serialize)]
struct BuildOutput {
    vertices: usize,
    reduced_vertices: usize,
    variables: usize,
    max_ring: u32,
    penalty_multiplier: f64,
    ring_factor: f64,
    output: String,
}

/// Options shared by `build` and `interpret`.
#[derive(Default)]
struct InstanceArgs {
    input: Option<String>,
    config: Option<String>,
    multiplier: Option<f64>,
    absolute: bool,
    ring_ratio: Option<f64>,
    encoding: Option<Encoding>,
    format: Option<String>,
    output: Option<String>,
    solutions: Option<String>,
}

fn number_after<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("{} requires a number", flag);
        process::exit(1);
    })
}

fn path_after(args: &[String], i: usize, flag: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires a file path", flag);
        process::exit(1);
    })
}

fn parse_instance_args(args: &[String], accepts: &[&str]) -> InstanceArgs {
    let mut parsed = InstanceArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if (flag == "--output" || flag == "--solutions") && !accepts.contains(&flag) {
            eprintln!("Unknown option: {}", flag);
            process::exit(1);
        }
        match flag {
            "--input" => {
                i += 1;
                parsed.input = Some(path_after(args, i, flag));
            }
            "--config" => {
                i += 1;
                parsed.config = Some(path_after(args, i, flag));
            }
            "--multiplier" => {
                i += 1;
                parsed.multiplier = Some(number_after(args, i, flag));
            }
            "--absolute" => parsed.absolute = true,
            "--ring-ratio" => {
                i += 1;
                parsed.ring_ratio = Some(number_after(args, i, flag));
            }
            "--arc-disaggregated" => {
                if parsed.encoding.is_none() {
                    parsed.encoding = Some(Encoding::ArcDisaggregated);
                }
            }
            "--disaggregated" => parsed.encoding = Some(Encoding::Disaggregated),
            "--format" => {
                i += 1;
                parsed.format = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                }));
            }
            "--output" => {
                i += 1;
                parsed.output = Some(path_after(args, i, flag));
            }
            "--solutions" => {
                i += 1;
                parsed.solutions = Some(path_after(args, i, flag));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }
    parsed
}

impl InstanceArgs {
    fn input(&self) -> &str {
        self.input.as_deref().unwrap_or_else(|| {
            eprintln!("Error: --input <FILE> is required");
            process::exit(1);
        })
    }

    fn json(&self) -> bool {
        match self.format.as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => {
                eprintln!("Unknown format '{}': expected 'text' or 'json'", other);
                process::exit(1);
            }
        }
    }

    /// Configuration file values, overridden by command-line flags.
    fn config(&self) -> Result<QuboConfig, QuboError> {
        let mut config = match &self.config {
            Some(path) => QuboConfig::from_json_file(path)?,
            None => QuboConfig::default(),
        };
        if let Some(multiplier) = self.multiplier {
            config.penalty_multiplier = multiplier;
        }
        if self.absolute {
            config.absolute_multiplier = true;
        }
        if let Some(ratio) = self.ring_ratio {
            config.ring_ratio = ratio;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        Ok(config)
    }

    /// The simplified graph handed to a classical flow solver.
    fn classical_graph(&self) -> Result<Simplified, QuboError> {
        let mut graph: FlowGraph = tsv::read_graph_file(self.input())?;
        match self.encoding {
            Some(Encoding::ArcDisaggregated) => graph = graph.with_unit_capacities(),
            Some(Encoding::Disaggregated) => {
                eprintln!("Error: --disaggregated has no classical counterpart");
                process::exit(1);
            }
            _ => {}
        }
        Ok(simplify(graph))
    }

    fn build(&self) -> Result<(usize, BuiltInstance), QuboError> {
        let config = self.config()?;
        let graph = tsv::read_graph_file(self.input())?;
        let vertices = graph.vertex_count();
        Ok((vertices, Pipeline::build(graph, &config)?))
    }
}

fn cmd_build(args: &[String]) {
    let parsed = parse_instance_args(args, &["--output"]);
    let json = parsed.json();
    let (vertices, built) = parsed.build().unwrap_or_else(|e| exit_with(e));

    let output = parsed
        .output
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| tsv::derived_path(parsed.input(), ".qubo.tsv"));
    tsv::write_qubo_file(&output, &built.qubo).unwrap_or_else(|e| exit_with(e));
    info!("Wrote QUBO to {}", output.display());

    if json {
        let report = BuildOutput {
            vertices,
            reduced_vertices: built.reduced.vertex_count(),
            variables: built.variable_count(),
            max_ring: built.rings.max(),
            penalty_multiplier: built.parameters.multiplier,
            ring_factor: built.parameters.ring_factor,
            output: output.display().to_string(),
        };
        let text = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with(QuboError::from(e)));
        println!("{}", text);
    } else {
        println!(
            "After pre-processing, the number of vertices is {} (of {})",
            built.reduced.vertex_count(),
            vertices
        );
        println!("Number of QUBO variables: {}", built.variable_count());
        println!("QUBO written to {}", output.display());
    }
}

fn cmd_interpret(args: &[String]) {
    let parsed = parse_instance_args(args, &["--solutions"]);
    let json = parsed.json();
    let (_, built) = parsed.build().unwrap_or_else(|e| exit_with(e));

    let solutions = parsed
        .solutions
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| tsv::derived_path(parsed.input(), ".sol.tsv"));
    let candidates = tsv::read_solutions_file(&solutions, built.variable_count())
        .unwrap_or_else(|e| exit_with(e));
    let result = built.interpret(&candidates).unwrap_or_else(|e| exit_with(e));

    if json {
        let text = serde_json::to_string_pretty(&result)
            .unwrap_or_else(|e| exit_with(QuboError::from(e)));
        println!("{}", text);
    } else {
        print!("{}", result);
    }
}

fn cmd_dimacs(args: &[String]) {
    let parsed = parse_instance_args(args, &["--output"]);
    let Simplified { graph, .. } = parsed.classical_graph().unwrap_or_else(|e| exit_with(e));

    let output = parsed
        .output
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| tsv::derived_path(parsed.input(), ".graph.dimacs"));
    dimacs::write_dimacs_file(&output, &graph).unwrap_or_else(|e| exit_with(e));

    println!(
        "After pre-processing, the number of vertices is {}",
        graph.vertex_count()
    );
    println!("DIMACS problem written to {}", output.display());
}

fn cmd_classical(args: &[String]) {
    let parsed = parse_instance_args(args, &["--solutions"]);
    let json = parsed.json();
    let Simplified { graph, index_map } =
        parsed.classical_graph().unwrap_or_else(|e| exit_with(e));

    let solution = parsed
        .solutions
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| tsv::derived_path(parsed.input(), ".sol.dimacs"));
    let flow = dimacs::read_dimacs_flow_file(&solution, graph.capacity())
        .unwrap_or_else(|e| exit_with(e));
    let report = evaluate_circulation(&flow, &graph, &index_map).unwrap_or_else(|e| exit_with(e));

    if json {
        let text = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with(QuboError::from(e)));
        println!("{}", text);
    } else {
        print!("{}", report);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = InstanceConfig::default();
    let mut seed: Option<u64> = None;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--size" => {
                i += 1;
                config.size = number_after(args, i, "--size");
            }
            "--seed" => {
                i += 1;
                seed = Some(number_after(args, i, "--seed"));
            }
            "--output" => {
                i += 1;
                output_path = Some(path_after(args, i, "--output"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let graph = match seed {
        Some(seed) => generate_seeded(&config, seed),
        None => generate_instance(&config, &mut rand::thread_rng()),
    }
    .unwrap_or_else(|e| exit_with(e));

    let written = match &output_path {
        Some(path) => tsv::write_graph_file(path, &graph),
        None => tsv::write_graph(io::stdout().lock(), &graph),
    };
    written.unwrap_or_else(|e| exit_with(e));

    if let Some(path) = output_path {
        eprintln!(
            "Generated {} vertices and {} arcs → {}",
            graph.vertex_count(),
            graph.arc_count(),
            path
        );
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "build" => cmd_build(rest),
        "interpret" => cmd_interpret(rest),
        "generate" => cmd_generate(rest),
        "dimacs" => cmd_dimacs(rest),
        "classical" => cmd_classical(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
