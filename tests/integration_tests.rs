use approx::assert_relative_eq;
use cycle_qubo::core::config::{Encoding, QuboConfig};
use cycle_qubo::core::graph::FlowGraph;
use cycle_qubo::core::matrix::Matrix;
use cycle_qubo::graph::decomposition::decompose;
use cycle_qubo::graph::simplify::simplify;
use cycle_qubo::io::{dimacs, tsv};
use cycle_qubo::pipeline::Pipeline;
use cycle_qubo::simulation::instance::{generate_seeded, InstanceConfig};
use cycle_qubo::solution::evaluate_circulation;
use cycle_qubo::solution::interpret::{backtranslate, objective_value, Interpretation};

fn triangle() -> FlowGraph {
    FlowGraph::from_rows(
        vec![vec![0, 2, 0], vec![0, 0, 2], vec![2, 0, 0]],
        vec![vec![0, 3, 0], vec![0, 0, 5], vec![4, 0, 0]],
    )
    .unwrap()
}

/// Full pipeline test: graph → simplify → QUBO → candidate → cycles.
#[test]
fn full_pipeline_triangle() {
    let built = Pipeline::build(triangle(), &QuboConfig::default()).unwrap();

    // Nothing to simplify: every vertex is balanced at capacity 2
    assert_eq!(built.reduced, triangle());
    assert_eq!(built.index_map.as_slice(), &[0, 1, 2]);
    assert_eq!(built.rings.as_slice(), &[1, 2, 2]);

    // Full-capacity flow
    let full = built
        .table
        .encode(&[2, 2, 2], built.reduced.capacity())
        .unwrap();
    let flows = backtranslate(&full, &built.table).unwrap();
    assert!(flows.is_feasible());
    assert_eq!(&flows.arcs, built.reduced.capacity());
    assert_eq!(objective_value(&flows.arcs, built.reduced.weight()).unwrap(), 24);

    // A feasible assignment only pays the objective
    assert_relative_eq!(built.qubo.energy(&full), -24.0, epsilon = 1e-9);

    let result = built.interpret(&[full]).unwrap();
    match &result {
        Interpretation::Feasible {
            candidate,
            value,
            cycles,
        } => {
            assert_eq!(*candidate, 0);
            assert_eq!(*value, 24);
            assert_eq!(cycles.len(), 1);
            assert_eq!(cycles[0].amount, 2);
            assert_eq!(cycles[0].vertices, vec![0, 1, 2]);
        }
        other => panic!("expected a feasible result, got {:?}", other),
    }
    assert!(result
        .to_string()
        .contains("Flow of 2 along 0 -> 1 -> 2 -> 0"));
}

/// Indices in reports refer to the input graph, not the reduced one.
#[test]
fn reports_use_original_indices() {
    // vertex 0 only feeds the cycle 1 -> 3 -> 1 and is dropped
    let graph = FlowGraph::from_rows(
        vec![
            vec![0, 1, 0, 0],
            vec![0, 0, 0, 3],
            vec![0, 0, 0, 0],
            vec![0, 3, 0, 0],
        ],
        vec![
            vec![0, 1, 0, 0],
            vec![0, 0, 0, 2],
            vec![0, 0, 0, 0],
            vec![0, 6, 0, 0],
        ],
    )
    .unwrap();
    let built = Pipeline::build(graph, &QuboConfig::default()).unwrap();
    assert_eq!(built.index_map.as_slice(), &[1, 3]);

    let full = vec![true; built.variable_count()];
    match built.interpret(&[full]).unwrap() {
        Interpretation::Feasible { value, cycles, .. } => {
            assert_eq!(value, 3 * 2 + 3 * 6);
            assert_eq!(cycles[0].vertices, vec![1, 3]);
            assert_eq!(cycles[0].amount, 3);
        }
        other => panic!("expected a feasible result, got {:?}", other),
    }

    // vertex 1 (reduced 0) declares flow it never sends
    let mut broken = vec![false; built.variable_count()];
    broken[0] = true;
    match built.interpret(&[broken]).unwrap() {
        Interpretation::Infeasible { breaks } => {
            assert_eq!(breaks.len(), 1);
            assert_eq!(breaks[0].vertex, 1);
            assert_eq!(breaks[0].reduced_vertex, 0);
            assert_eq!(breaks[0].through, 1);
            assert_eq!(breaks[0].inflow, 0);
        }
        other => panic!("expected breaks, got {:?}", other),
    }
}

/// The build and interpret steps can run in separate processes, linked
/// only by the files on disk.
#[test]
fn file_round_trip_through_tsv() {
    let graph = generate_seeded(&InstanceConfig { size: 10, ..Default::default() }, 3).unwrap();
    let mut graph_file = Vec::new();
    tsv::write_graph(&mut graph_file, &graph).unwrap();

    let config = QuboConfig {
        encoding: Encoding::ArcDisaggregated,
        ..Default::default()
    };
    let first = Pipeline::build(tsv::read_graph(graph_file.as_slice()).unwrap(), &config).unwrap();

    let mut qubo_file = Vec::new();
    tsv::write_qubo(&mut qubo_file, &first.qubo).unwrap();
    let qubo_text = String::from_utf8(qubo_file).unwrap();
    assert_eq!(qubo_text.lines().count(), first.variable_count());

    // a sampler line: assignment, then energy and occurrence count
    let zeros = vec!["0"; first.variable_count()].join("\t");
    let solutions = format!("{}\t0.0\t17\n", zeros);

    let second = Pipeline::build(tsv::read_graph(graph_file.as_slice()).unwrap(), &config).unwrap();
    assert_eq!(second.table, first.table);
    let candidates = tsv::read_solutions(solutions.as_bytes(), second.variable_count()).unwrap();
    match second.interpret(&candidates).unwrap() {
        Interpretation::Feasible { value, cycles, .. } => {
            assert_eq!(value, 0);
            assert!(cycles.is_empty());
        }
        other => panic!("zero flow is feasible, got {:?}", other),
    }
}

/// Cycles summed into a circulation decompose back to the same arc flows.
#[test]
fn decomposition_of_summed_cycles() {
    let mut flow = Matrix::<u64>::zeros(5);
    for (cycle, amount) in [(vec![0usize, 1, 2], 2u64), (vec![2, 3], 1), (vec![0, 4, 3, 2], 3)] {
        for p in 0..cycle.len() {
            flow[(cycle[p], cycle[(p + 1) % cycle.len()])] += amount;
        }
    }
    let index_map = cycle_qubo::graph::simplify::IndexMap::identity(5);
    let cycles = decompose(&flow, &index_map).unwrap();

    let mut rebuilt = Matrix::<u64>::zeros(5);
    for cycle in &cycles {
        for (i, j) in cycle.arcs() {
            rebuilt[(i, j)] += cycle.amount;
        }
    }
    assert_eq!(rebuilt, flow);
}

#[test]
fn zero_assignment_on_generated_instance() {
    let graph = generate_seeded(&InstanceConfig { size: 12, ..Default::default() }, 5).unwrap();
    let config = QuboConfig {
        penalty_multiplier: 4.0,
        ..Default::default()
    };
    let built = Pipeline::build(graph, &config).unwrap();

    // all zero is the empty circulation
    assert_relative_eq!(built.qubo.energy(&vec![false; built.variable_count()]), 0.0);
    assert!(built
        .interpret(&[vec![false; built.variable_count()]])
        .unwrap()
        .is_feasible());
}

/// The classical baseline sees the same reduced graph as the QUBO and
/// reports the same optimum in input-graph indices.
#[test]
fn classical_baseline_matches_qubo() {
    let graph = FlowGraph::from_rows(
        vec![
            vec![0, 1, 0, 0],
            vec![0, 0, 0, 3],
            vec![0, 0, 0, 0],
            vec![0, 3, 0, 0],
        ],
        vec![
            vec![0, 1, 0, 0],
            vec![0, 0, 0, 2],
            vec![0, 0, 0, 0],
            vec![0, 6, 0, 0],
        ],
    )
    .unwrap();
    let reduced = simplify(graph.clone());

    let mut problem = Vec::new();
    dimacs::write_dimacs(&mut problem, &reduced.graph).unwrap();
    let problem = String::from_utf8(problem).unwrap();
    assert_eq!(problem, "p min 2 2\na 1 2 0 3 2\na 2 1 0 3 6\n");

    // an optimal solver leaves no residual flow on either arc
    let solution = "s 0\nf 1 2 0\nf 2 1 0\n";
    let flow = dimacs::read_dimacs_flow(solution.as_bytes(), reduced.graph.capacity()).unwrap();
    let report = evaluate_circulation(&flow, &reduced.graph, &reduced.index_map).unwrap();
    assert_eq!(report.value, 24);
    assert_eq!(report.cycles[0].vertices, vec![1, 3]);

    let built = Pipeline::build(graph, &QuboConfig::default()).unwrap();
    match built.interpret(&[vec![true; built.variable_count()]]).unwrap() {
        Interpretation::Feasible { value, cycles, .. } => {
            assert_eq!(value, report.value);
            assert_eq!(cycles, report.cycles);
        }
        other => panic!("expected a feasible result, got {:?}", other),
    }
}
