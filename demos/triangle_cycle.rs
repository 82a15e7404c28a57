//! Triangle circulation example.
//!
//! Builds the QUBO for a three-vertex cycle plus a dead-end arc, then
//! interprets two candidate answers: one breaking conservation and one
//! sending full capacity around the cycle.

use cycle_qubo::core::config::QuboConfig;
use cycle_qubo::core::graph::FlowGraph;
use cycle_qubo::core::error::QuboError;
use cycle_qubo::pipeline::Pipeline;

fn main() -> Result<(), QuboError> {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  cycle-qubo: Triangle Circulation Example ║");
    println!("╚═══════════════════════════════════════════╝\n");

    println!("Arcs (capacity, reward per unit):");
    println!("  0 → 1:  2, 3");
    println!("  1 → 2:  2, 5");
    println!("  2 → 0:  2, 4");
    println!("  1 → 3:  1, 9   (vertex 3 has no way back)\n");

    let graph = FlowGraph::from_rows(
        vec![
            vec![0, 2, 0, 0],
            vec![0, 0, 2, 1],
            vec![2, 0, 0, 0],
            vec![0, 0, 0, 0],
        ],
        vec![
            vec![0, 3, 0, 0],
            vec![0, 0, 5, 9],
            vec![4, 0, 0, 0],
            vec![0, 0, 0, 0],
        ],
    )?;

    let built = Pipeline::build(graph, &QuboConfig::default())?;

    println!("━━━ Instance ━━━\n");
    println!("  Vertices kept:     {:?}", built.index_map.as_slice());
    println!("  Ring labels:       {:?}", built.rings.as_slice());
    println!("  Penalty scale:     {:.3}", built.parameters.multiplier);
    println!("  QUBO variables:    {}", built.variable_count());
    println!();
    for (p, variable) in built.table.variables().iter().enumerate() {
        let kind = if variable.is_vertex() { "vertex" } else { "arc" };
        println!(
            "  x{:<2} {:<6} {} → {}  weight {}",
            p, kind, variable.origin, variable.destination, variable.weight
        );
    }
    println!();

    // Only the first digit of vertex 0 set: conservation broken.
    let mut broken = vec![false; built.variable_count()];
    broken[0] = true;
    let full = vec![true; built.variable_count()];

    println!("━━━ Energies ━━━\n");
    println!("  broken candidate:  {:.3}", built.qubo.energy(&broken));
    println!("  full candidate:    {:.3}", built.qubo.energy(&full));
    println!();

    println!("━━━ Only the broken candidate ━━━\n");
    print!("{}", built.interpret(&[broken.clone()])?);
    println!();

    println!("━━━ Both candidates ━━━\n");
    print!("{}", built.interpret(&[broken, full])?);

    Ok(())
}
