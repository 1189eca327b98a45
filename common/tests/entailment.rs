//! Plays seeded games and checks, after every observation, that the agent's
//! knowledge stays consistent and that every cell it has resolved follows
//! from the observations made so far.

use itertools::Itertools;
use minesweeper_kb::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver};

/// Encodes "exactly k of `lits` are true" with one clause per forbidden combination.
/// Neighborhoods have at most 8 cells, so the naive encoding is small enough.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    if k > lits.len() {
        formula.add_clause(&[]);
        return;
    }
    // At most k.
    for combo in lits.iter().copied().combinations(k + 1) {
        let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
        formula.add_clause(&clause);
    }
    // At least k.
    if k > 0 {
        for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
            formula.add_clause(&combo);
        }
    }
}

/// Builds a solver holding everything the agent has been told.
fn observation_solver(board: &Board, agent: &Agent) -> (Solver<'static>, HashMap<Cell, Lit>) {
    let dims = board.dimensions();
    let mut solver = Solver::new();
    let lits: HashMap<Cell, Lit> = dims
        .cells()
        .map(|cell| (cell, solver.new_lit()))
        .collect();

    let mut formula = CnfFormula::new();
    for &cell in agent.moves_made() {
        formula.add_clause(&[!lits[&cell]]);
        let neighbors: Vec<Lit> = dims.neighbors(cell).map(|n| lits[&n]).collect();
        encode_exactly_k(&mut formula, &neighbors, board.nearby_mines(cell) as usize);
    }
    solver.add_formula(&formula);
    (solver, lits)
}

fn entailed(solver: &mut Solver, lit: Lit) -> bool {
    solver.assume(&[!lit]);
    let satisfiable = solver.solve().expect("solver failure");
    solver.assume(&[]);
    !satisfiable
}

fn assert_invariants(agent: &Agent) {
    assert!(agent.safes().is_disjoint(agent.mines()));
    for constraint in agent.knowledge() {
        assert!(!constraint.is_empty());
        assert!(constraint.count() <= constraint.cells().len());
        assert!(constraint.cells().is_disjoint(agent.safes()));
        assert!(constraint.cells().is_disjoint(agent.mines()));
    }
}

fn assert_deductions_entailed(board: &Board, agent: &Agent) {
    let (mut solver, lits) = observation_solver(board, agent);
    assert!(solver.solve().expect("solver failure"), "observations are contradictory");

    for cell in agent.mines() {
        assert!(entailed(&mut solver, lits[cell]), "{} is not provably a mine", cell);
    }
    for cell in agent.safes() {
        assert!(entailed(&mut solver, !lits[cell]), "{} is not provably safe", cell);
    }
}

fn play_checked(seed: u64, config: &SessionConfig) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut session = Session::new(config, &mut rng).unwrap();

    while session.game_state == GameState::Playing {
        if session.step(&mut rng).unwrap().is_none() {
            break;
        }
        assert_invariants(&session.agent);
        if session.game_state != GameState::Lost {
            assert_deductions_entailed(&session.board, &session.agent);
        }
    }
    assert_ne!(session.game_state, GameState::Playing);
}

#[test]
fn test_beginner_games_are_sound() {
    let config = SessionConfig {
        height: 8,
        width: 8,
        mines: 10,
        seed: None,
    };
    for seed in 0..25 {
        play_checked(seed, &config);
    }
}

#[test]
fn test_dense_games_are_sound() {
    let config = SessionConfig {
        height: 6,
        width: 9,
        mines: 15,
        seed: None,
    };
    for seed in 100..120 {
        play_checked(seed, &config);
    }
}

#[test]
fn test_agent_wins_some_games() {
    let config = SessionConfig {
        height: 8,
        width: 8,
        mines: 6,
        seed: None,
    };
    let wins = (0..30)
        .filter(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = Session::new(&config, &mut rng).unwrap();
            session.play(&mut rng).unwrap() == GameState::Won
        })
        .count();
    assert!(wins > 0);
}
