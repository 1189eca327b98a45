use anyhow::Context;
use minesweeper_kb::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug shows every deduction.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- 1. Initialization ---
    let config = load_config()?;
    config.validate()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut session = Session::new(&config, &mut rng)?;

    println!("--- Knowledge-Base Minesweeper Bot ---");
    println!("Strategy: Play cells proven safe, guess randomly otherwise.");
    print_board(&session);

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while session.game_state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        match session.step(&mut rng)? {
            Some(Move::Safe(cell)) => println!("AI making safe move {}", cell),
            Some(Move::Random(cell)) => println!("No known safe moves, AI making random move {}", cell),
            None => {
                println!("No moves left to make.");
                break;
            }
        }
        print_board(&session);
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    println!(
        "Known mines: {}, known safes: {}, active constraints: {}",
        session.agent.mines().len(),
        session.agent.safes().len(),
        session.agent.knowledge().len()
    );

    match session.game_state {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The bot ran out of moves."),
    }
    Ok(())
}

/// Reads a JSON config from the path given as the first argument, if any.
fn load_config() -> anyhow::Result<SessionConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SessionConfig::default());
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading config {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path))
}

fn print_board(session: &Session) {
    let dims = session.board.dimensions();
    let view = session.cells_view();

    // Print header
    print!("   ");
    for col in 0..dims.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(dims.width));

    // Print rows
    for (row, cells) in view.chunks(dims.width).enumerate() {
        print!("{:^2}|", row);
        for &cell in cells {
            let display = match cell {
                -1 => " ■ ".to_string(),
                -2 => " F ".to_string(),
                -3 => " X ".to_string(),
                n => format!(" {} ", n),
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
