use minesweeper_kb as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_session(height: usize, width: usize, mines: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let config = ms::SessionConfig {
        height,
        width,
        mines,
        seed: None,
    };
    let session = ms::Session::new(&config, &mut rand::rng()).map_err(|e| e.to_string())?;
    session.serialize().map_err(|e| e.to_string())
}

/// Lets the agent play one move. The returned state is followed by one byte
/// naming the move: 0 none available, 1 proven safe, 2 random guess.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    let played = session
        .step(&mut rand::rng())
        .map_err(|e| e.to_string())?;
    let mut xs = session.serialize().map_err(|e| e.to_string())?;
    xs.push(match played {
        None => 0,
        Some(ms::Move::Safe(_)) => 1,
        Some(ms::Move::Random(_)) => 2,
    });
    Ok(xs)
}

#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(session.cells_view())
}

/// 0 playing, 1 won, 2 lost.
#[wasm_bindgen]
pub fn game_state(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(match session.game_state {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    })
}
