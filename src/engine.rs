use std::time::{SystemTime, UNIX_EPOCH};

use crate::rules;
use crate::types::{GameRecord, GameResult, GameSnapshot, Move, Phase, Player};

pub const DEFAULT_BOARD_SIZE: usize = 15;
const RECENT_MOVES: usize = 8;

#[derive(Clone, Debug)]
pub struct Board {
  size: usize,
  cells: Vec<Option<Player>>,
}

impl Board {
  pub fn new(size: usize) -> Self {
    Self {
      size,
      cells: vec![None; size * size],
    }
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  pub fn in_bounds(&self, index: usize) -> bool {
    index < self.cells.len()
  }

  pub fn row_col(&self, index: usize) -> (usize, usize) {
    (index / self.size, index % self.size)
  }

  pub fn index(&self, row: usize, col: usize) -> usize {
    row * self.size + col
  }

  pub fn get(&self, index: usize) -> Option<Player> {
    self.cells.get(index).copied().flatten()
  }

  pub fn set(&mut self, index: usize, player: Player) {
    self.cells[index] = Some(player);
  }

  pub fn clear(&mut self, index: usize) {
    self.cells[index] = None;
  }

  pub fn is_open(&self, index: usize) -> bool {
    self.in_bounds(index) && self.cells[index].is_none()
  }

  pub fn is_full(&self) -> bool {
    self.cells.iter().all(|cell| cell.is_some())
  }

  pub fn open_cells(&self) -> Vec<usize> {
    self
      .cells
      .iter()
      .enumerate()
      .filter(|(_, cell)| cell.is_none())
      .map(|(i, _)| i)
      .collect()
  }

  pub fn stone_count(&self, player: Player) -> usize {
    self.cells.iter().filter(|cell| **cell == Some(player)).count()
  }

  pub fn cells(&self) -> Vec<Option<Player>> {
    self.cells.clone()
  }
}

#[derive(Clone, Debug)]
pub struct GameState {
  pub board: Board,
  pub phase: Phase,
  pub to_move: Player,
  pub moves: Vec<Move>,
  pub winning_line: Vec<usize>,
  generation: u64,
  created_at: i64,
  updated_at: i64,
}

impl GameState {
  pub fn new(board_size: usize) -> Self {
    let now = now_ts();
    Self {
      board: Board::new(board_size),
      phase: Phase::Setup,
      to_move: Player::B,
      moves: Vec::new(),
      winning_line: Vec::new(),
      generation: 0,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn start(&mut self) {
    if self.phase == Phase::Setup {
      self.phase = Phase::InProgress;
    }
  }

  pub fn result(&self) -> Option<GameResult> {
    match self.phase {
      Phase::Terminal { result } => Some(result),
      _ => None,
    }
  }

  /// Monotonic ply counter. Bumped by every committed move and every reset,
  /// so an advisory response tagged with an older generation is stale.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn reset(&mut self) {
    self.board = Board::new(self.board.size());
    self.phase = Phase::Setup;
    self.to_move = Player::B;
    self.moves.clear();
    self.winning_line.clear();
    self.generation += 1;
    self.updated_at = now_ts();
  }

  pub fn apply_move(&mut self, index: usize) -> Result<(), String> {
    if self.phase != Phase::InProgress {
      return Err("Game is not in progress".to_string());
    }
    if !self.board.in_bounds(index) {
      return Err(format!("Index {} out of range", index));
    }
    if !self.board.is_open(index) {
      return Err(format!("Cell {} is already occupied", index));
    }

    let player = self.to_move;
    self.board.set(index, player);
    self.moves.push(Move { index, player });
    self.generation += 1;
    self.updated_at = now_ts();

    if let Some(line) = rules::winning_line(&self.board, index, player) {
      self.winning_line = line;
      self.phase = Phase::Terminal {
        result: GameResult::win_for(player),
      };
      return Ok(());
    }

    if self.board.is_full() {
      self.phase = Phase::Terminal {
        result: GameResult::Draw,
      };
      return Ok(());
    }

    self.to_move = self.to_move.other();
    Ok(())
  }

  pub fn snapshot(&self) -> GameSnapshot {
    let recent_moves = self
      .moves
      .iter()
      .rev()
      .take(RECENT_MOVES)
      .copied()
      .collect();
    GameSnapshot {
      board_size: self.board.size(),
      board: self.board.cells(),
      phase: self.phase,
      to_move: self.to_move,
      winning_line: self.winning_line.clone(),
      moves: self.moves.clone(),
      last_move: self.moves.last().copied(),
      recent_moves,
      moves_left: self.board.cell_count() - self.moves.len(),
    }
  }

  pub fn to_record(&self) -> GameRecord {
    GameRecord {
      version: "1.0".to_string(),
      board_size: self.board.size(),
      moves: self.moves.clone(),
      result: self.result(),
      created_at: self.created_at,
      updated_at: Some(self.updated_at),
    }
  }

  /// Rebuilds a game by replaying the recorded moves, so every stored
  /// position passes the same legality checks as live play.
  pub fn from_record(record: GameRecord) -> Result<Self, String> {
    if record.board_size < 5 {
      return Err("Board size must be at least 5".to_string());
    }
    let mut state = GameState::new(record.board_size);
    state.start();
    for mv in record.moves.iter() {
      if mv.player != state.to_move {
        return Err("Move order mismatch in record".to_string());
      }
      state.apply_move(mv.index)?;
    }
    if record.created_at > 0 {
      state.created_at = record.created_at;
    }
    state.updated_at = record.updated_at.unwrap_or(state.created_at);
    Ok(state)
  }
}

fn now_ts() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_secs() as i64
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn move_rejected_before_start() {
    let mut game = GameState::new(15);
    assert!(game.apply_move(0).is_err());
    game.start();
    assert!(game.apply_move(0).is_ok());
  }

  #[test]
  fn occupied_cell_is_rejected_without_mutation() {
    let mut game = GameState::new(15);
    game.start();
    game.apply_move(112).unwrap();
    let before = game.moves.len();
    assert!(game.apply_move(112).is_err());
    assert_eq!(game.moves.len(), before);
    assert_eq!(game.board.get(112), Some(Player::B));
  }

  #[test]
  fn horizontal_five_ends_the_game() {
    let mut game = GameState::new(15);
    game.start();
    // B plays 0..4 on row 0, W answers on row 14.
    for i in 0..4 {
      game.apply_move(i).unwrap();
      game.apply_move(210 + i).unwrap();
    }
    game.apply_move(4).unwrap();
    assert_eq!(game.result(), Some(GameResult::BWin));
    assert_eq!(game.winning_line, vec![0, 1, 2, 3, 4]);
    assert!(game.apply_move(5).is_err());
  }

  #[test]
  fn generation_advances_on_moves_and_reset() {
    let mut game = GameState::new(15);
    game.start();
    let g0 = game.generation();
    game.apply_move(0).unwrap();
    assert_eq!(game.generation(), g0 + 1);
    game.reset();
    assert_eq!(game.generation(), g0 + 2);
  }

  #[test]
  fn snapshot_reports_recent_moves_newest_first() {
    let mut game = GameState::new(15);
    game.start();
    for index in [112, 113, 97, 128, 82, 96, 127, 111, 110, 98] {
      game.apply_move(index).unwrap();
    }
    let snapshot = game.snapshot();
    assert_eq!(snapshot.moves.len(), 10);
    assert_eq!(snapshot.moves_left, 215);
    assert_eq!(snapshot.last_move.map(|mv| mv.index), Some(98));
    assert_eq!(snapshot.recent_moves.len(), 8);
    assert_eq!(snapshot.recent_moves[0].index, 98);
    assert_eq!(snapshot.recent_moves[7].index, 97);
  }

  #[test]
  fn record_roundtrip_replays_moves() {
    let mut game = GameState::new(15);
    game.start();
    game.apply_move(112).unwrap();
    game.apply_move(113).unwrap();
    let record = game.to_record();
    let restored = GameState::from_record(record).unwrap();
    assert_eq!(restored.moves.len(), 2);
    assert_eq!(restored.board.get(112), Some(Player::B));
    assert_eq!(restored.board.get(113), Some(Player::W));
    assert_eq!(restored.to_move, Player::B);
  }
}
