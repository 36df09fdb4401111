use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Player {
  B,
  W,
}

impl Player {
  pub fn other(self) -> Self {
    match self {
      Player::B => Player::W,
      Player::W => Player::B,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
  BWin,
  WWin,
  Draw,
}

impl GameResult {
  pub fn win_for(player: Player) -> Self {
    match player {
      Player::B => GameResult::BWin,
      Player::W => GameResult::WWin,
    }
  }
}

/// One ply: a stone placed at a flat board index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
  pub index: usize,
  pub player: Player,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
  Setup,
  InProgress,
  Terminal { result: GameResult },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
  pub version: String,
  pub board_size: usize,
  pub moves: Vec<Move>,
  pub result: Option<GameResult>,
  #[serde(default)]
  pub created_at: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
  pub board_size: usize,
  pub board: Vec<Option<Player>>,
  pub phase: Phase,
  pub to_move: Player,
  pub winning_line: Vec<usize>,
  pub moves: Vec<Move>,
  pub last_move: Option<Move>,
  pub recent_moves: Vec<Move>,
  pub moves_left: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorConfig {
  #[serde(default)]
  pub base_url: String,
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
}

impl Default for AdvisorConfig {
  fn default() -> Self {
    Self {
      base_url: String::new(),
      timeout_ms: default_timeout_ms(),
    }
  }
}

fn default_timeout_ms() -> u64 {
  10_000
}
