use std::cmp::Ordering;

use rand::Rng;

use crate::engine::Board;
use crate::rules;
use crate::types::{Difficulty, Player};

const WIN_SCORE: f64 = 1_000_000.0;

// Move evaluation weights. Immediate wins dominate everything, an unblocked
// opponent four is a loss next ply, center proximity only breaks ties.
const OWN_RUN_WEIGHT: f64 = 1_500.0;
const CENTER_STEP: f64 = 5.0;
const OWN_FOUR_BONUS: f64 = 25_000.0;
const OWN_THREE_BONUS: f64 = 8_000.0;
const OPP_FOUR_PENALTY: f64 = 40_000.0;
const OPP_THREE_PENALTY: f64 = 15_000.0;
const OPP_WIN_PENALTY: f64 = 300_000.0;

// Whole-board strength weights. The opponent's longest run and center
// occupancy are weighted heavier than our own: losing ground costs more
// than gaining it.
const BOARD_RUN_WEIGHT: f64 = 12_000.0;
const BOARD_OPP_RUN_WEIGHT: f64 = 13_000.0;
const BOARD_STONE_WEIGHT: f64 = 80.0;
const BOARD_CENTER_WEIGHT: f64 = 12.0;
const BOARD_OPP_CENTER_FACTOR: f64 = 0.8;

const LOOKAHEAD_CANDIDATES: usize = 10;
const REPLY_CANDIDATES: usize = 8;
const WORST_CASE_WEIGHT: f64 = 0.7;

/// Scores placing `player` at the open cell `index`. Higher is better.
pub fn score_move(board: &Board, index: usize, player: Player) -> f64 {
  let mut work_board = board.clone();
  score_move_at(&mut work_board, index, player)
}

fn score_move_at(board: &mut Board, index: usize, player: Player) -> f64 {
  let opponent = player.other();
  board.set(index, player);

  if rules::winning_line(board, index, player).is_some() {
    board.clear(index);
    return WIN_SCORE;
  }

  let my_max = rules::longest_run_at(board, index, player);

  let mut opponent_immediate_win = false;
  let mut opponent_max = 0;
  for i in 0..board.cell_count() {
    if !board.is_open(i) {
      continue;
    }
    board.set(i, opponent);
    if rules::winning_line(board, i, opponent).is_some() {
      opponent_immediate_win = true;
      board.clear(i);
      break;
    }
    let opp_len = rules::longest_run_at(board, i, opponent);
    board.clear(i);
    if opp_len > opponent_max {
      opponent_max = opp_len;
    }
  }

  let center_score = (board.size() as f64 - center_distance(board, index)) * CENTER_STEP;

  let mut score = my_max as f64 * OWN_RUN_WEIGHT + center_score;
  if my_max >= 4 {
    score += OWN_FOUR_BONUS;
  }
  if my_max == 3 {
    score += OWN_THREE_BONUS;
  }
  if opponent_max >= 4 {
    score -= OPP_FOUR_PENALTY;
  }
  if opponent_max == 3 {
    score -= OPP_THREE_PENALTY;
  }
  if opponent_immediate_win {
    score -= OPP_WIN_PENALTY;
  }

  board.clear(index);
  score
}

/// Scores the whole position from `player`'s perspective, independent of
/// any particular move.
pub fn score_board(board: &Board, player: Player) -> f64 {
  let opponent = player.other();
  let my_longest = rules::longest_run_for_player(board, player) as f64;
  let opp_longest = rules::longest_run_for_player(board, opponent) as f64;

  let mut center_bias = 0.0;
  for i in 0..board.cell_count() {
    let cell = match board.get(i) {
      Some(cell) => cell,
      None => continue,
    };
    let bias = board.size() as f64 - center_distance(board, i);
    if cell == player {
      center_bias += bias;
    } else {
      center_bias -= bias * BOARD_OPP_CENTER_FACTOR;
    }
  }

  let my_count = board.stone_count(player) as f64;
  let opp_count = board.stone_count(opponent) as f64;

  my_longest * BOARD_RUN_WEIGHT - opp_longest * BOARD_OPP_RUN_WEIGHT
    + (my_count - opp_count) * BOARD_STONE_WEIGHT
    + center_bias * BOARD_CENTER_WEIGHT
}

/// Top `limit` open cells by move score, best first. Stable sort, so equal
/// scores keep ascending index order.
pub fn top_candidates(board: &Board, player: Player, limit: usize) -> Vec<usize> {
  let mut work_board = board.clone();
  top_candidates_at(&mut work_board, player, limit)
}

fn top_candidates_at(board: &mut Board, player: Player, limit: usize) -> Vec<usize> {
  let mut scored = Vec::new();
  for i in 0..board.cell_count() {
    if !board.is_open(i) {
      continue;
    }
    let score = score_move_at(board, i, player);
    scored.push((i, score));
  }
  scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
  scored.truncate(limit);
  scored.into_iter().map(|(i, _)| i).collect()
}

/// Immediate tactics, scanned in index order: take a winning cell, block an
/// opponent winning cell, or block a cell that would grow the opponent's
/// longest run to four or to exactly three. The exactly-three trigger makes
/// no open/closed distinction and fires on dead threes too.
pub fn critical_move(board: &Board, player: Player) -> Option<usize> {
  let opponent = player.other();
  let mut work_board = board.clone();

  for i in 0..work_board.cell_count() {
    if !work_board.is_open(i) {
      continue;
    }
    work_board.set(i, player);
    let wins = rules::winning_line(&work_board, i, player).is_some();
    work_board.clear(i);
    if wins {
      return Some(i);
    }
  }

  for i in 0..work_board.cell_count() {
    if !work_board.is_open(i) {
      continue;
    }
    work_board.set(i, opponent);
    let wins = rules::winning_line(&work_board, i, opponent).is_some();
    work_board.clear(i);
    if wins {
      return Some(i);
    }
  }

  for i in 0..work_board.cell_count() {
    if !work_board.is_open(i) {
      continue;
    }
    work_board.set(i, opponent);
    let len = rules::longest_run_at(&work_board, i, opponent);
    work_board.clear(i);
    if len >= 4 || len == 3 {
      return Some(i);
    }
  }

  None
}

/// Single best-scoring open cell; first seen wins ties.
pub fn heuristic_move(board: &Board, player: Player) -> Option<usize> {
  let mut work_board = board.clone();
  let mut best_index = None;
  let mut best_score = f64::NEG_INFINITY;

  for i in 0..work_board.cell_count() {
    if !work_board.is_open(i) {
      continue;
    }
    let score = score_move_at(&mut work_board, i, player);
    if score > best_score {
      best_score = score;
      best_index = Some(i);
    }
  }

  best_index
}

/// One-ply adversarial look-ahead over pruned candidates: each own candidate
/// is scored by the resulting board strength plus a discounted worst-case
/// opponent reply. An immediate winning candidate is taken on the spot.
pub fn minimax_move(board: &Board, player: Player) -> Option<usize> {
  let opponent = player.other();
  let mut work_board = board.clone();
  let candidates = top_candidates_at(&mut work_board, player, LOOKAHEAD_CANDIDATES);

  let mut best_index = None;
  let mut best_score = f64::NEG_INFINITY;

  for mv in candidates {
    work_board.set(mv, player);

    if rules::winning_line(&work_board, mv, player).is_some() {
      work_board.clear(mv);
      return Some(mv);
    }

    let replies = top_candidates_at(&mut work_board, opponent, REPLY_CANDIDATES);
    let mut worst_case = f64::INFINITY;

    if replies.is_empty() {
      worst_case = -score_board(&work_board, player);
    } else {
      for reply in replies {
        work_board.set(reply, opponent);
        let value = if rules::winning_line(&work_board, reply, opponent).is_some() {
          -WIN_SCORE
        } else {
          score_board(&work_board, player)
        };
        work_board.clear(reply);
        if value < worst_case {
          worst_case = value;
        }
      }
    }

    let total = score_board(&work_board, player) + worst_case * WORST_CASE_WEIGHT;
    work_board.clear(mv);

    if total > best_score {
      best_score = total;
      best_index = Some(mv);
    }
  }

  best_index
}

/// Center-biased fallback: the exact center if open, otherwise the middle of
/// the open-cell list nudged one step by a coin flip. None only on a full
/// board.
pub fn fallback_move<R: Rng>(board: &Board, rng: &mut R) -> Option<usize> {
  let center = board.cell_count() / 2;
  if board.is_open(center) {
    return Some(center);
  }

  let open = board.open_cells();
  if open.is_empty() {
    return None;
  }

  let middle = open.len() / 2;
  let nudge: i64 = if rng.gen_bool(0.5) { 1 } else { -1 };
  let biased = (middle as i64 + nudge).clamp(0, open.len() as i64 - 1) as usize;
  Some(open[biased])
}

/// Tiered selection: Easy plays the fallback only; Medium and Hard run
/// critical tactics, then a validated advisory suggestion, then the local
/// selector for the tier, then the fallback. The first hit commits, so the
/// result is always local when an open cell exists.
pub fn select_move<R: Rng>(
  board: &Board,
  player: Player,
  difficulty: Difficulty,
  advice: Option<usize>,
  rng: &mut R,
) -> Option<usize> {
  if difficulty == Difficulty::Easy {
    return fallback_move(board, rng);
  }

  if let Some(index) = critical_move(board, player) {
    return Some(index);
  }

  if let Some(index) = advice {
    if board.is_open(index) {
      return Some(index);
    }
  }

  let strategic = match difficulty {
    Difficulty::Hard => minimax_move(board, player),
    _ => heuristic_move(board, player),
  };

  strategic.or_else(|| fallback_move(board, rng))
}

fn center_distance(board: &Board, index: usize) -> f64 {
  let center = (board.size() as f64 - 1.0) / 2.0;
  let (row, col) = board.row_col(index);
  (row as f64 - center).abs() + (col as f64 - center).abs()
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use crate::types::Player::{B, W};

  fn board_with(size: usize, stones: &[(usize, Player)]) -> Board {
    let mut board = Board::new(size);
    for (index, player) in stones {
      board.set(*index, *player);
    }
    board
  }

  #[test]
  fn heuristic_opens_at_the_center() {
    let board = Board::new(15);
    assert_eq!(heuristic_move(&board, B), Some(112));
  }

  #[test]
  fn evaluators_are_idempotent() {
    let board = board_with(15, &[(112, B), (113, W), (97, B)]);
    assert_eq!(score_move(&board, 96, B), score_move(&board, 96, B));
    assert_eq!(score_board(&board, W), score_board(&board, W));
  }

  #[test]
  fn winning_move_scores_the_win_constant() {
    let stones: Vec<(usize, Player)> = (0..4).map(|i| (i, B)).collect();
    let board = board_with(15, &stones);
    assert_eq!(score_move(&board, 4, B), WIN_SCORE);
  }

  #[test]
  fn critical_takes_the_win_before_blocking() {
    // Both sides have an open four; the winning cell comes first.
    let mut stones: Vec<(usize, Player)> = (30..34).map(|i| (i, B)).collect();
    stones.extend((60..64).map(|i| (i, W)));
    let board = board_with(15, &stones);
    let choice = critical_move(&board, B).unwrap();
    let mut after = board.clone();
    after.set(choice, B);
    assert!(rules::winning_line(&after, choice, B).is_some());
  }

  #[test]
  fn critical_blocks_an_open_four() {
    // White four on row 7, cols 5..=8, open at both ends.
    let stones: Vec<(usize, Player)> = (110..114).map(|i| (i, W)).collect();
    let board = board_with(15, &stones);
    let choice = critical_move(&board, B).unwrap();
    assert!(choice == 109 || choice == 114);
  }

  #[test]
  fn critical_blocks_a_growing_three() {
    let board = board_with(15, &[(0, W), (1, W), (220, B)]);
    // Cell 2 is the first open cell where White's run would reach three.
    assert_eq!(critical_move(&board, B), Some(2));
  }

  #[test]
  fn critical_is_quiet_on_a_calm_board() {
    let board = board_with(15, &[(112, B), (140, W)]);
    assert_eq!(critical_move(&board, B), None);
  }

  #[test]
  fn candidates_are_open_unique_and_bounded() {
    let board = board_with(15, &[(112, B), (113, W), (97, B), (127, W)]);
    let candidates = top_candidates(&board, B, 10);
    assert_eq!(candidates.len(), 10);
    let mut seen = std::collections::HashSet::new();
    for index in &candidates {
      assert!(board.is_open(*index));
      assert!(seen.insert(*index));
    }

    // Limit larger than the number of open cells.
    let mut small = Board::new(4);
    for i in 0..13 {
      small.set(i, if i % 2 == 0 { B } else { W });
    }
    assert_eq!(top_candidates(&small, B, 10).len(), 3);
  }

  #[test]
  fn board_strength_is_not_flip_symmetric() {
    let board = board_with(15, &[(112, B)]);
    let for_black = score_board(&board, B);
    let for_white = score_board(&board, W);
    assert!((for_black + for_white).abs() > 1.0);
  }

  #[test]
  fn minimax_takes_an_immediate_win() {
    let stones: Vec<(usize, Player)> = (45..49).map(|i| (i, B)).collect();
    let board = board_with(15, &stones);
    let choice = minimax_move(&board, B).unwrap();
    let mut after = board.clone();
    after.set(choice, B);
    assert!(rules::winning_line(&after, choice, B).is_some());
  }

  #[test]
  fn minimax_leaves_the_board_untouched() {
    let board = board_with(15, &[(112, B), (113, W)]);
    let before = board.cells();
    let _ = minimax_move(&board, B);
    assert_eq!(board.cells(), before);
  }

  #[test]
  fn fallback_prefers_the_center() {
    let board = Board::new(15);
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(fallback_move(&board, &mut rng), Some(112));
  }

  #[test]
  fn fallback_is_deterministic_under_a_seed() {
    let board = board_with(15, &[(112, B), (0, W), (1, B)]);
    let pick = |seed: u64| {
      let mut rng = StdRng::seed_from_u64(seed);
      fallback_move(&board, &mut rng)
    };
    assert_eq!(pick(42), pick(42));
    let choice = pick(42).unwrap();
    assert!(board.is_open(choice));
  }

  #[test]
  fn fallback_returns_none_only_when_full() {
    let mut board = Board::new(4);
    for i in 0..16 {
      board.set(i, if i % 2 == 0 { B } else { W });
    }
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(fallback_move(&board, &mut rng), None);
  }

  #[test]
  fn select_ignores_an_occupied_advisory_cell() {
    let board = board_with(15, &[(5, B), (40, W)]);
    let mut rng = StdRng::seed_from_u64(3);
    let choice = select_move(&board, B, Difficulty::Medium, Some(5), &mut rng).unwrap();
    assert_ne!(choice, 5);
    assert!(board.is_open(choice));
  }

  #[test]
  fn select_prefers_tactics_over_advice() {
    // White threatens a five; the advisory points elsewhere.
    let stones: Vec<(usize, Player)> = (60..64).map(|i| (i, W)).collect();
    let board = board_with(15, &stones);
    let mut rng = StdRng::seed_from_u64(3);
    let choice = select_move(&board, B, Difficulty::Hard, Some(200), &mut rng);
    assert_eq!(choice, Some(64));
  }

  #[test]
  fn select_takes_a_valid_advisory_cell_on_a_quiet_board() {
    let board = board_with(15, &[(112, B), (113, W)]);
    let mut rng = StdRng::seed_from_u64(3);
    let choice = select_move(&board, B, Difficulty::Medium, Some(97), &mut rng);
    assert_eq!(choice, Some(97));
  }
}
