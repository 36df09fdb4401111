use crate::engine::Board;
use crate::types::Player;

/// Axis directions as (row, col) steps, scanned in this order:
/// horizontal, vertical, diagonal toward lower-right, diagonal toward
/// lower-left. Each is walked in both orientations from the probed cell.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Returns the ordered indices of the first line of five or more stones
/// through `index`, or None. The first qualifying direction wins.
pub fn winning_line(board: &Board, index: usize, player: Player) -> Option<Vec<usize>> {
  let (row, col) = board.row_col(index);

  for (dr, dc) in DIRECTIONS {
    let forward = walk(board, row, col, dr, dc, player);
    let backward = walk(board, row, col, -dr, -dc, player);

    if backward.len() + 1 + forward.len() >= 5 {
      let mut line: Vec<usize> = backward.into_iter().rev().collect();
      line.push(index);
      line.extend(forward);
      return Some(line);
    }
  }

  None
}

/// Longest contiguous run of `player` stones through `index`, taking the
/// maximum over all four directions. The cell itself counts, so the result
/// is at least 1.
pub fn longest_run_at(board: &Board, index: usize, player: Player) -> usize {
  let (row, col) = board.row_col(index);
  let mut best = 1;

  for (dr, dc) in DIRECTIONS {
    let count = 1
      + walk(board, row, col, dr, dc, player).len()
      + walk(board, row, col, -dr, -dc, player).len();
    if count > best {
      best = count;
    }
  }

  best
}

/// Board-wide maximum run for `player`; 0 when the player has no stones.
pub fn longest_run_for_player(board: &Board, player: Player) -> usize {
  let mut best = 0;
  for index in 0..board.cell_count() {
    if board.get(index) != Some(player) {
      continue;
    }
    let run = longest_run_at(board, index, player);
    if run > best {
      best = run;
    }
  }
  best
}

fn walk(board: &Board, row: usize, col: usize, dr: i32, dc: i32, player: Player) -> Vec<usize> {
  let size = board.size() as i32;
  let mut out = Vec::new();
  let mut r = row as i32 + dr;
  let mut c = col as i32 + dc;

  while r >= 0 && r < size && c >= 0 && c < size {
    let idx = (r * size + c) as usize;
    if board.get(idx) != Some(player) {
      break;
    }
    out.push(idx);
    r += dr;
    c += dc;
  }

  out
}
