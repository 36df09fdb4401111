use std::time::Duration;

use lazy_static::lazy_static;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::engine::Board;
use crate::types::{AdvisorConfig, Player};

/// At most this many ranked entries are considered from one response.
const MAX_RANKED_MOVES: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
  pub index: usize,
  pub reason: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdviceRequest<'a> {
  board: &'a [Option<Player>],
  board_size: usize,
  current_player: Player,
}

#[derive(Deserialize)]
struct RankedMove {
  index: Option<i64>,
  #[serde(default)]
  reason: Option<String>,
}

#[derive(Deserialize)]
struct AdviceResponse {
  #[serde(default)]
  moves: Option<Vec<RankedMove>>,
  #[serde(default)]
  index: Option<i64>,
}

lazy_static! {
  static ref HTTP_CLIENT: Client = Client::builder()
    .timeout(Duration::from_secs(60))
    .build()
    .expect("Failed to create HTTP client");
}

/// Blocking wrapper for the synchronous game loop.
pub fn request_move(
  board: &Board,
  player: Player,
  config: &AdvisorConfig,
) -> Result<Option<Suggestion>, String> {
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .map_err(|e| format!("Failed to create async runtime: {e}"))?;
  rt.block_on(request_move_async(board, player, config))
}

/// Asks the remote advisor for a ranked move. Ok(None) means the advisor
/// answered but proposed nothing playable; every proposed index is checked
/// for range and openness before it is surfaced.
pub async fn request_move_async(
  board: &Board,
  player: Player,
  config: &AdvisorConfig,
) -> Result<Option<Suggestion>, String> {
  if config.base_url.trim().is_empty() {
    return Err("Advisor URL is not configured".to_string());
  }

  let cells = board.cells();
  let request_body = AdviceRequest {
    board: &cells,
    board_size: board.size(),
    current_player: player,
  };

  let request_timeout = Duration::from_millis(config.timeout_ms);
  let response = timeout(
    request_timeout,
    HTTP_CLIENT
      .post(config.base_url.trim_end_matches('/'))
      .json(&request_body)
      .send(),
  )
  .await
  .map_err(|_| "Advisor request timed out".to_string())?
  .map_err(|e| format!("Advisor request failed: {e}"))?;

  let status = response.status();
  let body = response
    .text()
    .await
    .map_err(|e| format!("Failed to read advisor response: {e}"))?;

  if !status.is_success() {
    return Err(format!("Advisor error ({}): {}", status, truncate_for_error(&body)));
  }

  parse_body(&body, board)
}

pub fn health(config: &AdvisorConfig) -> bool {
  let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
    Ok(rt) => rt,
    Err(_) => return false,
  };
  rt.block_on(health_async(config))
}

/// Reachability probe only; has no bearing on move selection.
pub async fn health_async(config: &AdvisorConfig) -> bool {
  if config.base_url.trim().is_empty() {
    return false;
  }
  let url = format!("{}/health", config.base_url.trim_end_matches('/'));
  let request_timeout = Duration::from_millis(config.timeout_ms);
  match timeout(request_timeout, HTTP_CLIENT.get(&url).send()).await {
    Ok(Ok(response)) => response.status().is_success(),
    _ => false,
  }
}

fn parse_body(body: &str, board: &Board) -> Result<Option<Suggestion>, String> {
  let response: AdviceResponse = serde_json::from_str(body)
    .map_err(|e| format!("Failed to parse advisor response: {e}"))?;
  Ok(first_valid(response, board))
}

fn first_valid(response: AdviceResponse, board: &Board) -> Option<Suggestion> {
  if let Some(moves) = response.moves {
    for ranked in moves.into_iter().take(MAX_RANKED_MOVES) {
      if let Some(index) = valid_index(ranked.index, board) {
        return Some(Suggestion {
          index,
          reason: ranked.reason,
        });
      }
    }
    // A ranked list with no playable entry outranks the bare index.
    return None;
  }

  valid_index(response.index, board).map(|index| Suggestion { index, reason: None })
}

fn valid_index(raw: Option<i64>, board: &Board) -> Option<usize> {
  let raw = raw?;
  if raw < 0 {
    return None;
  }
  let index = raw as usize;
  if board.is_open(index) {
    Some(index)
  } else {
    None
  }
}

fn truncate_for_error(s: &str) -> String {
  if s.len() > 100 {
    format!("{}...", &s[..100])
  } else {
    s.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn board_with_stone_at_5() -> Board {
    let mut board = Board::new(15);
    board.set(5, Player::B);
    board
  }

  #[test]
  fn occupied_index_is_skipped() {
    let board = board_with_stone_at_5();
    let advice = parse_body(r#"{"moves":[{"index":5}]}"#, &board).unwrap();
    assert_eq!(advice, None);
  }

  #[test]
  fn first_valid_ranked_entry_wins() {
    let board = board_with_stone_at_5();
    let body = r#"{"moves":[{"index":5,"reason":"taken"},{"index":40,"reason":"extend"},{"index":41}]}"#;
    let advice = parse_body(body, &board).unwrap().unwrap();
    assert_eq!(advice.index, 40);
    assert_eq!(advice.reason.as_deref(), Some("extend"));
  }

  #[test]
  fn only_three_ranked_entries_are_considered() {
    let board = board_with_stone_at_5();
    let body = r#"{"moves":[{"index":-1},{"index":500},{"index":5},{"index":40}]}"#;
    assert_eq!(parse_body(body, &board).unwrap(), None);
  }

  #[test]
  fn bare_index_form_is_accepted() {
    let board = board_with_stone_at_5();
    let advice = parse_body(r#"{"index":12}"#, &board).unwrap().unwrap();
    assert_eq!(advice.index, 12);
    assert_eq!(advice.reason, None);
  }

  #[test]
  fn out_of_range_and_negative_indices_are_filtered() {
    let board = board_with_stone_at_5();
    assert_eq!(parse_body(r#"{"index":225}"#, &board).unwrap(), None);
    assert_eq!(parse_body(r#"{"index":-3}"#, &board).unwrap(), None);
  }

  #[test]
  fn malformed_payload_is_an_error() {
    let board = board_with_stone_at_5();
    assert!(parse_body("not json", &board).is_err());
    assert!(parse_body(r#"{"moves":"H8"}"#, &board).is_err());
  }

  #[test]
  fn missing_fields_mean_no_suggestion() {
    let board = board_with_stone_at_5();
    assert_eq!(parse_body("{}", &board).unwrap(), None);
  }
}
