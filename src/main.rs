use std::env;
use std::fs;
use std::io::{self, Write};

use rand::rngs::ThreadRng;

use omok::advisor;
use omok::ai;
use omok::engine::{GameState, DEFAULT_BOARD_SIZE};
use omok::types::{AdvisorConfig, Difficulty, GameRecord, GameResult, Phase, Player};

const COLS: &str = "ABCDEFGHIJKLMNO";

fn main() {
  let config = advisor_config_from_env();
  let mut rng = rand::thread_rng();

  println!("Omok — five in a row on a 15x15 board.");
  println!("Enter moves as column letter + row number, e.g. H8.");
  println!("Commands: save <path>, load <path>, quit.\n");

  let human = prompt_stone();
  let difficulty = prompt_difficulty();

  let advisor_ok = difficulty != Difficulty::Easy && advisor::health(&config);
  if difficulty != Difficulty::Easy {
    if advisor_ok {
      println!("Remote advisor is reachable.");
    } else {
      println!("Remote advisor is unavailable; playing with local search only.");
    }
  }

  let mut game = GameState::new(DEFAULT_BOARD_SIZE);
  game.start();

  loop {
    if let Phase::Terminal { result } = game.phase {
      render(&game);
      match result {
        GameResult::Draw => println!("Draw — the board is full."),
        GameResult::BWin => println!("Black wins!"),
        GameResult::WWin => println!("White wins!"),
      }
      break;
    }

    if game.to_move != human {
      let choice = computer_move(&game, difficulty, &config, advisor_ok, &mut rng);
      match choice {
        Some(index) => {
          if let Err(err) = game.apply_move(index) {
            eprintln!("Computer move rejected: {err}");
            break;
          }
          println!("Computer plays {}.", label_for(index, game.board.size()));
        }
        None => {
          eprintln!("Computer found no move on a non-full board.");
          break;
        }
      }
      continue;
    }

    render(&game);
    let line = match read_line(&format!("{} to move> ", player_name(game.to_move))) {
      Some(line) => line,
      None => break,
    };
    let line = line.trim();

    if line.is_empty() {
      continue;
    }
    if line.eq_ignore_ascii_case("quit") {
      break;
    }
    if let Some(path) = line.strip_prefix("save ") {
      match save_game(&game, path.trim()) {
        Ok(()) => println!("Saved to {}.", path.trim()),
        Err(err) => eprintln!("Save failed: {err}"),
      }
      continue;
    }
    if let Some(path) = line.strip_prefix("load ") {
      match load_game(path.trim()) {
        Ok(loaded) => {
          game = loaded;
          println!("Loaded {}.", path.trim());
        }
        Err(err) => eprintln!("Load failed: {err}"),
      }
      continue;
    }

    match parse_label(line, game.board.size()) {
      Some(index) => {
        if let Err(err) = game.apply_move(index) {
          println!("{err}");
        }
      }
      None => println!("Could not read '{line}' as a coordinate like H8."),
    }
  }
}

/// Selection order per ply: critical tactics, then the remote advisory
/// (guarded by the generation counter so a stale answer is discarded),
/// then the tier's local selector, then the fallback picker.
fn computer_move(
  game: &GameState,
  difficulty: Difficulty,
  config: &AdvisorConfig,
  advisor_ok: bool,
  rng: &mut ThreadRng,
) -> Option<usize> {
  let board = &game.board;
  let player = game.to_move;

  if difficulty == Difficulty::Easy {
    return ai::fallback_move(board, rng);
  }

  if let Some(index) = ai::critical_move(board, player) {
    return Some(index);
  }

  let generation = game.generation();
  let advice = if advisor_ok {
    match advisor::request_move(board, player, config) {
      Ok(suggestion) => suggestion,
      Err(err) => {
        eprintln!("Advisor unavailable: {err}");
        None
      }
    }
  } else {
    None
  };
  let advice = advice.filter(|_| game.generation() == generation);

  if let Some(suggestion) = &advice {
    match &suggestion.reason {
      Some(reason) => println!(
        "Advisor suggests {} ({reason}).",
        label_for(suggestion.index, board.size())
      ),
      None => println!("Advisor suggests {}.", label_for(suggestion.index, board.size())),
    }
  }

  ai::select_move(board, player, difficulty, advice.map(|s| s.index), rng)
}

fn advisor_config_from_env() -> AdvisorConfig {
  let mut config = AdvisorConfig::default();
  if let Ok(url) = env::var("OMOK_ADVISOR_URL") {
    config.base_url = url;
  }
  if let Some(ms) = env::var("OMOK_ADVISOR_TIMEOUT_MS")
    .ok()
    .and_then(|raw| raw.parse::<u64>().ok())
  {
    config.timeout_ms = ms;
  }
  config
}

fn prompt_stone() -> Player {
  loop {
    match read_line("Play Black or White? [b/w] ") {
      Some(line) => match line.trim().to_ascii_lowercase().as_str() {
        "b" | "black" | "" => return Player::B,
        "w" | "white" => return Player::W,
        _ => println!("Please answer b or w."),
      },
      None => return Player::B,
    }
  }
}

fn prompt_difficulty() -> Difficulty {
  loop {
    match read_line("Difficulty? [easy/medium/hard] ") {
      Some(line) => match line.trim().to_ascii_lowercase().as_str() {
        "e" | "easy" => return Difficulty::Easy,
        "m" | "medium" | "" => return Difficulty::Medium,
        "h" | "hard" => return Difficulty::Hard,
        _ => println!("Please answer easy, medium or hard."),
      },
      None => return Difficulty::Medium,
    }
  }
}

fn save_game(game: &GameState, path: &str) -> Result<(), String> {
  let record = game.to_record();
  let json = serde_json::to_string_pretty(&record).map_err(|e| e.to_string())?;
  fs::write(path, json).map_err(|e| e.to_string())
}

fn load_game(path: &str) -> Result<GameState, String> {
  let data = fs::read_to_string(path).map_err(|e| e.to_string())?;
  let record: GameRecord = serde_json::from_str(&data).map_err(|e| e.to_string())?;
  GameState::from_record(record)
}

fn render(game: &GameState) {
  let size = game.board.size();
  let last = game.moves.last().map(|mv| mv.index);

  print!("\n   ");
  for c in COLS.chars().take(size) {
    print!("{c} ");
  }
  println!();

  for row in (0..size).rev() {
    print!("{:>2} ", row + 1);
    for col in 0..size {
      let index = game.board.index(row, col);
      let ch = match game.board.get(index) {
        None => '.',
        Some(Player::B) => 'B',
        Some(Player::W) => 'W',
      };
      if last == Some(index) {
        print!("{ch}<");
      } else {
        print!("{ch} ");
      }
    }
    println!();
  }

  println!(
    "Moves played: {}, cells left: {}",
    game.moves.len(),
    game.board.cell_count() - game.moves.len()
  );
}

fn player_name(player: Player) -> &'static str {
  match player {
    Player::B => "Black",
    Player::W => "White",
  }
}

fn label_for(index: usize, size: usize) -> String {
  let row = index / size;
  let col = index % size;
  let letter = COLS.chars().nth(col).unwrap_or('A');
  format!("{}{}", letter, row + 1)
}

fn parse_label(label: &str, size: usize) -> Option<usize> {
  let mut chars = label.chars();
  let col_char = chars.next()?.to_ascii_uppercase();
  let col = COLS.chars().take(size).position(|c| c == col_char)?;
  let row: usize = chars.as_str().trim().parse().ok()?;
  if row == 0 || row > size {
    return None;
  }
  Some((row - 1) * size + col)
}

fn read_line(prompt: &str) -> Option<String> {
  print!("{prompt}");
  let _ = io::stdout().flush();
  let mut buf = String::new();
  match io::stdin().read_line(&mut buf) {
    Ok(0) => None,
    Ok(_) => Some(buf),
    Err(_) => None,
  }
}
