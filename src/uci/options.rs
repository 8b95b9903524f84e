use crate::tt::DEFAULT_HASH_MB;

use super::print::send;

pub const MIN_HASH_MB: usize = 1;
pub const MAX_HASH_MB: usize = 4096;
pub const DEFAULT_CONTEMPT: i32 = 10;
pub const MIN_CONTEMPT: i32 = -100;
pub const MAX_CONTEMPT: i32 = 100;
pub const DEFAULT_MOVE_OVERHEAD_MS: u64 = 30;
pub const MAX_MOVE_OVERHEAD_MS: u64 = 5000;

/// Side effect a `setoption` needs from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOptionAction {
    ResizeHash(usize),
    ClearHash,
    SetContempt(i32),
    SetMoveOverhead(u64),
}

#[derive(Debug, Clone)]
pub struct UciOptions {
    pub hash_mb: usize,
    pub contempt: i32,
    pub move_overhead_ms: u64,
    pub ponder: bool,
}

impl Default for UciOptions {
    fn default() -> Self {
        UciOptions::new(DEFAULT_HASH_MB)
    }
}

impl UciOptions {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        UciOptions {
            hash_mb,
            contempt: DEFAULT_CONTEMPT,
            move_overhead_ms: DEFAULT_MOVE_OVERHEAD_MS,
            ponder: false,
        }
    }

    /// The `uci` handshake: identity, every option, then `uciok`.
    #[must_use]
    pub fn handshake(&self) -> Vec<String> {
        vec![
            format!("id name fe64 {}", env!("CARGO_PKG_VERSION")),
            "id author the fe64 developers".to_string(),
            format!(
                "option name Hash type spin default {} min {MIN_HASH_MB} max {MAX_HASH_MB}",
                self.hash_mb
            ),
            format!(
                "option name Contempt type spin default {} min {MIN_CONTEMPT} max {MAX_CONTEMPT}",
                self.contempt
            ),
            format!("option name Ponder type check default {}", self.ponder),
            format!(
                "option name Move Overhead type spin default {} min 0 max {MAX_MOVE_OVERHEAD_MS}",
                self.move_overhead_ms
            ),
            "option name Clear Hash type button".to_string(),
            "uciok".to_string(),
        ]
    }

    pub fn print(&self) {
        for line in self.handshake() {
            send(&line);
        }
    }

    /// Record an option change. Returns the action the engine must take, if
    /// any. Unknown names and unparsable values are ignored.
    pub fn apply_setoption(&mut self, name: &str, value: Option<&str>) -> Option<UciOptionAction> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "hash" => {
                let mb = value?.trim().parse::<usize>().ok()?;
                let mb = mb.clamp(MIN_HASH_MB, MAX_HASH_MB);
                self.hash_mb = mb;
                Some(UciOptionAction::ResizeHash(mb))
            }
            "contempt" => {
                let cp = value?.trim().parse::<i32>().ok()?;
                self.contempt = cp.clamp(MIN_CONTEMPT, MAX_CONTEMPT);
                Some(UciOptionAction::SetContempt(self.contempt))
            }
            "move overhead" => {
                let ms = value?.trim().parse::<u64>().ok()?;
                self.move_overhead_ms = ms.min(MAX_MOVE_OVERHEAD_MS);
                Some(UciOptionAction::SetMoveOverhead(self.move_overhead_ms))
            }
            "ponder" => {
                if let Some(v) = value {
                    self.ponder = matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1");
                }
                None
            }
            "clear hash" => Some(UciOptionAction::ClearHash),
            _ => {
                log::debug!("ignoring unknown option '{name}'");
                None
            }
        }
    }
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.first() != Some(&"setoption") {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}
