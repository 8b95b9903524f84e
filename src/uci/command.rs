use crate::engine::GoOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(GoOptions),
    Perft(u32),
    SetOption(Vec<String>),
    Eval,
    Display,
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let trimmed = line.trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *parts.first()?;

    let owned_parts = || parts.iter().map(|p| (*p).to_string()).collect::<Vec<String>>();

    let cmd = match first {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(owned_parts()),
        "go" => UciCommand::Go(parse_go(&parts)),
        "perft" => {
            let depth = parts.get(1).and_then(|v| v.parse::<u32>().ok()).unwrap_or(1);
            UciCommand::Perft(depth)
        }
        "setoption" => UciCommand::SetOption(owned_parts()),
        "eval" => UciCommand::Eval,
        "d" => UciCommand::Display,
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    };

    Some(cmd)
}

/// Parse the arguments of a `go` command. Unknown tokens and unparsable
/// values are skipped.
#[must_use]
pub fn parse_go(parts: &[&str]) -> GoOptions {
    let mut go = GoOptions::default();
    let mut tokens = parts.iter().skip(1);

    while let Some(&token) = tokens.next() {
        match token {
            "infinite" => go.infinite = true,
            "ponder" => go.ponder = true,
            "depth" => go.depth = next_number(&mut tokens),
            "movetime" => go.movetime = next_number(&mut tokens),
            "wtime" => go.wtime = next_number(&mut tokens),
            "btime" => go.btime = next_number(&mut tokens),
            "winc" => go.winc = next_number(&mut tokens),
            "binc" => go.binc = next_number(&mut tokens),
            "movestogo" => go.movestogo = next_number(&mut tokens),
            "nodes" => go.nodes = next_number(&mut tokens),
            _ => {}
        }
    }

    go
}

fn next_number<'a, 'b: 'a, T, I>(tokens: &mut I) -> Option<T>
where
    T: std::str::FromStr,
    I: Iterator<Item = &'a &'b str>,
{
    // GUIs occasionally send a negative clock after a flag fall
    tokens.next().and_then(|v| match v.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) if v.starts_with('-') => "0".parse().ok(),
        Err(_) => None,
    })
}
