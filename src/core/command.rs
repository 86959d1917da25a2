//! Command parser for the : command system

use crate::domain::format::is_hash;
use crate::domain::{Route, Tab};

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation commands
    Open(String),
    Account(String),
    Block(String),
    Token(String),
    Search(String),
    Back,

    // Page commands
    Tab(String),
    Next,
    Prev,
    First,
    Range {
        from: Option<u64>,
        to: Option<u64>,
    },
    /// NFT activity for one token id; `None` clears it
    Item(Option<u64>),
    Refresh,

    // Actions on the open page
    Copy,
    Export,
    Verify,

    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

impl Command {
    /// Route for navigation commands that name an entity directly
    pub fn target(&self) -> Option<Route> {
        match self {
            Command::Account(id) => Some(Route::account(id.as_str())),
            Command::Block(id) => Some(Route::block(id.as_str())),
            Command::Token(id) => Some(Route::token(id.as_str())),
            Command::Search(query) => Some(search_route(query)),
            _ => None,
        }
    }

    /// Tab named by a `tab` command
    pub fn tab(&self) -> Option<Tab> {
        match self {
            Command::Tab(name) => Tab::from_tag(name),
            _ => None,
        }
    }
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        // Navigation
        "open" | "o" | "go" => match args {
            Some(path) => Command::Open(path),
            None => Command::Unknown(input.to_string()),
        },
        "account" | "acc" | "address" | "addr" => match args {
            Some(id) => Command::Account(id),
            None => Command::Unknown(input.to_string()),
        },
        "block" | "blk" => match args {
            Some(id) => Command::Block(id),
            None => Command::Unknown(input.to_string()),
        },
        "token" | "udt" => match args {
            Some(id) => Command::Token(id),
            None => Command::Unknown(input.to_string()),
        },
        "back" | "b" => Command::Back,

        // Page
        "tab" | "t" => match args {
            Some(name) => Command::Tab(name.to_lowercase()),
            None => Command::Unknown(input.to_string()),
        },
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "first" => Command::First,
        "range" => parse_range(args.as_deref()).unwrap_or(Command::Unknown(input.to_string())),
        "item" => match args.as_deref() {
            None => Command::Item(None),
            Some(raw) => match raw.parse() {
                Ok(id) => Command::Item(Some(id)),
                Err(_) => Command::Unknown(input.to_string()),
            },
        },
        "refresh" | "r" => Command::Refresh,

        "copy" | "y" => Command::Copy,
        "export" | "e" => Command::Export,
        "verify" => Command::Verify,

        "help" | "h" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ if input.starts_with('/') => Command::Open(input.to_string()),
        _ if !input.is_empty() && !input.contains(' ') => Command::Search(input.to_string()),
        _ => Command::Unknown(input.to_string()),
    }
}

/// `range <from> <to>`; `-` leaves a bound open, no arguments clears the range
fn parse_range(args: Option<&str>) -> Option<Command> {
    let Some(args) = args else {
        return Some(Command::Range {
            from: None,
            to: None,
        });
    };
    let mut bounds = args.split_whitespace();
    let from = parse_bound(bounds.next()?)?;
    let to = match bounds.next() {
        Some(raw) => parse_bound(raw)?,
        None => None,
    };
    if bounds.next().is_some() {
        return None;
    }
    Some(Command::Range { from, to })
}

fn parse_bound(raw: &str) -> Option<Option<u64>> {
    if raw == "-" {
        return Some(None);
    }
    raw.replace(',', "").parse().ok().map(Some)
}

/// Bare search input: block numbers and 32-byte hashes open blocks, anything else an account
pub fn search_route(query: &str) -> Route {
    let query = query.trim();
    if !query.is_empty() && query.chars().all(|c| c.is_ascii_digit()) {
        return Route::block(query);
    }
    if is_hash(query) {
        return Route::block(query);
    }
    Route::account(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageKind;

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(
            parse_command("open /block/5?tab=bridged"),
            Command::Open("/block/5?tab=bridged".to_string())
        );
        assert_eq!(parse_command("blk 42"), Command::Block("42".to_string()));
        assert_eq!(
            parse_command("account 0x1234"),
            Command::Account("0x1234".to_string())
        );
        assert_eq!(parse_command("token 1"), Command::Token("1".to_string()));
        assert_eq!(
            parse_command("/token/1"),
            Command::Open("/token/1".to_string())
        );
        assert_eq!(parse_command("back"), Command::Back);
    }

    #[test]
    fn test_parse_page_commands() {
        assert_eq!(parse_command("tab ERC20"), Command::Tab("erc20".to_string()));
        assert_eq!(parse_command("tab erc20").tab(), Some(Tab::Erc20));
        assert_eq!(parse_command("tab nope").tab(), None);
        assert_eq!(parse_command("next"), Command::Next);
        assert_eq!(parse_command("prev"), Command::Prev);
        assert_eq!(parse_command("first"), Command::First);
        assert_eq!(parse_command("refresh"), Command::Refresh);
        assert_eq!(parse_command("verify"), Command::Verify);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_command("range 100 2,000"),
            Command::Range {
                from: Some(100),
                to: Some(2000)
            }
        );
        assert_eq!(
            parse_command("range - 50"),
            Command::Range {
                from: None,
                to: Some(50)
            }
        );
        assert_eq!(
            parse_command("range"),
            Command::Range {
                from: None,
                to: None
            }
        );
        assert_eq!(
            parse_command("range a b"),
            Command::Unknown("range a b".to_string())
        );
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_command("item 42"), Command::Item(Some(42)));
        assert_eq!(parse_command("item"), Command::Item(None));
        assert_eq!(parse_command("item x"), Command::Unknown("item x".to_string()));
    }

    #[test]
    fn test_bare_input_is_search() {
        let block = parse_command("12345").target().unwrap();
        assert_eq!(block.kind, PageKind::Block);
        assert_eq!(block.id, "12345");

        let hash = format!("0x{}", "ab".repeat(32));
        let by_hash = parse_command(&hash).target().unwrap();
        assert_eq!(by_hash.kind, PageKind::Block);

        let account = parse_command("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
            .target()
            .unwrap();
        assert_eq!(account.kind, PageKind::Account);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("two words"),
            Command::Unknown("two words".to_string())
        );
        assert_eq!(parse_command("block"), Command::Unknown("block".to_string()));
    }
}
