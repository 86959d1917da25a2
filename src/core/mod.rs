pub mod action;
pub mod command;

pub use action::{action_for_key, Action, NotifyLevel};
pub use command::{parse_command, search_route, Command};
