use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};

use crate::core::{Action, NotifyLevel};
use crate::domain::{AccountSubtype, Route, Tab};
use crate::infrastructure::{RuntimeCommand, RuntimeEvent};
use crate::session::live::SubscriptionChange;
use crate::session::page::{outcome_for, PageOutcome};
use crate::session::render::{ListBody, PageView};
use crate::session::{PageSession, SessionSettings};

/// Redirect hops allowed for one navigation
pub const MAX_REDIRECTS: u8 = 3;

const STATUS_TTL: Duration = Duration::from_secs(4);

const SOURCIFY_URL: &str = "https://sourcify.dev";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// What fills the main area
pub enum Screen {
    Empty,
    Loading(Route),
    Page(Box<PageSession>),
    NotFound(Route),
    Failed { route: Route, message: String },
}

pub struct App {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub status: Option<StatusMessage>,
    pub selected_row: usize,
    pub help_open: bool,
    pub should_quit: bool,
    settings: SessionSettings,
    export_dir: Option<PathBuf>,
    history: Vec<Route>,
    nav_seq: u64,
    redirects: u8,
    pending: Vec<RuntimeCommand>,
    pending_clipboard: Option<String>,
}

impl App {
    pub fn new(settings: SessionSettings, export_dir: Option<PathBuf>) -> Self {
        Self {
            screen: Screen::Empty,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            status: None,
            selected_row: 0,
            help_open: false,
            should_quit: false,
            settings,
            export_dir,
            history: Vec::new(),
            nav_seq: 0,
            redirects: 0,
            pending: Vec::new(),
            pending_clipboard: None,
        }
    }

    pub fn current_route(&self) -> Option<&Route> {
        match &self.screen {
            Screen::Empty => None,
            Screen::Loading(route) | Screen::NotFound(route) => Some(route),
            Screen::Failed { route, .. } => Some(route),
            Screen::Page(session) => Some(session.route()),
        }
    }

    pub fn session(&self) -> Option<&PageSession> {
        match &self.screen {
            Screen::Page(session) => Some(&**session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut PageSession> {
        match &mut self.screen {
            Screen::Page(session) => Some(&mut **session),
            _ => None,
        }
    }

    /// The composed page for this frame
    pub fn page_view(&self) -> Option<PageView> {
        self.session().map(|session| session.compose(Utc::now()))
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(status) = self.status.as_ref() {
            if now.saturating_duration_since(status.since) > STATUS_TTL {
                self.status = None;
            }
        }
        let polls = match self.session_mut() {
            Some(session) => session.poll_due(now),
            None => Vec::new(),
        };
        self.pending
            .extend(polls.into_iter().map(RuntimeCommand::Fetch));
    }

    /// Open a new route, remembering the current one for `back`
    pub fn navigate(&mut self, route: Route) {
        if let Some(current) = self.current_route().cloned() {
            if current == route {
                return;
            }
            self.history.push(current);
        }
        self.redirects = 0;
        self.go_to(route);
    }

    pub fn back(&mut self) {
        match self.history.pop() {
            Some(route) => {
                self.redirects = 0;
                self.go_to(route);
            }
            None => self.set_status("Nothing to go back to", StatusLevel::Warn),
        }
    }

    /// Switch within the open page when the entity stays the same, else load
    fn go_to(&mut self, route: Route) {
        let checked = match self.session() {
            Some(session) if session.route().same_entity(&route) => {
                Some(session.check_route(&route))
            }
            _ => None,
        };
        match checked {
            Some(Ok(())) => {
                let fetches = match self.session_mut() {
                    Some(session) => {
                        session.set_route(route);
                        session.plan_fetches(Instant::now())
                    }
                    None => Vec::new(),
                };
                self.selected_row = 0;
                self.pending
                    .extend(fetches.into_iter().map(RuntimeCommand::Fetch));
                self.check_list_bounds();
            }
            Some(Err(err)) => {
                let outcome = outcome_for(&route, err);
                self.apply_outcome(outcome, Instant::now());
            }
            None => self.load(route),
        }
    }

    /// Redirect when the landed list shows the page number is past the end
    fn check_list_bounds(&mut self) {
        let Some(session) = self.session() else {
            return;
        };
        if let Err(err) = session.check_list_bounds() {
            let outcome = outcome_for(session.route(), err);
            self.apply_outcome(outcome, Instant::now());
        }
    }

    fn load(&mut self, route: Route) {
        self.leave_page();
        self.nav_seq += 1;
        self.selected_row = 0;
        info!(seq = self.nav_seq, %route, "navigating");
        self.pending.push(RuntimeCommand::LoadPage {
            seq: self.nav_seq,
            route: route.clone(),
        });
        self.screen = Screen::Loading(route);
    }

    fn leave_page(&mut self) {
        let topic = self.session_mut().and_then(|session| session.teardown());
        if let Some(topic) = topic {
            self.pending.push(RuntimeCommand::Unsubscribe { topic });
        }
    }

    /// Apply one event from the runtime worker
    pub fn handle_event(&mut self, event: RuntimeEvent, now: Instant) {
        match event {
            RuntimeEvent::PageLoaded { seq, outcome } => {
                if seq != self.nav_seq {
                    debug!(seq, current = self.nav_seq, "dropping stale page load");
                    return;
                }
                self.apply_outcome(outcome, now);
            }
            RuntimeEvent::Fetched { key, result } => {
                if let Some(session) = self.session_mut() {
                    session.apply_result(&key, result, now);
                }
                self.check_list_bounds();
            }
            RuntimeEvent::Live { topic, message } => {
                let change = match self.session_mut() {
                    Some(session) => session
                        .apply_live(&topic, message)
                        .then(|| session.sync_subscription()),
                    None => None,
                };
                if let Some(change) = change {
                    self.apply_subscription(change);
                }
            }
            RuntimeEvent::ChannelClosed { topic, reason } => {
                let current = self
                    .session()
                    .and_then(|s| self.settings.channels.topic_for(s.entity()));
                if current.as_deref() == Some(topic.as_str()) {
                    self.set_status(
                        format!("Live updates interrupted: {}", reason),
                        StatusLevel::Warn,
                    );
                }
            }
            RuntimeEvent::ContractVerified { address, contract } => {
                let has_abi = contract
                    .as_ref()
                    .and_then(|c| c.abi.as_ref())
                    .is_some_and(|abi| !abi.is_null());
                if has_abi {
                    self.set_status(format!("Verified {}", address), StatusLevel::Info);
                    let fetches = match self.session_mut() {
                        Some(session) => session.refresh(now),
                        None => Vec::new(),
                    };
                    self.pending
                        .extend(fetches.into_iter().map(RuntimeCommand::Fetch));
                } else {
                    self.set_status(
                        format!("No verified source found. Verify it on {}", SOURCIFY_URL),
                        StatusLevel::Warn,
                    );
                }
            }
            RuntimeEvent::Error { message } => self.set_status(message, StatusLevel::Error),
        }
    }

    fn apply_outcome(&mut self, outcome: PageOutcome, now: Instant) {
        let route = self.current_route().cloned();
        match outcome {
            PageOutcome::Ready(page) => {
                let mut session = PageSession::new(*page, self.settings.clone(), now);
                let change = session.sync_subscription();
                let fetches = session.plan_fetches(now);
                self.screen = Screen::Page(Box::new(session));
                self.apply_subscription(change);
                self.pending
                    .extend(fetches.into_iter().map(RuntimeCommand::Fetch));
            }
            PageOutcome::Redirect { to, reason } => {
                self.redirects += 1;
                if self.redirects > MAX_REDIRECTS {
                    self.leave_page();
                    self.screen = Screen::Failed {
                        route: to,
                        message: "Too many redirects".to_string(),
                    };
                    return;
                }
                self.set_status(format!("{}, showing {}", reason, to), StatusLevel::Warn);
                self.go_to(to);
            }
            PageOutcome::NotFound => {
                self.screen = Screen::NotFound(route.unwrap_or_else(|| Route::block("")));
            }
            PageOutcome::Failed(message) => {
                self.screen = Screen::Failed {
                    route: route.unwrap_or_else(|| Route::block("")),
                    message,
                };
            }
        }
    }

    fn apply_subscription(&mut self, change: SubscriptionChange) {
        match change {
            SubscriptionChange::Keep => {}
            SubscriptionChange::Subscribe(topic) => {
                self.pending.push(RuntimeCommand::Subscribe { topic });
            }
            SubscriptionChange::Resubscribe { from, to } => {
                self.pending.push(RuntimeCommand::Unsubscribe { topic: from });
                self.pending.push(RuntimeCommand::Subscribe { topic: to });
            }
            SubscriptionChange::Unsubscribe(topic) => {
                self.pending.push(RuntimeCommand::Unsubscribe { topic });
            }
        }
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        self.exit_command();
        if input.is_empty() {
            return;
        }
        let action = Action::from(crate::core::parse_command(&input));
        self.command.last = Some(input);
        self.apply_action(action);
    }

    /// Apply an action from a key press or a command
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Navigate(route) => self.navigate(route),
            Action::OpenPath(path) => match Route::parse(&path) {
                Ok(route) => self.navigate(route),
                Err(err) => self.set_status(err.to_string(), StatusLevel::Error),
            },
            Action::Back => self.back(),
            Action::CycleTab { forward } => {
                if let Some(route) = self.session().and_then(|s| s.cycle_tab(forward)) {
                    self.navigate(route);
                }
            }
            Action::SelectTab(name) => self.select_tab(&name),
            Action::NextPage => {
                match self.session().and_then(PageSession::next_page_route) {
                    Some(route) => self.navigate(route),
                    None => self.set_status("Already on the last page", StatusLevel::Info),
                }
            }
            Action::PrevPage => {
                match self.session().and_then(PageSession::prev_page_route) {
                    Some(route) => self.navigate(route),
                    None => self.set_status("Already on the first page", StatusLevel::Info),
                }
            }
            Action::FirstPage => {
                if let Some(route) = self.session().map(PageSession::first_page_route) {
                    self.navigate(route);
                }
            }
            Action::SetRange { from, to } => self.set_range(from, to),
            Action::FilterItem(id) => self.filter_item(id),
            Action::SelectRow { down } => self.move_selection(down),
            Action::OpenSelected => self.open_selected(),
            Action::Refresh => self.refresh(),
            Action::Copy => self.copy_id(),
            Action::Export => self.export(),
            Action::Verify => self.verify(),
            Action::OpenCommand => self.enter_command(),
            Action::ToggleHelp => self.help_open = !self.help_open,
            Action::Notify(msg, level) => self.set_status(msg, level.into()),
            Action::Quit => self.should_quit = true,
        }
    }

    fn select_tab(&mut self, name: &str) {
        let Some(session) = self.session() else {
            return;
        };
        let tab = Tab::from_tag(name).filter(|tab| session.visible_tabs().contains(tab));
        match tab {
            Some(tab) => {
                let route = session.route().with_tab(tab);
                self.navigate(route);
            }
            None => self.set_status(format!("No tab '{}' on this page", name), StatusLevel::Warn),
        }
    }

    fn set_range(&mut self, from: Option<u64>, to: Option<u64>) {
        let route = match self.session() {
            Some(session) if session.route().kind == crate::domain::PageKind::Account => {
                session.route().with_block_range(from, to)
            }
            _ => {
                self.set_status("Block ranges apply to account pages", StatusLevel::Warn);
                return;
            }
        };
        self.navigate(route);
    }

    fn filter_item(&mut self, token_id: Option<u64>) {
        let route = match self.session() {
            Some(session) if session.visible_tabs().contains(&Tab::Activity) => {
                session.route().with_token_id(token_id)
            }
            _ => {
                self.set_status("Token ids apply to NFT collections", StatusLevel::Warn);
                return;
            }
        };
        self.navigate(route);
    }

    fn move_selection(&mut self, down: bool) {
        let rows = match self.page_view().map(|view| view.body) {
            Some(ListBody::Table(table)) => table.rows.len(),
            _ => 0,
        };
        if rows == 0 {
            self.selected_row = 0;
            return;
        }
        self.selected_row = if down {
            (self.selected_row + 1).min(rows - 1)
        } else {
            self.selected_row.saturating_sub(1)
        };
    }

    fn open_selected(&mut self) {
        let link = match self.page_view().map(|view| view.body) {
            Some(ListBody::Table(table)) => table
                .rows
                .get(self.selected_row)
                .and_then(|row| row.link.clone()),
            _ => None,
        };
        match link {
            Some(route) => self.navigate(route),
            None => self.set_status("Nothing to open", StatusLevel::Info),
        }
    }

    pub fn refresh(&mut self) {
        if let Some(session) = self.session_mut() {
            let fetches = session.refresh(Instant::now());
            self.pending
                .extend(fetches.into_iter().map(RuntimeCommand::Fetch));
            self.set_status("Refreshing", StatusLevel::Info);
            return;
        }
        if let Some(route) = self.current_route().cloned() {
            self.redirects = 0;
            self.load(route);
        }
    }

    fn copy_id(&mut self) {
        let id = self.session().map(|session| session.entity_id().to_string());
        match id {
            Some(id) => {
                self.set_status(format!("Copied {}", id), StatusLevel::Info);
                self.pending_clipboard = Some(id);
            }
            None => self.set_status("Nothing to copy", StatusLevel::Warn),
        }
    }

    fn export(&mut self) {
        let Some(session) = self.session() else {
            self.set_status("Nothing to export", StatusLevel::Warn);
            return;
        };
        let view = session.compose(Utc::now());
        let tab = session.active_tab().map(|t| t.tag()).unwrap_or("overview");
        let action = crate::modules::export::export_page(
            self.export_dir.as_deref(),
            session.route().kind.path_segment(),
            session.entity_id(),
            tab,
            &view,
        );
        self.apply_action(action);
    }

    fn verify(&mut self) {
        let target = self.session().and_then(|session| {
            let account = session.entity().account()?;
            match account.subtype() {
                AccountSubtype::Contract { has_abi: false } => account.eth_address,
                _ => None,
            }
        });
        match target {
            Some(address) => {
                self.set_status(format!("Verifying {}", address), StatusLevel::Info);
                self.pending.push(RuntimeCommand::VerifyContract { address });
            }
            None => self.set_status(
                "Only unverified contract accounts can be verified",
                StatusLevel::Warn,
            ),
        }
    }

    /// Commands queued for the runtime worker since the last call
    pub fn take_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn take_clipboard(&mut self) -> Option<String> {
        self.pending_clipboard.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityState, Fields, ListData, ListPage, PageKind, PageMetadata};
    use crate::session::live::LiveMessage;
    use crate::session::query::{QueryKey, QueryValue};
    use crate::session::page::LoadedPage;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn app() -> App {
        App::new(SessionSettings::default(), None)
    }

    fn last_seq(app: &mut App) -> u64 {
        app.take_commands()
            .into_iter()
            .filter_map(|cmd| match cmd {
                RuntimeCommand::LoadPage { seq, .. } => Some(seq),
                _ => None,
            })
            .last()
            .unwrap()
    }

    fn ready_block(number: u64) -> PageOutcome {
        PageOutcome::Ready(Box::new(LoadedPage {
            route: Route::block(number.to_string()),
            entity: EntityState::new(
                PageKind::Block,
                fields(json!({"number": number, "hash": "0xaa"})),
            ),
            balance: None,
            deployer: None,
            list: None,
        }))
    }

    #[test]
    fn test_navigate_issues_load() {
        let mut app = app();
        app.navigate(Route::block("5"));
        assert!(matches!(app.screen, Screen::Loading(_)));
        assert_eq!(last_seq(&mut app), 1);
    }

    #[test]
    fn test_stale_page_load_is_dropped() {
        let mut app = app();
        app.navigate(Route::block("5"));
        app.navigate(Route::block("6"));
        let seq = last_seq(&mut app);
        app.handle_event(
            RuntimeEvent::PageLoaded {
                seq: seq - 1,
                outcome: ready_block(5),
            },
            Instant::now(),
        );
        assert!(matches!(app.screen, Screen::Loading(_)));

        app.handle_event(
            RuntimeEvent::PageLoaded {
                seq,
                outcome: ready_block(6),
            },
            Instant::now(),
        );
        let session = app.session().unwrap();
        assert_eq!(session.entity().u64_field("number"), Some(6));
        let commands = app.take_commands();
        assert!(commands.iter().any(
            |c| matches!(c, RuntimeCommand::Subscribe { topic } if topic == "blocks:6")
        ));
    }

    #[test]
    fn test_redirects_are_capped() {
        let mut app = app();
        app.navigate(Route::block("5"));
        for hop in 0..=MAX_REDIRECTS {
            let seq = last_seq(&mut app);
            app.handle_event(
                RuntimeEvent::PageLoaded {
                    seq,
                    outcome: PageOutcome::Redirect {
                        to: Route::block(format!("{}", hop)),
                        reason: "tab not found".into(),
                    },
                },
                Instant::now(),
            );
        }
        assert!(matches!(app.screen, Screen::Failed { .. }));
    }

    #[test]
    fn test_not_found_and_back() {
        let mut app = app();
        app.navigate(Route::block("5"));
        let seq = last_seq(&mut app);
        app.handle_event(
            RuntimeEvent::PageLoaded {
                seq,
                outcome: ready_block(5),
            },
            Instant::now(),
        );
        app.take_commands();

        app.apply_action(Action::Navigate(Route::account("0xnope")));
        let commands = app.take_commands();
        assert!(commands
            .iter()
            .any(|c| matches!(c, RuntimeCommand::Unsubscribe { topic } if topic == "blocks:5")));
        let seq = commands
            .iter()
            .find_map(|c| match c {
                RuntimeCommand::LoadPage { seq, .. } => Some(*seq),
                _ => None,
            })
            .unwrap();
        app.handle_event(
            RuntimeEvent::PageLoaded {
                seq,
                outcome: PageOutcome::NotFound,
            },
            Instant::now(),
        );
        assert!(matches!(&app.screen, Screen::NotFound(route) if route.id == "0xnope"));

        app.apply_action(Action::Back);
        assert!(matches!(&app.screen, Screen::Loading(route) if route.id == "5"));
    }

    #[test]
    fn test_live_message_reaches_page() {
        let mut app = app();
        app.navigate(Route::block("5"));
        let seq = last_seq(&mut app);
        app.handle_event(
            RuntimeEvent::PageLoaded {
                seq,
                outcome: ready_block(5),
            },
            Instant::now(),
        );
        app.handle_event(
            RuntimeEvent::Live {
                topic: "blocks:5".into(),
                message: LiveMessage::Partial(fields(json!({"finalize_state": "finalized"}))),
            },
            Instant::now(),
        );
        let entity = app.session().unwrap().entity();
        assert_eq!(entity.str_field("finalize_state"), Some("finalized"));
    }

    fn open_block(app: &mut App, number: u64) {
        app.navigate(Route::block(number.to_string()));
        let seq = last_seq(app);
        app.handle_event(
            RuntimeEvent::PageLoaded {
                seq,
                outcome: ready_block(number),
            },
            Instant::now(),
        );
        app.take_commands();
    }

    fn fetched(commands: Vec<RuntimeCommand>) -> Vec<QueryKey> {
        commands
            .into_iter()
            .filter_map(|cmd| match cmd {
                RuntimeCommand::Fetch(fetch) => Some(fetch.key),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_live_snapshot_with_new_id_resubscribes() {
        let mut app = app();
        open_block(&mut app, 5);
        app.handle_event(
            RuntimeEvent::Live {
                topic: "blocks:5".into(),
                message: LiveMessage::Snapshot(fields(json!({"number": 6, "hash": "0xbb"}))),
            },
            Instant::now(),
        );
        let commands = app.take_commands();
        assert!(commands.contains(&RuntimeCommand::Unsubscribe {
            topic: "blocks:5".into()
        }));
        assert!(commands.contains(&RuntimeCommand::Subscribe {
            topic: "blocks:6".into()
        }));
    }

    #[test]
    fn test_same_entity_routes_are_checked() {
        let mut app = app();
        open_block(&mut app, 5);

        app.navigate(Route::parse("/block/5?tab=bogus").unwrap());
        assert_eq!(app.current_route().unwrap().tab, None);
        assert!(matches!(app.screen, Screen::Page(_)));

        app.navigate(Route::parse("/block/5?tab=bridged&page=0").unwrap());
        let route = app.current_route().unwrap();
        assert_eq!(route.page, None);
        assert_eq!(route.active_tab(), Some(Tab::Bridged));
        let commands = app.take_commands();
        assert!(!commands
            .iter()
            .any(|cmd| matches!(cmd, RuntimeCommand::LoadPage { .. })));
        assert_eq!(fetched(commands).len(), 1);
    }

    #[test]
    fn test_item_filter_needs_nft_collection() {
        let mut app = app();
        open_block(&mut app, 5);
        app.take_commands();

        app.apply_action(Action::FilterItem(Some(3)));
        assert_eq!(app.current_route().unwrap().token_id, None);
        assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_page_past_the_end_redirects_after_fetch() {
        let mut app = app();
        open_block(&mut app, 5);

        app.navigate(Route::parse("/block/5?tab=bridged&page=9").unwrap());
        let keys = fetched(app.take_commands());
        assert_eq!(keys.len(), 1);

        let data = ListData::Bridged(ListPage {
            entries: Vec::new(),
            metadata: PageMetadata {
                total_count: 25,
                before: None,
                after: None,
            },
        });
        app.handle_event(
            RuntimeEvent::Fetched {
                key: keys[0].clone(),
                result: Ok(QueryValue::List(data)),
            },
            Instant::now(),
        );
        assert_eq!(app.current_route().unwrap().page, Some(3));
        assert_eq!(fetched(app.take_commands()).len(), 1);
    }

    #[test]
    fn test_verify_needs_unverified_contract() {
        let mut app = app();
        app.apply_action(Action::Verify);
        assert!(app.take_commands().is_empty());
        assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));
    }

    #[test]
    fn test_command_line_dispatch() {
        let mut app = app();
        app.enter_command();
        app.command.input = "block 9".into();
        app.apply_command();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(matches!(&app.screen, Screen::Loading(route) if route.id == "9"));

        app.command.input = "open /nowhere/1".into();
        app.apply_command();
        assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Error));

        app.command.input = "quit".into();
        app.apply_command();
        assert!(app.should_quit);
    }
}
