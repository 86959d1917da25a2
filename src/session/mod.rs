//! Session layer - one open detail page and everything that keeps it current
//!
//! A [`PageSession`] is created from a [`page::LoadedPage`] on the UI thread.
//! It plans fetches for the runtime worker, lands their results, merges live
//! channel messages and composes the [`render::PageView`] for each frame.

pub mod live;
pub mod page;
pub mod query;
pub mod render;
pub mod store;

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{
    AccountLookup, Cursor, EntityState, ListData, PageKind, Paging, Route, Tab,
};
use live::{ChannelPrefixes, LiveMessage, SubscriptionChange, SubscriptionTracker};
use page::{check_page_bounds, check_route_params, check_tab_visible, LoadedPage};
use query::{
    plan, spec_for, visible_tabs, FetchCommand, FetchRequest, ListSlot, QueryCache, QueryKey,
    QueryKind, QueryResult, QueryValue,
};
use render::{compose, PageView, Pagination, RenderInput};
use store::ViewState;

/// Knobs shared by every page session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub page_size: u32,
    pub refetch_every: Duration,
    pub stale_after: Duration,
    pub channels: ChannelPrefixes,
    pub ckb_explorer: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            refetch_every: Duration::from_secs(10),
            stale_after: Duration::from_secs(10),
            channels: ChannelPrefixes::default(),
            ckb_explorer: "https://explorer.nervos.org".to_string(),
        }
    }
}

pub struct PageSession {
    route: Route,
    view: ViewState,
    entity_id: String,
    balance: Option<String>,
    balance_loading: bool,
    overview_loading: bool,
    deployer: Option<String>,
    list: ListSlot,
    cache: QueryCache,
    subscription: SubscriptionTracker,
    settings: SessionSettings,
    last_refetch: Instant,
}

impl PageSession {
    pub fn new(loaded: LoadedPage, settings: SessionSettings, now: Instant) -> Self {
        let LoadedPage {
            route,
            entity,
            balance,
            deployer,
            list,
        } = loaded;
        let entity_id = entity.identifier().unwrap_or_else(|| route.id.clone());
        let mut session = Self {
            route,
            view: ViewState::new(entity),
            entity_id,
            balance,
            balance_loading: false,
            overview_loading: false,
            deployer,
            list: ListSlot::default(),
            cache: QueryCache::new(settings.stale_after),
            subscription: SubscriptionTracker::new(),
            settings,
            last_refetch: now,
        };
        if let Some((request, data)) = list {
            let key = QueryKey::list(session.entity_id.clone(), &request);
            session
                .cache
                .insert(key.clone(), QueryValue::List(data.clone()), now);
            session.list.begin(key.clone(), request);
            session.list.commit(&key, Ok(data));
        }
        session
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn entity(&self) -> &EntityState {
        self.view.entity()
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn revision(&self) -> u64 {
        self.view.revision()
    }

    pub fn list(&self) -> &ListSlot {
        &self.list
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn visible_tabs(&self) -> Vec<Tab> {
        visible_tabs(self.view.entity())
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.route
            .active_tab()
            .filter(|tab| self.visible_tabs().contains(tab))
    }

    /// Move to another tab or page of the same entity. Routes for other
    /// entities are refused; they need a fresh page load.
    pub fn set_route(&mut self, route: Route) -> bool {
        if !route.same_entity(&self.route) {
            return false;
        }
        self.route = route;
        true
    }

    /// Whether `route` can be shown as-is on this page. Errors map to redirects
    /// through [`page::outcome_for`].
    pub fn check_route(&self, route: &Route) -> crate::domain::Result<()> {
        check_route_params(route)?;
        check_tab_visible(self.view.entity(), route)
    }

    /// Page overflow against the landed list metadata
    pub fn check_list_bounds(&self) -> crate::domain::Result<()> {
        match (self.list.request(), self.list.data()) {
            (Some(request), Some(data)) => {
                check_page_bounds(self.view.entity(), &self.route, request, data)
            }
            _ => Ok(()),
        }
    }

    /// The list fetch this frame needs, if any. Fresh cached results land
    /// immediately without a round-trip.
    pub fn plan_fetches(&mut self, now: Instant) -> Vec<FetchCommand> {
        let Some(request) = plan(self.view.entity(), &self.route, self.settings.page_size) else {
            self.list.clear();
            return Vec::new();
        };
        let key = QueryKey::list(self.entity_id.clone(), &request);
        if self.list.active_key() == Some(&key) {
            return Vec::new();
        }

        if let Some(QueryValue::List(data)) = self.cache.get(&key, now).cloned() {
            debug!(?key, "list served from cache");
            self.list.begin(key.clone(), request);
            self.list.commit(&key, Ok(data));
            return Vec::new();
        }

        self.list.begin(key.clone(), request.clone());
        vec![FetchCommand {
            key,
            request: FetchRequest::List(request),
        }]
    }

    /// Overview and balance refetches, once per refetch interval on account pages
    pub fn poll_due(&mut self, now: Instant) -> Vec<FetchCommand> {
        if self.view.entity().kind() != PageKind::Account {
            return Vec::new();
        }
        if now.saturating_duration_since(self.last_refetch) < self.settings.refetch_every {
            return Vec::new();
        }
        self.last_refetch = now;
        self.account_refetch()
    }

    /// Forget cached results and fetch the page's queries again
    pub fn refresh(&mut self, now: Instant) -> Vec<FetchCommand> {
        self.cache.invalidate();
        self.list.clear();
        self.last_refetch = now;
        let mut commands = Vec::new();
        if self.view.entity().kind() == PageKind::Account {
            commands.extend(self.account_refetch());
        }
        commands.extend(self.plan_fetches(now));
        commands
    }

    fn account_refetch(&mut self) -> Vec<FetchCommand> {
        let id = self.entity_id.clone();
        self.overview_loading = true;
        let mut commands = vec![FetchCommand {
            key: QueryKey::overview(id.clone()),
            request: FetchRequest::Overview(AccountLookup::from_id(&id)),
        }];
        if let Some(address) = self.view.entity().str_field("eth_address") {
            self.balance_loading = true;
            commands.push(FetchCommand {
                key: QueryKey::balance(id),
                request: FetchRequest::Balance(address.to_string()),
            });
        }
        commands
    }

    /// Land a fetch result. Results for another entity or an abandoned list key are dropped.
    pub fn apply_result(&mut self, key: &QueryKey, result: QueryResult, now: Instant) {
        if key.entity_id != self.entity_id {
            debug!(?key, "result for another entity");
            return;
        }
        if let Ok(value) = &result {
            self.cache.insert(key.clone(), value.clone(), now);
        }
        match (key.kind, result) {
            (QueryKind::Overview, Ok(QueryValue::Overview(Some(fields)))) => {
                self.overview_loading = false;
                self.view.apply_partial(&fields);
            }
            (QueryKind::Overview, _) => self.overview_loading = false,
            (QueryKind::Balance, Ok(QueryValue::Balance(balance))) => {
                self.balance_loading = false;
                self.balance = Some(balance);
            }
            (QueryKind::Balance, _) => self.balance_loading = false,
            (QueryKind::List(_), Ok(QueryValue::List(data))) => {
                self.list.commit(key, Ok(data));
            }
            (QueryKind::List(_), Ok(_)) => {
                self.list.commit(key, Err("unexpected response".to_string()));
            }
            (QueryKind::List(_), Err(message)) => {
                self.list.commit(key, Err(message));
            }
        }
    }

    /// Which channel the page should hold right now
    pub fn sync_subscription(&mut self) -> SubscriptionChange {
        let desired = self.settings.channels.topic_for(self.view.entity());
        self.subscription.sync(desired)
    }

    /// Leaving the page: the topic to unsubscribe, if any
    pub fn teardown(&mut self) -> Option<String> {
        self.subscription.teardown()
    }

    /// Reduce a live message into the view. Messages for a topic the page no
    /// longer holds are ignored.
    pub fn apply_live(&mut self, topic: &str, message: LiveMessage) -> bool {
        if !self.subscription.is_current(topic) {
            debug!(%topic, "live message for stale topic");
            return false;
        }
        live::reduce(&mut self.view, message);
        true
    }

    pub fn deployer(&self) -> Option<&str> {
        self.deployer.as_deref()
    }

    fn pagination(&self) -> Option<(Paging, Pagination)> {
        let tab = self.active_tab()?;
        let paging = spec_for(self.view.entity().kind(), tab)?.paging;
        let request = self.list.request()?;
        let metadata = self.list.data().and_then(ListData::metadata)?;
        Some((paging, Pagination::new(paging, request, metadata)))
    }

    pub fn next_page_route(&self) -> Option<Route> {
        let (paging, pagination) = self.pagination()?;
        if !pagination.has_next {
            return None;
        }
        match paging {
            Paging::Cursor => {
                let after = self.list.data()?.metadata()?.after.clone()?;
                Some(self.route.with_cursor(Cursor::after(after, self.route.cursor.limit())))
            }
            Paging::Number => Some(
                self.route
                    .with_page(pagination.page.map(|p| (p + 1) as i64)),
            ),
            Paging::None => None,
        }
    }

    pub fn prev_page_route(&self) -> Option<Route> {
        let (paging, pagination) = self.pagination()?;
        if !pagination.has_prev {
            return None;
        }
        match paging {
            Paging::Cursor => {
                let before = self.list.data()?.metadata()?.before.clone()?;
                Some(self.route.with_cursor(Cursor::before(before, self.route.cursor.limit())))
            }
            Paging::Number => {
                let page = pagination.page.unwrap_or(1).saturating_sub(1);
                Some(self.route.with_page((page > 1).then_some(page as i64)))
            }
            Paging::None => None,
        }
    }

    pub fn first_page_route(&self) -> Route {
        self.route
            .with_cursor(Cursor::first(self.route.cursor.limit()))
            .with_page(None)
    }

    /// Step through the visible tabs, wrapping around
    pub fn cycle_tab(&self, forward: bool) -> Option<Route> {
        let tabs = self.visible_tabs();
        if tabs.is_empty() {
            return None;
        }
        let current = self
            .active_tab()
            .and_then(|tab| tabs.iter().position(|t| *t == tab))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % tabs.len()
        } else {
            (current + tabs.len() - 1) % tabs.len()
        };
        Some(self.route.with_tab(tabs[next]))
    }

    pub fn compose(&self, now: DateTime<Utc>) -> PageView {
        compose(&RenderInput {
            entity: self.view.entity(),
            route: &self.route,
            list: &self.list,
            overview_loading: self.overview_loading,
            balance: self.balance.as_deref(),
            balance_loading: self.balance_loading,
            deployer: self.deployer.as_deref(),
            ckb_explorer: &self.settings.ckb_explorer,
            now,
        })
    }
}
