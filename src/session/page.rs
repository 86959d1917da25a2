//! Initial page load: route in, ready page or redirect out

use tracing::{debug, info, warn};

use super::query::{plan, spec_for, visible_tabs};
use crate::domain::{
    AccountLookup, EntityState, ExplorerError, ListData, ListRequest, PageKind, Paging, Result,
    Route,
};
use crate::infrastructure::api::{fetch_list, ExplorerApi};

/// Everything a detail page needs before its first frame
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub route: Route,
    pub entity: EntityState,
    /// Account balance in the smallest unit
    pub balance: Option<String>,
    pub deployer: Option<String>,
    pub list: Option<(ListRequest, ListData)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Ready(Box<LoadedPage>),
    Redirect { to: Route, reason: String },
    NotFound,
    Failed(String),
}

/// Load the entity and its active list. Never fails: every error becomes an outcome.
pub async fn load_page(api: &dyn ExplorerApi, route: &Route, page_size: u32) -> PageOutcome {
    info!(%route, "loading page");
    match try_load(api, route, page_size).await {
        Ok(page) => PageOutcome::Ready(Box::new(page)),
        Err(err) => {
            let outcome = outcome_for(route, err);
            debug!(%route, ?outcome, "page not ready");
            outcome
        }
    }
}

/// Map a load error to what the page shows: a redirect, a 404 or a failure
pub fn outcome_for(route: &Route, err: ExplorerError) -> PageOutcome {
    match err {
        ExplorerError::TabNotFound(_) => PageOutcome::Redirect {
            to: route.with_default_tab(),
            reason: err.to_string(),
        },
        ExplorerError::PageNonPositive => PageOutcome::Redirect {
            to: route.with_page(None),
            reason: err.to_string(),
        },
        ExplorerError::PageOverflow { last_page } => PageOutcome::Redirect {
            to: route.with_page(Some(last_page as i64)),
            reason: err.to_string(),
        },
        ExplorerError::NotFound => PageOutcome::NotFound,
        other => {
            warn!(%route, error = %other, "page load failed");
            PageOutcome::Failed(other.to_string())
        }
    }
}

/// Checks that need no entity: the tab names one of the page's tabs and `page` is positive
pub fn check_route_params(route: &Route) -> Result<()> {
    if let Some(raw) = &route.tab {
        if route.kind.parse_tab(raw).is_none() {
            return Err(ExplorerError::TabNotFound(raw.clone()));
        }
    }
    if route.page.is_some_and(|page| page <= 0) {
        return Err(ExplorerError::PageNonPositive);
    }
    Ok(())
}

/// An explicit tab must be visible for this entity
pub fn check_tab_visible(entity: &EntityState, route: &Route) -> Result<()> {
    let (Some(raw), Some(tab)) = (&route.tab, route.active_tab()) else {
        return Ok(());
    };
    if tab != route.kind.default_tab() && !visible_tabs(entity).contains(&tab) {
        return Err(ExplorerError::TabNotFound(raw.clone()));
    }
    Ok(())
}

async fn try_load(api: &dyn ExplorerApi, route: &Route, page_size: u32) -> Result<LoadedPage> {
    check_route_params(route)?;

    let mut balance = None;
    let mut deployer = None;
    let entity = match route.kind {
        PageKind::Account => {
            let lookup = AccountLookup::from_id(&route.id);
            let fields = api.account(&lookup).await?.ok_or(ExplorerError::NotFound)?;
            let entity = EntityState::new(PageKind::Account, fields);
            let account = entity.account().unwrap_or_default();

            balance = Some(match account.eth_address.as_deref().filter(|a| !a.is_empty()) {
                Some(address) => api.balance(address).await.unwrap_or_else(|err| {
                    warn!(%address, error = %err, "balance lookup failed");
                    "0".to_string()
                }),
                None => "0".to_string(),
            });

            let deployment_tx = account
                .smart_contract
                .as_ref()
                .and_then(|c| c.deployment_tx_hash.clone())
                .filter(|h| !h.is_empty());
            if let Some(tx_hash) = deployment_tx {
                deployer = api.deployer(&tx_hash).await.unwrap_or_else(|err| {
                    warn!(%tx_hash, error = %err, "deployer lookup failed");
                    None
                });
            }
            entity
        }
        PageKind::Block => EntityState::new(PageKind::Block, api.block(&route.id).await?),
        PageKind::Token => EntityState::new(PageKind::Token, api.token(&route.id).await?),
    };

    check_tab_visible(&entity, route)?;

    // No list for this tab. Tabs missing their parameters fall back to the default one.
    let Some(request) = plan(&entity, route, page_size) else {
        let tab = route.active_tab().unwrap_or(route.kind.default_tab());
        if route.tab.is_some() && tab != route.kind.default_tab() {
            return Err(ExplorerError::TabNotFound(tab.tag().to_string()));
        }
        return Ok(LoadedPage {
            route: route.clone(),
            entity,
            balance,
            deployer,
            list: None,
        });
    };

    let data = fetch_list(api, &request).await?;
    check_page_bounds(&entity, route, &request, &data)?;

    Ok(LoadedPage {
        route: route.clone(),
        entity,
        balance,
        deployer,
        list: Some((request, data)),
    })
}

/// Number-paged lists must not be asked for a page past the last one
pub fn check_page_bounds(
    entity: &EntityState,
    route: &Route,
    request: &ListRequest,
    data: &ListData,
) -> Result<()> {
    let paging = route
        .active_tab()
        .and_then(|tab| spec_for(entity.kind(), tab))
        .map(|spec| spec.paging);
    if paging != Some(Paging::Number) {
        return Ok(());
    }
    let (Some(page), Some(metadata)) = (request.page, data.metadata()) else {
        return Ok(());
    };
    let last_page = metadata.last_page(request.page_size);
    if page > last_page {
        return Err(ExplorerError::PageOverflow { last_page });
    }
    Ok(())
}
