//! Detail page kinds and their tab sets

use std::fmt;

/// Which detail page is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Account,
    Block,
    Token,
}

impl PageKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            PageKind::Account => "account",
            PageKind::Block => "block",
            PageKind::Token => "token",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "account" => Some(PageKind::Account),
            "block" => Some(PageKind::Block),
            "token" => Some(PageKind::Token),
            _ => None,
        }
    }

    /// Ordered tab set for the page. The first tab is the default.
    pub fn tabs(&self) -> &'static [Tab] {
        match self {
            PageKind::Account => &[
                Tab::Transactions,
                Tab::Erc20,
                Tab::Bridged,
                Tab::Assets,
                Tab::Contract,
                Tab::Events,
            ],
            PageKind::Block => &[Tab::Transactions, Tab::Bridged],
            PageKind::Token => &[Tab::Transfers, Tab::Activity, Tab::Bridged],
        }
    }

    pub fn default_tab(&self) -> Tab {
        self.tabs()[0]
    }

    pub fn has_tab(&self, tab: Tab) -> bool {
        self.tabs().contains(&tab)
    }

    /// Resolve a `tab` query value against this page's tab set
    pub fn parse_tab(&self, raw: &str) -> Option<Tab> {
        Tab::from_tag(raw).filter(|tab| self.has_tab(*tab))
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Tab tags used in the `tab` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tab {
    Transactions,
    Erc20,
    Transfers,
    Bridged,
    Assets,
    Contract,
    Events,
    /// ERC-721 transfers of a collection
    Activity,
}

impl Tab {
    pub fn tag(&self) -> &'static str {
        match self {
            Tab::Transactions => "transactions",
            Tab::Erc20 => "erc20",
            Tab::Transfers => "transfers",
            Tab::Bridged => "bridged",
            Tab::Assets => "assets",
            Tab::Contract => "contract",
            Tab::Events => "events",
            Tab::Activity => "activity",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "transactions" => Some(Tab::Transactions),
            "erc20" => Some(Tab::Erc20),
            "transfers" => Some(Tab::Transfers),
            "bridged" => Some(Tab::Bridged),
            "assets" => Some(Tab::Assets),
            "contract" => Some(Tab::Contract),
            "events" => Some(Tab::Events),
            "activity" => Some(Tab::Activity),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Transactions => "Transactions",
            Tab::Erc20 => "ERC20 Records",
            Tab::Transfers => "Transfer Records",
            Tab::Bridged => "Bridged Records",
            Tab::Assets => "User Defined Assets",
            Tab::Contract => "Contract",
            Tab::Events => "Events",
            Tab::Activity => "NFT Activity",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tabs() {
        assert_eq!(PageKind::Account.default_tab(), Tab::Transactions);
        assert_eq!(PageKind::Block.default_tab(), Tab::Transactions);
        assert_eq!(PageKind::Token.default_tab(), Tab::Transfers);
    }

    #[test]
    fn test_parse_tab_respects_page() {
        assert_eq!(PageKind::Account.parse_tab("events"), Some(Tab::Events));
        assert_eq!(PageKind::Block.parse_tab("events"), None);
        assert_eq!(PageKind::Token.parse_tab("transactions"), None);
        assert_eq!(PageKind::Token.parse_tab("bridged"), Some(Tab::Bridged));
        assert_eq!(PageKind::Token.parse_tab("activity"), Some(Tab::Activity));
        assert_eq!(PageKind::Account.parse_tab("activity"), None);
        assert_eq!(PageKind::Account.parse_tab("nope"), None);
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in [PageKind::Account, PageKind::Block, PageKind::Token] {
            for tab in kind.tabs() {
                assert_eq!(Tab::from_tag(tab.tag()), Some(*tab));
            }
        }
    }
}
