//! Domain layer - explorer entities, routes and list shapes
//!
//! Pure data types with no I/O. The session layer builds page state on top of
//! these and the infrastructure layer fills them from the backend.

pub mod cursor;
pub mod entity;
pub mod error;
pub mod format;
pub mod list;
pub mod route;
pub mod tab;

pub use cursor::Cursor;
pub use entity::{
    AccountLookup, AccountSubtype, AccountType, AccountView, BlockView, EntityState, Fields,
    TokenView,
};
pub use error::{ExplorerError, Result};
pub use list::{ListData, ListFilter, ListKind, ListPage, ListRequest, PageMetadata, Paging};
pub use route::Route;
pub use tab::{PageKind, Tab};
