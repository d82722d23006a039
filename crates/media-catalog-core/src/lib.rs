pub mod error;
pub mod filter;
pub mod manager;
pub mod store;
pub mod watchlist;

pub use error::CatalogError;
pub use filter::{
    build_predicates, evaluate, FilterError, FilterField, FilterOperator, FilterOptions, Predicate,
};
pub use manager::{CollectionManager, CollectionTarget, FetchQuery};
pub use store::{MergeOutcome, RecordStore};
pub use watchlist::Watchlist;
