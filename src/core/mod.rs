pub mod admin;
pub mod catalog;
pub mod geo;
pub mod hours;
pub mod location;
pub mod map;
pub mod refresh;
pub mod search;
pub mod sitemap;

pub use crate::domain::model::{Coordinates, SearchQuery, SortOption, StoreDetail, StoreSummary};
pub use crate::domain::ports::{
    BranchDetailsStore, CatalogAdmin, CatalogReader, Pipeline, PlacesProvider, Storage,
};
pub use crate::utils::error::Result;
pub use refresh::{RefreshEngine, RefreshPipeline, RefreshReport};
