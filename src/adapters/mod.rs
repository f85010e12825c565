// Adapters layer: concrete implementations of the domain ports for external
// systems (hosted backend, places provider, local filesystem).

pub mod google_places;
pub mod postgrest;
pub mod storage;

pub use google_places::GooglePlacesClient;
pub use postgrest::PostgrestClient;
pub use storage::LocalStorage;
