pub mod error;
pub mod factory;
pub mod http;
pub mod imdb;
pub mod tmdb;
pub mod traits;
pub mod tvdb;

pub use error::SourceError;
pub use factory::SourceSet;
pub use imdb::ImdbTrailerSource;
pub use tmdb::TmdbLookup;
pub use traits::{IdLookupProvider, TrailerSource};
pub use tvdb::TvdbLookup;
