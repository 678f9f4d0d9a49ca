pub mod id_scheme;
pub mod ignore_entry;
pub mod imdb_id;
pub mod media_kind;

pub use id_scheme::{FolderTag, IdScheme};
pub use ignore_entry::{IgnoreEntry, NO_TRAILER_REASON};
pub use imdb_id::ImdbId;
pub use media_kind::MediaKind;
