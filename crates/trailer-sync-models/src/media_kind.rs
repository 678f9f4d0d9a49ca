use serde::{Deserialize, Serialize};

/// Kind of title an external id may refer to.
///
/// External lookups try each kind in `LOOKUP_ORDER` until one answers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    pub const LOOKUP_ORDER: [MediaKind; 2] = [MediaKind::Movie, MediaKind::Show];
}
