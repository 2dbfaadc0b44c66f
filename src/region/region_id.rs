use std::{fmt, sync::Arc};

/// Stable identifier of a region (e.g. a state or county code).
/// Keeps the original text (with leading zeros) and clones without allocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(Arc<str>);

impl RegionId {
    #[inline] pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self { Self(Arc::from(id)) }
}

impl AsRef<str> for RegionId {
    fn as_ref(&self) -> &str { &self.0 }
}
