//! Strategy table: which caching discipline serves each resource class.

use super::classify::ResourceClass;
use super::storage::BucketKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from cache, fetch and store on a miss.
    CacheFirst,
    /// Fetch and store; fall back to cache when the network fails.
    NetworkFirst,
    /// Serve cache immediately and refresh in the background.
    StaleWhileRevalidate,
}

/// What to answer when network and cache both come up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Unavailable,
    PlaceholderImage,
    OfflinePage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub strategy: Strategy,
    pub bucket: BucketKind,
    pub fallback: Fallback,
}

pub fn plan_for(class: ResourceClass) -> Plan {
    match class {
        ResourceClass::Image => Plan {
            strategy: Strategy::CacheFirst,
            bucket: BucketKind::Image,
            fallback: Fallback::PlaceholderImage,
        },
        ResourceClass::Static => Plan {
            strategy: Strategy::CacheFirst,
            bucket: BucketKind::Static,
            fallback: Fallback::Unavailable,
        },
        ResourceClass::Demo => Plan {
            strategy: Strategy::NetworkFirst,
            bucket: BucketKind::Dynamic,
            fallback: Fallback::OfflinePage,
        },
        ResourceClass::Dynamic => Plan {
            strategy: Strategy::StaleWhileRevalidate,
            bucket: BucketKind::Dynamic,
            fallback: Fallback::Unavailable,
        },
    }
}
