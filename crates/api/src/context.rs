//! Loading-context contracts.
//!
//! A loading context is one node of the host's resource-resolution graph
//! (the analogue of a class loader). The host owns every node; discovery only
//! reads them through [`LoadingContext`].

use crate::error::{ApiError, ApiResult};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Shared handle to a host-owned context.
pub type ContextRef = Arc<dyn LoadingContext>;

/// Identity used to deduplicate contexts while walking the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parent relation of a context, as resolved by the host adapter.
///
/// Hosts with a plain delegation chain answer `Single`; plugin-style hosts
/// whose loaders delegate to several peers answer `Multi`.
#[derive(Clone, Default)]
pub enum ParentLinks {
    #[default]
    None,
    Single(ContextRef),
    Multi(Vec<ContextRef>),
}

impl ParentLinks {
    pub fn is_leaf(&self) -> bool {
        match self {
            ParentLinks::None => true,
            ParentLinks::Single(_) => false,
            ParentLinks::Multi(parents) => parents.is_empty(),
        }
    }
}

impl fmt::Debug for ParentLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentLinks::None => write!(f, "None"),
            ParentLinks::Single(parent) => write!(f, "Single({})", parent.id()),
            ParentLinks::Multi(parents) => f
                .debug_tuple("Multi")
                .field(&parents.iter().map(|p| p.id()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

pub trait LoadingContext: Send + Sync {
    fn id(&self) -> ContextId;

    /// Human readable label (for logging/debugging)
    fn name(&self) -> String {
        format!("context{}", self.id())
    }

    /// Parent contexts. An error means the host cannot introspect this node;
    /// callers treat it as a leaf.
    fn parents(&self) -> ApiResult<ParentLinks>;

    /// Look up a relative resource path in this context only (no delegation).
    fn resources(&self, path: &str) -> ApiResult<Vec<Url>>;

    /// Source URIs the context tracks natively, if it tracks any.
    fn source_urls(&self) -> Option<Vec<Url>> {
        None
    }

    /// Source URIs obtained read structurally from the host object
    /// (a `getUrls`-like accessor on contexts that do not track them natively).
    fn probe_urls(&self) -> ApiResult<Vec<Url>> {
        Err(ApiError::unsupported("structural urls", self.name()))
    }
}
