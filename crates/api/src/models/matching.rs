use serde::{Deserialize, Serialize};

/// How a candidate list is checked against required library names.
///
/// The three modes differ in what they return on success, and callers depend
/// on that difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every name must match; the whole list is returned unchanged.
    #[default]
    RequireAll,
    /// Every name must match; one entry per name is returned, in name order.
    RequireAllMinimal,
    /// At least one name must match; the whole list is returned unchanged.
    RequireAny,
}

