use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ Backend Wire Models ============

/// A listing row as returned by the listing service.
///
/// The gateway only inspects `id` and `user_id`; every other field the
/// backend returns is carried through untouched in the flattened map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Unique identifier for the listing.
    pub id: i64,
    /// Identifier of the owning user.
    pub user_id: i64,
    /// Remaining listing fields, opaque to the gateway.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user record owned by the user service.
///
/// Timestamps are microsecond epoch integers, opaque to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Timestamp of creation.
    pub created_at: i64,
    /// Timestamp of last update.
    pub updated_at: i64,
}

/// Page payload returned by the listing service's list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListingsPage {
    /// A missing `listings` key is tolerated and treated as an empty page.
    #[serde(default)]
    pub listings: Vec<Listing>,
}

/// Envelope wrapping a single user returned by the user service.
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

// ============ Gateway Response Models ============

/// A listing with its owning user embedded in place of the raw `user_id`.
///
/// `user` is `None` when the owner could not be resolved; it still
/// serializes as an explicit `null` so clients see a stable shape.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedListing {
    pub id: i64,
    pub user: Option<User>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query parameters accepted by `GET /public-api/listings`.
///
/// Pagination values are forwarded to the listing service verbatim; their
/// validation is the listing service's responsibility.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListingsQuery {
    pub page_num: Option<String>,
    pub page_size: Option<String>,
    pub user_id: Option<String>,
}

/// Success envelope for the aggregated read path.
#[derive(Debug, Serialize)]
pub struct ListingsResponse {
    pub result: bool,
    pub listings: Vec<EnrichedListing>,
}
