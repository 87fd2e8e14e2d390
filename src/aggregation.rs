//! Scatter-gather engine for the public listings read path.
//!
//! One listings-page fetch (the primary call), then one concurrent user
//! lookup per distinct owner id, joined before the merge. A failed lookup
//! only costs that listing its embedded `user`; the page itself never fails
//! because of a lookup.

use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use reqwest::StatusCode;

use crate::errors::AppError;
use crate::models::{EnrichedListing, Listing, ListingsPage, ListingsQuery, User, UserEnvelope};
use crate::router::{Service, ServiceRouter};
use crate::upstream::{CallError, UpstreamClient};

/// Outcome of a single per-user lookup during the fan-out.
///
/// Lookups settle into exactly one of these variants and are folded into
/// the merge; none of them escalates past the join boundary.
#[derive(Debug)]
pub enum UserLookupOutcome {
    /// The user service returned the record.
    Resolved(User),
    /// The user service rejected the lookup (404 and friends).
    UpstreamFailure { status: StatusCode, body: String },
    /// The user service could not be reached.
    TransportFailure(reqwest::Error),
    /// The reply arrived but did not hold a decodable user record.
    Malformed(String),
}

pub struct AggregationService {
    router: ServiceRouter,
    client: UpstreamClient,
}

impl AggregationService {
    pub fn new(router: &ServiceRouter, client: &UpstreamClient) -> Self {
        Self {
            router: router.clone(),
            client: client.clone(),
        }
    }

    /// Fetches one listings page and embeds each listing's owning user.
    ///
    /// The listing fetch is the primary call: its failure fails the request.
    /// User lookups run concurrently, one per distinct `user_id`, and all of
    /// them settle before the merge.
    pub async fn get_listings(
        &self,
        query: &ListingsQuery,
    ) -> Result<Vec<EnrichedListing>, AppError> {
        let mut params: Vec<(&str, String)> = vec![
            (
                "page_num",
                query.page_num.clone().unwrap_or_else(|| "1".to_string()),
            ),
            (
                "page_size",
                query.page_size.clone().unwrap_or_else(|| "10".to_string()),
            ),
        ];
        if let Some(ref user_id) = query.user_id {
            params.push(("user_id", user_id.clone()));
        }

        let url = self
            .router
            .resolve_with_params(Service::Listing, "/listings", &params)?;
        let reply = self
            .client
            .get(url)
            .await
            .map_err(|e| AppError::from_primary(e, "Upstream service"))?;

        let page: ListingsPage = serde_json::from_value(reply.body).map_err(|e| {
            AppError::InternalError(format!("Unexpected listing service payload: {}", e))
        })?;

        if page.listings.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids = distinct_user_ids(&page.listings);
        tracing::debug!(
            "Resolving {} distinct user(s) for {} listing(s)",
            user_ids.len(),
            page.listings.len()
        );

        let lookups = user_ids
            .iter()
            .map(|&id| async move { (id, self.lookup_user(id).await) });
        let settled = join_all(lookups).await;

        let mut users: HashMap<i64, User> = HashMap::with_capacity(settled.len());
        for (id, outcome) in settled {
            match outcome {
                UserLookupOutcome::Resolved(user) => {
                    users.insert(id, user);
                }
                UserLookupOutcome::UpstreamFailure { status, body } => {
                    tracing::warn!(
                        "Could not fetch user {}. Status: {}, Response: {}",
                        id,
                        status,
                        body
                    );
                }
                UserLookupOutcome::TransportFailure(cause) => {
                    tracing::warn!("Could not reach user service for user {}: {}", id, cause);
                }
                UserLookupOutcome::Malformed(cause) => {
                    tracing::error!("Discarding malformed payload for user {}: {}", id, cause);
                }
            }
        }

        Ok(merge_users(page.listings, &users))
    }

    /// Settles one user lookup into an outcome; never returns an error.
    async fn lookup_user(&self, id: i64) -> UserLookupOutcome {
        let url = match self.router.resolve(Service::User, &format!("/users/{}", id)) {
            Ok(url) => url,
            Err(e) => return UserLookupOutcome::Malformed(e.to_string()),
        };

        match self.client.get(url).await {
            Ok(reply) => match serde_json::from_value::<UserEnvelope>(reply.body) {
                Ok(envelope) => UserLookupOutcome::Resolved(envelope.user),
                Err(e) => UserLookupOutcome::Malformed(e.to_string()),
            },
            Err(CallError::Status { status, body }) => {
                UserLookupOutcome::UpstreamFailure { status, body }
            }
            Err(CallError::Transport(cause)) => UserLookupOutcome::TransportFailure(cause),
            Err(CallError::Decode(cause)) => UserLookupOutcome::Malformed(cause.to_string()),
        }
    }
}

/// Distinct owner ids across a page, in deterministic order.
pub fn distinct_user_ids(listings: &[Listing]) -> BTreeSet<i64> {
    listings.iter().map(|l| l.user_id).collect()
}

/// Replaces each listing's raw `user_id` with the resolved user record.
///
/// Page length and order are preserved; an unresolved owner leaves
/// `user: None` on every listing that referenced it.
pub fn merge_users(listings: Vec<Listing>, users: &HashMap<i64, User>) -> Vec<EnrichedListing> {
    listings
        .into_iter()
        .map(|listing| EnrichedListing {
            id: listing.id,
            user: users.get(&listing.user_id).cloned(),
            extra: listing.extra,
        })
        .collect()
}
