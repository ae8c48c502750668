//! RevenueCat commerce provider implementation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use skapto_types::{
    EntitlementInfo, EntitlementSnapshot, Offering, Package, ProductId, PurchaseRecord,
    TransactionId,
};

use crate::config::CommerceConfig;
use crate::error::CommerceError;
use crate::provider::{CommerceProvider, PurchaseOutcome, PurchaseRequest};

/// RevenueCat REST provider
#[derive(Clone)]
pub struct RevenueCatProvider {
    client: Client,
    config: CommerceConfig,
}

impl RevenueCatProvider {
    /// Create a new RevenueCat provider
    pub fn new(config: CommerceConfig) -> Result<Self, CommerceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CommerceError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Provider configuration
    pub fn config(&self) -> &CommerceConfig {
        &self.config
    }

    /// Make authenticated request to RevenueCat
    async fn rc_request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, CommerceError> {
        let url = format!("{}{endpoint}", self.config.base_url);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.config.api_key)
            .header("X-Platform", &self.config.platform);

        if let Some(json) = body {
            request = request.json(json);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "RevenueCat request failed");
            CommerceError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RcErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            error!(status = %status, message = %message, "RevenueCat API error");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    CommerceError::Unauthorized(message)
                }
                StatusCode::NOT_FOUND => CommerceError::ProductNotFound(message),
                _ => CommerceError::Provider {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse RevenueCat response");
            CommerceError::InvalidResponse(e.to_string())
        })
    }

    fn subscriber_path(&self) -> String {
        format!("/subscribers/{}", self.config.app_user_id)
    }

    async fn get_subscriber(&self) -> Result<EntitlementSnapshot, CommerceError> {
        let response: SubscriberResponse = self
            .rc_request(Method::GET, &self.subscriber_path(), None)
            .await?;
        Ok(response.subscriber.to_snapshot(Utc::now()))
    }
}

#[async_trait]
impl CommerceProvider for RevenueCatProvider {
    #[instrument(skip(self))]
    async fn fetch_customer_info(&self) -> Result<EntitlementSnapshot, CommerceError> {
        debug!(app_user_id = %self.config.app_user_id, "Fetching customer info");
        self.get_subscriber().await
    }

    #[instrument(skip(self, request), fields(package = %request.package.identifier))]
    async fn purchase(&self, request: &PurchaseRequest) -> Result<PurchaseOutcome, CommerceError> {
        debug!(product_id = %request.package.product_id, "Registering purchase");

        let body = serde_json::json!({
            "app_user_id": self.config.app_user_id,
            "fetch_token": request.fetch_token,
            "product_id": request.package.product_id,
        });

        let response: SubscriberResponse = self
            .rc_request(Method::POST, "/receipts", Some(&body))
            .await
            .map_err(|e| match e {
                CommerceError::Provider { status, message } if (400..500).contains(&status) => {
                    warn!(status, "Store rejected receipt");
                    CommerceError::PaymentDeclined(message)
                }
                other => other,
            })?;

        Ok(PurchaseOutcome {
            snapshot: response.subscriber.to_snapshot(Utc::now()),
            product_id: request.package.product_id.clone(),
        })
    }

    /// Receipts are synced server-side as they are posted, so a restore is a
    /// re-read of the subscriber record.
    #[instrument(skip(self))]
    async fn restore_purchases(&self) -> Result<EntitlementSnapshot, CommerceError> {
        debug!(app_user_id = %self.config.app_user_id, "Restoring purchases");
        self.get_subscriber().await
    }

    #[instrument(skip(self))]
    async fn offerings(&self) -> Result<Vec<Offering>, CommerceError> {
        let response: OfferingsResponse = self
            .rc_request(
                Method::GET,
                &format!("{}/offerings", self.subscriber_path()),
                None,
            )
            .await?;
        Ok(response.into_offerings())
    }
}

impl std::fmt::Debug for RevenueCatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevenueCatProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// RevenueCat API response types

/// `GET /subscribers/{id}` and `POST /receipts` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberResponse {
    /// Subscriber record
    pub subscriber: Subscriber,
}

/// RevenueCat subscriber
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscriber {
    /// Original app user ID
    #[serde(default)]
    pub original_app_user_id: Option<String>,
    /// Entitlements by identifier
    #[serde(default)]
    pub entitlements: HashMap<String, RcEntitlement>,
    /// One-time purchases grouped by product
    #[serde(default)]
    pub non_subscriptions: HashMap<String, Vec<RcNonSubscription>>,
}

/// RevenueCat entitlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcEntitlement {
    /// Expiry (`null` for lifetime)
    pub expires_date: Option<DateTime<Utc>>,
    /// Product that unlocked the entitlement
    #[serde(default)]
    pub product_identifier: Option<String>,
    /// Purchase time
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
}

/// RevenueCat non-subscription transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcNonSubscription {
    /// RevenueCat transaction ID
    pub id: String,
    /// Store transaction ID
    #[serde(default)]
    pub store_transaction_id: Option<String>,
    /// Purchase time
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    /// Store (`app_store`, `play_store`, ...)
    #[serde(default)]
    pub store: Option<String>,
}

impl Subscriber {
    /// Convert to a provider-neutral snapshot as of `now`.
    ///
    /// An entitlement is active when it has no expiry or expires after
    /// `now`. Purchases are flattened and ordered most recent first.
    pub fn to_snapshot(&self, now: DateTime<Utc>) -> EntitlementSnapshot {
        let entitlements = self
            .entitlements
            .iter()
            .map(|(name, e)| {
                let is_active = e.expires_date.map_or(true, |exp| exp > now);
                (
                    name.clone(),
                    EntitlementInfo {
                        is_active,
                        expires_at: e.expires_date,
                    },
                )
            })
            .collect();

        let mut purchases: Vec<PurchaseRecord> = self
            .non_subscriptions
            .iter()
            .flat_map(|(product, transactions)| {
                transactions.iter().map(move |t| PurchaseRecord {
                    product_id: ProductId::new(product.clone()),
                    transaction_id: TransactionId::new(
                        t.store_transaction_id.clone().unwrap_or_else(|| t.id.clone()),
                    ),
                    purchased_at: t.purchase_date,
                })
            })
            .collect();

        // Newest first; undated records sink to the end
        purchases.sort_by(|a, b| {
            b.purchased_at
                .cmp(&a.purchased_at)
                .then_with(|| b.transaction_id.cmp(&a.transaction_id))
        });

        EntitlementSnapshot {
            entitlements,
            purchases,
        }
    }
}

/// `GET /subscribers/{id}/offerings` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingsResponse {
    /// Identifier of the current offering
    #[serde(default)]
    pub current_offering_id: Option<String>,
    /// All offerings
    #[serde(default)]
    pub offerings: Vec<RcOffering>,
}

/// RevenueCat offering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcOffering {
    /// Offering identifier
    pub identifier: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Packages
    #[serde(default)]
    pub packages: Vec<RcPackage>,
}

/// RevenueCat package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcPackage {
    /// Package identifier
    pub identifier: String,
    /// Store product identifier
    pub platform_product_identifier: String,
}

impl OfferingsResponse {
    /// Convert to domain offerings, current offering first
    pub fn into_offerings(self) -> Vec<Offering> {
        let current = self.current_offering_id;
        let mut offerings: Vec<Offering> = self
            .offerings
            .into_iter()
            .map(|o| Offering {
                is_current: current.as_deref() == Some(o.identifier.as_str()),
                identifier: o.identifier,
                description: o.description,
                packages: o
                    .packages
                    .into_iter()
                    .map(|p| Package {
                        identifier: p.identifier,
                        product_id: ProductId::new(p.platform_product_identifier),
                    })
                    .collect(),
            })
            .collect();
        // Stable: keeps dashboard order among the rest
        offerings.sort_by_key(|o| !o.is_current);
        offerings
    }
}

#[derive(Debug, Deserialize)]
struct RcErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SUBSCRIBER_JSON: &str = r#"{
        "subscriber": {
            "original_app_user_id": "user-1",
            "entitlements": {
                "monthly_membership": {
                    "expires_date": "2020-01-01T00:00:00Z",
                    "product_identifier": "monthly",
                    "purchase_date": "2019-12-01T00:00:00Z"
                },
                "single_visit": {
                    "expires_date": null,
                    "product_identifier": "singleVisit",
                    "purchase_date": "2024-05-02T10:00:00Z"
                }
            },
            "non_subscriptions": {
                "singleVisit": [
                    {"id": "rc-1", "store_transaction_id": "tx-1", "purchase_date": "2024-05-01T10:00:00Z", "store": "app_store"},
                    {"id": "rc-2", "store_transaction_id": "tx-2", "purchase_date": "2024-05-02T10:00:00Z", "store": "app_store"}
                ],
                "stickerPack": [
                    {"id": "rc-3", "purchase_date": "2024-04-01T10:00:00Z"}
                ]
            }
        }
    }"#;

    fn parse() -> Subscriber {
        serde_json::from_str::<SubscriberResponse>(SUBSCRIBER_JSON)
            .unwrap()
            .subscriber
    }

    #[test]
    fn test_expired_entitlement_is_inactive() {
        let snapshot = parse().to_snapshot(Utc::now());
        assert!(!snapshot.is_entitlement_active("monthly_membership"));
        assert!(snapshot.is_entitlement_active("single_visit"));
    }

    #[test]
    fn test_future_expiry_is_active() {
        let mut subscriber = parse();
        let now = Utc::now();
        subscriber
            .entitlements
            .get_mut("monthly_membership")
            .unwrap()
            .expires_date = Some(now + Duration::days(30));

        let snapshot = subscriber.to_snapshot(now);
        let info = snapshot.entitlement("monthly_membership").unwrap();
        assert!(info.is_active);
        assert_eq!(info.expires_at, Some(now + Duration::days(30)));
    }

    #[test]
    fn test_purchases_are_newest_first() {
        let snapshot = parse().to_snapshot(Utc::now());
        let ids: Vec<&str> = snapshot
            .purchases
            .iter()
            .map(|p| p.transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["tx-2", "tx-1", "rc-3"]);
    }

    #[test]
    fn test_missing_store_transaction_falls_back_to_rc_id() {
        let snapshot = parse().to_snapshot(Utc::now());
        let sticker = snapshot
            .latest_purchase_of(&ProductId::from("stickerPack"))
            .unwrap();
        assert_eq!(sticker.transaction_id, TransactionId::from("rc-3"));
    }

    #[test]
    fn test_current_offering_sorted_first() {
        let response: OfferingsResponse = serde_json::from_str(
            r#"{
                "current_offering_id": "default",
                "offerings": [
                    {"identifier": "promo", "description": "Promo", "packages": []},
                    {"identifier": "default", "description": "Standard", "packages": [
                        {"identifier": "$rc_monthly", "platform_product_identifier": "monthly"},
                        {"identifier": "day_pass", "platform_product_identifier": "singleVisit"}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let offerings = response.into_offerings();
        assert_eq!(offerings[0].identifier, "default");
        assert!(offerings[0].is_current);
        assert!(!offerings[1].is_current);
        assert_eq!(
            offerings[0].package("day_pass").unwrap().product_id,
            ProductId::from("singleVisit")
        );
    }
}
