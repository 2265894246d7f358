use crate::error::ApiError;
use crate::responses::{OrdersPayload, decode_payload, error_from_body};
use crate::{ApiClient, OrdersQuery};
use async_trait::async_trait;
use configuration::ApiSettings;
use core_types::{
    CashBalance, CashRequest, CashTransaction, HealthStatus, Instrument, MarketDataPoint, Order,
    OrderRequest, Portfolio,
};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// A concrete implementation of the `ApiClient` that talks JSON over HTTP.
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::info!(method = %method, url = %url, "API request");

        let mut builder = self.client.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(method = %method, url = %url, error = %e, "API request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            let err = error_from_body(status, &text);
            tracing::error!(status, url = %url, error = %err, "API error response");
            return Err(err);
        }

        tracing::info!(status, url = %url, "API response");
        decode_payload(status, &text).inspect_err(|e| {
            tracing::error!(status, url = %url, error = %e, "API response rejected");
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, query, None).await
    }

    async fn cash(&self, path: &str, user_id: u64, amount: Decimal) -> Result<CashTransaction, ApiError> {
        let body = serde_json::to_value(CashRequest { user_id, amount })
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        self.request(Method::POST, path, &[], Some(body)).await
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get_portfolio(&self, user_id: u64) -> Result<Portfolio, ApiError> {
        self.get(&format!("/portfolio/{}", user_id), &[]).await
    }

    async fn deposit(&self, user_id: u64, amount: Decimal) -> Result<CashTransaction, ApiError> {
        self.cash("/cash/deposit", user_id, amount).await
    }

    async fn withdraw(&self, user_id: u64, amount: Decimal) -> Result<CashTransaction, ApiError> {
        self.cash("/cash/withdraw", user_id, amount).await
    }

    async fn get_cash_balance(&self, user_id: u64) -> Result<CashBalance, ApiError> {
        self.get(&format!("/cash/balance/{}", user_id), &[]).await
    }

    async fn search_instruments(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Instrument>, ApiError> {
        self.get(
            "/instruments/search",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn get_instrument(&self, instrument_id: u64) -> Result<Instrument, ApiError> {
        self.get(&format!("/instruments/{}", instrument_id), &[]).await
    }

    async fn get_market_data(
        &self,
        instrument_id: u64,
        kind: &str,
    ) -> Result<Vec<MarketDataPoint>, ApiError> {
        self.get(
            &format!("/instruments/{}/market-data", instrument_id),
            &[("type", kind.to_string())],
        )
        .await
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        let body =
            serde_json::to_value(order).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        self.request(Method::POST, "/orders", &[], Some(body)).await
    }

    async fn get_user_orders(
        &self,
        user_id: u64,
        query: OrdersQuery,
    ) -> Result<Vec<Order>, ApiError> {
        let mut params = vec![("limit", query.limit.to_string())];
        if let Some(status) = query.status.as_query() {
            params.push(("status", status.to_string()));
        }
        let payload: OrdersPayload = self
            .get(&format!("/orders/user/{}", user_id), &params)
            .await?;
        Ok(payload.into_vec())
    }

    async fn get_order(&self, order_id: u64) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{}", order_id), &[]).await
    }

    async fn cancel_order(&self, order_id: u64, user_id: u64) -> Result<Order, ApiError> {
        self.request(
            Method::PUT,
            &format!("/orders/{}/cancel", order_id),
            &[],
            Some(json!({ "userId": user_id })),
        )
        .await
    }

    async fn process_order(&self, order_id: u64) -> Result<Order, ApiError> {
        self.request(
            Method::POST,
            &format!("/order-processing/process/{}", order_id),
            &[],
            None,
        )
        .await
    }

    async fn get_pending_orders(&self, limit: u32) -> Result<Vec<Order>, ApiError> {
        let payload: OrdersPayload = self
            .get("/order-processing/pending", &[("limit", limit.to_string())])
            .await?;
        Ok(payload.into_vec())
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health", &[]).await
    }
}
