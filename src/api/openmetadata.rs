use super::{CatalogApi, DeleteOutcome};
use crate::config::CatalogConfig;
use crate::error::{IsRetryable, JanitorError};
use crate::types::{EntityLineage, Page, Schema, Table, TableSummary};
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const API_PREFIX: &str = "api/v1/";

fn retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(10))
        .with_max_times(max_times)
        .with_jitter()
}

/// OpenMetadata-compatible REST catalog.
pub struct OpenMetadataApi {
    http: reqwest::Client,
    api_root: Url,
    token: String,
    retry_policy: ExponentialBuilder,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl OpenMetadataApi {
    pub fn new(cfg: &CatalogConfig) -> Result<Self, JanitorError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("lineage-janitor/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.timeout())
            .default_headers(headers);
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        Ok(Self {
            http: builder.build()?,
            api_root: api_root(&cfg.base_url)?,
            token: cfg.token.clone(),
            retry_policy: retry_policy(cfg.max_retries),
            limiter: cfg
                .request_delay()
                .and_then(Quota::with_period)
                .map(RateLimiter::direct),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, JanitorError> {
        Ok(self.api_root.join(path)?)
    }

    async fn pace(&self) {
        if let Some(limiter) = self.limiter.as_ref() {
            limiter.until_ready().await;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, JanitorError> {
        (|| async {
            self.pace().await;
            debug!(%url, "GET");
            let resp = self
                .http
                .get(url.clone())
                .bearer_auth(&self.token)
                .send()
                .await?;
            decode_json(resp, what).await
        })
        .retry(self.retry_policy)
        .when(|e: &JanitorError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!(what = %what, error = %err, "catalog request failed, retrying after {:?}", dur);
        })
        .await
    }
}

/// `https://host/prefix` and `https://host/prefix/` both resolve to `https://host/prefix/api/v1/`.
fn api_root(base: &Url) -> Result<Url, JanitorError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(API_PREFIX)?)
}

async fn decode_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
) -> Result<T, JanitorError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(JanitorError::from_status(status, what));
    }
    let body = resp.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|e| JanitorError::UnexpectedResponse(format!("{what}: {e}")))
}

impl CatalogApi for OpenMetadataApi {
    async fn list_schemas(
        &self,
        database: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<Page<Schema>, JanitorError> {
        let mut url = self.endpoint("databaseSchemas")?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("database", database)
                .append_pair("limit", &limit.to_string());
            if let Some(after) = after {
                q.append_pair("after", after);
            }
        }
        self.get_json(url, &format!("schemas of {database}")).await
    }

    async fn list_tables(
        &self,
        schema_fqn: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<Page<TableSummary>, JanitorError> {
        let mut url = self.endpoint("tables")?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("databaseSchema", schema_fqn)
                .append_pair("limit", &limit.to_string());
            if let Some(after) = after {
                q.append_pair("after", after);
            }
        }
        self.get_json(url, &format!("tables of {schema_fqn}")).await
    }

    async fn get_table(&self, id: &str) -> Result<Table, JanitorError> {
        let mut url = self.endpoint(&format!("tables/{id}"))?;
        url.query_pairs_mut().append_pair("fields", "columns");
        self.get_json(url, &format!("table {id}")).await
    }

    async fn get_lineage(&self, id: &str, depth: u32) -> Result<EntityLineage, JanitorError> {
        let mut url = self.endpoint(&format!("lineage/table/{id}"))?;
        url.query_pairs_mut()
            .append_pair("upstreamDepth", &depth.to_string())
            .append_pair("downstreamDepth", &depth.to_string());
        self.get_json(url, &format!("lineage of table {id}")).await
    }

    async fn delete_edge(&self, from_id: &str, to_id: &str) -> Result<DeleteOutcome, JanitorError> {
        let url = self.endpoint(&format!("lineage/table/{from_id}/table/{to_id}"))?;
        let what = format!("lineage edge {from_id} -> {to_id}");

        (|| async {
            self.pace().await;
            debug!(%url, "DELETE");
            let resp = self
                .http
                .delete(url.clone())
                .bearer_auth(&self.token)
                .send()
                .await?;
            let status = resp.status();
            if status.is_success() {
                Ok(DeleteOutcome::Deleted)
            } else {
                match JanitorError::from_status(status, what.as_str()) {
                    JanitorError::NotFound(_) => Ok(DeleteOutcome::NotFound),
                    e => Err(e),
                }
            }
        })
        .retry(self.retry_policy)
        .when(|e: &JanitorError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!(edge = %what, error = %err, "delete failed, retrying after {:?}", dur);
        })
        .await
    }
}
