//! Page collection for backend list endpoints.
//!
//! The backend answers list requests either with a bare JSON array or with
//! an envelope (`items`/`data` plus `total`/`count`). Both shapes are decoded
//! once, at the response boundary, into [`ListResponse`]; the collector then
//! walks `page`/`limit` requests until the declared total is reached, a page
//! comes back short or empty, or the page ceiling is hit.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// Items per follow-up page request.
pub const PAGE_SIZE: usize = 100;
/// Highest page number ever requested. With the implicit first request this
/// caps an aggregation at 100 requests and 10,000 items.
pub const PAGE_CEILING: u32 = 100;

/// Explicit paging parameters. The first request of an aggregation is made
/// without them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: usize,
}

/// One list response, decoded at the wire boundary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    /// The whole collection as a plain array. No paging follows.
    Bare(Vec<Value>),
    /// Paged envelope. `items` wins over `data`; `total` over `count`.
    Envelope {
        #[serde(default)]
        items: Option<Vec<Value>>,
        #[serde(default)]
        data: Option<Vec<Value>>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        count: Option<u64>,
    },
}

/// Normalized page content.
#[derive(Debug)]
pub struct PageData {
    pub items: Vec<Value>,
    /// Server-declared collection size. For bare arrays this is the array
    /// length, so no follow-up requests are issued.
    pub declared_total: usize,
}

impl ListResponse {
    pub fn from_value(value: Value) -> ApiResult<Self> {
        if value.is_null() {
            return Ok(ListResponse::Bare(Vec::new()));
        }
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn into_page(self) -> PageData {
        match self {
            ListResponse::Bare(items) => {
                let declared_total = items.len();
                PageData {
                    items,
                    declared_total,
                }
            }
            ListResponse::Envelope {
                items,
                data,
                total,
                count,
            } => {
                let items = items.or(data).unwrap_or_default();
                // A zero total is treated as absent, like the original API.
                let declared_total = total
                    .filter(|&n| n > 0)
                    .or_else(|| count.filter(|&n| n > 0))
                    .map(|n| n as usize)
                    .unwrap_or(items.len());
                PageData {
                    items,
                    declared_total,
                }
            }
        }
    }
}

/// Source of one resource's pages. `page = None` is the implicit first
/// request; scoped query parameters are the implementor's business.
#[async_trait]
pub trait PageFetch: Send + Sync {
    async fn fetch(&self, page: Option<PageQuery>) -> ApiResult<ListResponse>;
}

/// Collects every item of a paged resource.
///
/// The first request goes out without paging parameters and its failure is
/// the caller's problem. From page 2 on, failures end the walk with the
/// items gathered so far; the declared total is re-checked before each
/// request so no page is fetched past it.
pub async fn collect_paged(source: &dyn PageFetch, resource: &str) -> ApiResult<Vec<Value>> {
    let PageData {
        mut items,
        declared_total,
    } = source.fetch(None).await?.into_page();

    if declared_total > items.len() && !items.is_empty() {
        let mut page: u32 = 2;
        let mut has_more = true;

        while has_more && items.len() < declared_total {
            let response = match source
                .fetch(Some(PageQuery {
                    page,
                    limit: PAGE_SIZE,
                }))
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    warn!(
                        target: "ustaz::api",
                        "{resource}: page {page} failed, keeping {} items: {err}",
                        items.len()
                    );
                    break;
                }
            };

            let page_items = response.into_page().items;
            if page_items.is_empty() {
                break;
            }

            let full_page = page_items.len() == PAGE_SIZE;
            items.extend(page_items);
            page += 1;
            has_more = full_page && items.len() < declared_total;

            if page > PAGE_CEILING {
                warn!(
                    target: "ustaz::api",
                    "{resource}: page ceiling reached with {} of {declared_total} items",
                    items.len()
                );
                break;
            }
        }
    }

    Ok(items)
}
