//! Backend API surface: the authenticated client and page collection.

mod client;
mod pagination;

pub use client::{ApiClient, RegisterRequest, TokenPair};
pub use pagination::{
    collect_paged, ListResponse, PageData, PageFetch, PageQuery, PAGE_CEILING, PAGE_SIZE,
};
