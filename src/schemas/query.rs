// Query Schemas - list filters and page/limit handling shared by the list endpoints

use serde::{Deserialize, Serialize};

use crate::core::DocId;
use crate::entities::{DonatedItemCategory, DonationStatus, EventStatus, ListingStatus};

pub const MAX_PAGE_SIZE: u32 = 100;

/// Clamped page request; `page` is 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: u32) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let limit = limit
            .unwrap_or(default_limit as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u32;
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = request.limit.max(1) as u64;
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(limit),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// GET /listings; `sellerId` may be a document id or `me`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub category: Option<String>,
    pub status: Option<ListingStatus>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location: Option<String>,
    pub seller_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListingQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit, 10)
    }
}

/// GET /donated-items
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonatedItemQuery {
    pub category: Option<DonatedItemCategory>,
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl DonatedItemQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit, 20)
    }
}

/// GET /events
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub status: Option<EventStatus>,
    pub category: Option<String>,
}

/// GET /donations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationQuery {
    pub donor_id: Option<DocId>,
    pub recipient_id: Option<DocId>,
    pub status: Option<DonationStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl DonationQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit, 10)
    }
}
