// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paginated envelope returned by the list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<R> {
    pub items: Vec<R>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

/// A list response as it arrives: paginated, or a bare legacy array.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload<R> {
    Paged(PageResponse<R>),
    Unpaged(Vec<R>),
}

/// Pagination fields after normalization. `1 <= page <= total_pages` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<R: DeserializeOwned> ListPayload<R> {
    /// Decodes the `data` member of a list envelope. `null` and objects
    /// without `items` fall back to an empty legacy list.
    pub fn from_value(data: Value) -> Result<Self> {
        match data {
            Value::Null => Ok(Self::Unpaged(Vec::new())),
            Value::Array(_) => {
                let items = serde_json::from_value(data).context("decode list items")?;
                Ok(Self::Unpaged(items))
            }
            Value::Object(ref fields) if fields.contains_key("items") => {
                let page = serde_json::from_value(data).context("decode page response")?;
                Ok(Self::Paged(page))
            }
            Value::Object(_) => {
                tracing::warn!("list response has no items; treating as empty");
                Ok(Self::Unpaged(Vec::new()))
            }
            other => bail!("unexpected list response shape: {other}"),
        }
    }
}

impl<R> ListPayload<R> {
    pub fn len(&self) -> usize {
        match self {
            Self::Paged(page) => page.items.len(),
            Self::Unpaged(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits into records and pagination fields. The server's `page` wins,
    /// clamped into `[1, total_pages]`; legacy arrays are one page holding
    /// every record.
    pub fn into_parts(self) -> (Vec<R>, PageSlice) {
        match self {
            Self::Paged(response) => {
                let total_pages = response.total_pages.unwrap_or(1).max(1);
                let page = response.page.unwrap_or(1).clamp(1, total_pages);
                let slice = PageSlice {
                    page,
                    total_pages,
                    total_items: response.total_items.unwrap_or(0),
                };
                (response.items, slice)
            }
            Self::Unpaged(items) => {
                let slice = PageSlice {
                    page: 1,
                    total_pages: 1,
                    total_items: items.len() as u64,
                };
                (items, slice)
            }
        }
    }
}
