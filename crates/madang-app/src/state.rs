// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{DEFAULT_PAGE_SIZE, ListKind, PageSlice, SortDirection};

/// What a list screen currently asks the server for, plus the totals the
/// last successful load reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub sort_column: &'static str,
    pub sort_direction: SortDirection,
    pub filters: BTreeMap<&'static str, String>,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl ViewState {
    pub fn new(kind: ListKind, page_size: u32) -> Self {
        let (sort_column, sort_direction) = kind.default_sort();
        Self {
            sort_column,
            sort_direction,
            filters: BTreeMap::new(),
            page: 1,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
            total_pages: 1,
            total_items: 0,
        }
    }

    pub fn filter(&self, key: &str) -> &str {
        self.filters.get(key).map_or("", String::as_str)
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.values().any(|value| !value.is_empty())
    }

    /// Same column flips direction; a new column starts ascending.
    pub(crate) fn apply_sort(&mut self, column: &'static str) {
        if self.sort_column == column {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Asc;
        }
        self.page = 1;
    }

    pub(crate) fn apply_page(&mut self, slice: &PageSlice) {
        self.total_pages = slice.total_pages;
        self.total_items = slice.total_items;
        self.page = slice.page;
    }

    pub fn is_first_page(&self) -> bool {
        self.page <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}
