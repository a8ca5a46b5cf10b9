// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{Role, SortDirection};

pub const PAGE_SIZES: [u32; 3] = [10, 20, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Books,
    Customers,
    Orders,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Integer,
    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

impl FilterField {
    const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FilterKind::Text,
        }
    }

    const fn integer(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FilterKind::Integer,
        }
    }

    /// Canonical value for the query, or an empty string when the input
    /// cannot be sent for this field.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self.kind {
            FilterKind::Text => trimmed.to_owned(),
            FilterKind::Integer => trimmed
                .parse::<i64>()
                .map(|value| value.to_string())
                .unwrap_or_default(),
            FilterKind::Role => Role::parse(trimmed)
                .map(|role| role.as_str().to_owned())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

const fn sortable(key: &'static str, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        key,
        label,
        sortable: true,
    }
}

const BOOK_COLUMNS: [ColumnSpec; 4] = [
    sortable("bookid", "id"),
    sortable("bookname", "title"),
    sortable("publisher", "publisher"),
    sortable("price", "price"),
];

const CUSTOMER_COLUMNS: [ColumnSpec; 5] = [
    sortable("custid", "id"),
    sortable("name", "name"),
    sortable("address", "address"),
    sortable("phone", "phone"),
    sortable("role", "role"),
];

const ORDER_COLUMNS: [ColumnSpec; 5] = [
    sortable("orderid", "id"),
    sortable("orderdate", "date"),
    sortable("bookname", "title"),
    sortable("publisher", "publisher"),
    sortable("saleprice", "paid"),
];

const LOGIN_COLUMNS: [ColumnSpec; 3] = [
    sortable("name", "name"),
    sortable("address", "address"),
    sortable("phone", "phone"),
];

const BOOK_FILTERS: [FilterField; 4] = [
    FilterField::text("title", "title"),
    FilterField::text("publisher", "publisher"),
    FilterField::integer("priceMin", "min price"),
    FilterField::integer("priceMax", "max price"),
];

const CUSTOMER_FILTERS: [FilterField; 4] = [
    FilterField::text("name", "name"),
    FilterField::text("phone", "phone"),
    FilterField::text("address", "address"),
    FilterField {
        key: "role",
        label: "role",
        kind: FilterKind::Role,
    },
];

const LOGIN_FILTERS: [FilterField; 1] = [FilterField::text("name", "name")];

impl ListKind {
    pub const ALL: [Self; 4] = [Self::Books, Self::Customers, Self::Orders, Self::Login];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Login => "login",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "books" => Some(Self::Books),
            "customers" => Some(Self::Customers),
            "orders" => Some(Self::Orders),
            "login" => Some(Self::Login),
            _ => None,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Customers => "customers",
            Self::Orders => "my orders",
            Self::Login => "choose a customer",
        }
    }

    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Books => "/api/books",
            Self::Customers | Self::Login => "/api/customers",
            Self::Orders => "/api/orders",
        }
    }

    pub const fn columns(self) -> &'static [ColumnSpec] {
        match self {
            Self::Books => &BOOK_COLUMNS,
            Self::Customers => &CUSTOMER_COLUMNS,
            Self::Orders => &ORDER_COLUMNS,
            Self::Login => &LOGIN_COLUMNS,
        }
    }

    pub const fn filters(self) -> &'static [FilterField] {
        match self {
            Self::Books => &BOOK_FILTERS,
            Self::Customers => &CUSTOMER_FILTERS,
            Self::Orders => &[],
            Self::Login => &LOGIN_FILTERS,
        }
    }

    pub const fn default_sort(self) -> (&'static str, SortDirection) {
        match self {
            Self::Books => ("bookid", SortDirection::Asc),
            Self::Customers => ("custid", SortDirection::Asc),
            Self::Orders => ("orderdate", SortDirection::Desc),
            Self::Login => ("name", SortDirection::Asc),
        }
    }

    pub const fn debounced_filters(self) -> bool {
        !matches!(self, Self::Orders)
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Books => "no books match the current filters",
            Self::Customers | Self::Login => "no customers match the current filters",
            Self::Orders => "no orders yet",
        }
    }

    pub const fn error_message(self) -> &'static str {
        match self {
            Self::Books => "could not load books",
            Self::Customers | Self::Login => "could not load customers",
            Self::Orders => "could not load orders",
        }
    }

    /// Looks a column up in the sort allow-list.
    pub fn sort_column(self, column: &str) -> Option<&'static str> {
        self.columns()
            .iter()
            .find(|spec| spec.sortable && spec.key == column)
            .map(|spec| spec.key)
    }

    pub fn filter_field(self, key: &str) -> Option<&'static FilterField> {
        self.filters().iter().find(|field| field.key == key)
    }
}

pub fn is_valid_page_size(size: u32) -> bool {
    PAGE_SIZES.contains(&size)
}
