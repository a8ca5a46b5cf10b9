// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::{format_order_date, format_won};
use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    pub const ALL: [Self; 2] = [Self::Customer, Self::Admin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Self::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// A row the list controller can cache and project into table cells. Cells
/// follow the column order of the record's list kind.
pub trait ListRecord {
    fn record_id(&self) -> i64;
    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub bookid: BookId,
    pub bookname: String,
    pub publisher: String,
    pub price: i64,
}

impl ListRecord for Book {
    fn record_id(&self) -> i64 {
        self.bookid.get()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.bookid.to_string(),
            self.bookname.clone(),
            self.publisher.clone(),
            format_won(self.price),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub custid: CustomerId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
}

impl ListRecord for Customer {
    fn record_id(&self) -> i64 {
        self.custid.get()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.custid.to_string(),
            self.name.clone(),
            self.address.clone(),
            self.phone.clone(),
            self.role.as_str().to_owned(),
        ]
    }
}

/// The login screen lists customers without ids or roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginCandidate(pub Customer);

impl ListRecord for LoginCandidate {
    fn record_id(&self) -> i64 {
        self.0.custid.get()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.0.name.clone(),
            self.0.address.clone(),
            self.0.phone.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub orderid: OrderId,
    #[serde(default)]
    pub custid: Option<CustomerId>,
    #[serde(default)]
    pub bookid: Option<BookId>,
    pub orderdate: String,
    #[serde(default)]
    pub bookname: String,
    #[serde(default)]
    pub publisher: String,
    pub saleprice: i64,
    #[serde(default)]
    pub list_price: Option<i64>,
}

impl Order {
    /// Upper bound for a price edit; orders without a known list price cap
    /// at their current sale price.
    pub fn max_sale_price(&self) -> i64 {
        self.list_price.unwrap_or(self.saleprice)
    }
}

impl ListRecord for Order {
    fn record_id(&self) -> i64 {
        self.orderid.get()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.orderid.to_string(),
            format_order_date(&self.orderdate),
            self.bookname.clone(),
            self.publisher.clone(),
            format_won(self.saleprice),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookStats {
    #[serde(default)]
    pub sales_count: i64,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub max_price: i64,
    #[serde(default)]
    pub min_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    #[serde(default)]
    pub order_count: i64,
    #[serde(default)]
    pub total_amount: i64,
    #[serde(default)]
    pub avg_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    #[serde(default)]
    pub total_books: i64,
    #[serde(default)]
    pub total_customers: i64,
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub total_revenue: i64,
    #[serde(default)]
    pub avg_sale_price: f64,
}
