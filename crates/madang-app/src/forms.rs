// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::Serialize;

use crate::format::format_won;
use crate::{BookId, CustomerId, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookFormInput {
    pub bookname: String,
    pub publisher: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerFormInput {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub role: Role,
}

/// A purchase at `saleprice`; `list_price` is the book's price when known
/// and caps the sale price. It is not sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderFormInput {
    pub custid: CustomerId,
    pub bookid: BookId,
    pub saleprice: i64,
    #[serde(skip)]
    pub list_price: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Book(BookFormInput),
    Customer(CustomerFormInput),
    Order(OrderFormInput),
}

impl FormPayload {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Book(book) => book.validate(),
            Self::Customer(customer) => customer.validate(),
            Self::Order(order) => order.validate(),
        }
    }
}

impl BookFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.bookname.trim().is_empty() {
            bail!("book title is required -- enter a title and retry");
        }
        if self.publisher.trim().is_empty() {
            bail!("book publisher is required -- enter a publisher and retry");
        }
        if self.price <= 0 {
            bail!("book price must be positive");
        }
        Ok(())
    }
}

impl CustomerFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("customer name is required -- enter a name and retry");
        }
        if self.phone.trim().is_empty() {
            bail!("customer phone is required -- enter a phone number and retry");
        }
        Ok(())
    }
}

impl OrderFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.custid.get() <= 0 {
            bail!("order customer is required -- log in and retry");
        }
        if self.bookid.get() <= 0 {
            bail!("order book is required -- choose a book and retry");
        }
        validate_sale_price(self.saleprice, self.list_price)
    }
}

/// Sale prices are positive and never above the list price.
pub fn validate_sale_price(saleprice: i64, list_price: Option<i64>) -> Result<()> {
    if saleprice <= 0 {
        bail!("sale price must be positive");
    }
    if let Some(list_price) = list_price
        && saleprice > list_price
    {
        bail!(
            "sale price cannot exceed the list price of {}",
            format_won(list_price)
        );
    }
    Ok(())
}
