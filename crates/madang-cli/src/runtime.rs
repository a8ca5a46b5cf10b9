// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use madang_api::Client;
use madang_app::format::{format_number, format_won};
use madang_app::{BookId, CustomerId, ListKind, ListPayload, ListQuery, OrderFormInput};
use madang_store::{LoginGate, Session, Store};
use madang_tui::{InternalEvent, ListRuntime, RowAction};
use serde::de::DeserializeOwned;
use std::sync::mpsc::Sender;
use std::thread;

/// Serves list screens from the HTTP API, one worker thread per fetch.
pub struct ApiRuntime<'a> {
    client: Client,
    store: &'a Store,
}

impl<'a> ApiRuntime<'a> {
    pub fn new(client: Client, store: &'a Store) -> Self {
        Self { client, store }
    }

    fn log_in(&self, id: CustomerId) -> Result<RowAction> {
        let login = self.client.login(id)?;
        let session = Session::new(self.store);
        session.set_customer(login.customer.custid, &login.customer.name, login.customer.role)?;
        match session.take_redirect_after_login()? {
            Some(kind) => Ok(RowAction::Switch(kind)),
            None => Ok(RowAction::Status(format!(
                "logged in as {}",
                login.customer.name
            ))),
        }
    }

    fn describe_book(&self, id: BookId) -> Result<RowAction> {
        let book = self.client.book_detail(id)?;
        let stats = self.client.book_stats(id)?;
        Ok(RowAction::Status(format!(
            "{} ({}, {}) sold {} times",
            book.bookname,
            book.publisher,
            format_won(book.price),
            format_number(stats.sales_count)
        )))
    }

    /// Buys one copy at the list price for the logged-in customer. Without a
    /// session the user is sent to login and brought back to the books.
    fn order_book(&self, id: BookId) -> Result<RowAction> {
        let custid = match Session::new(self.store).require_login(Some(ListKind::Books))? {
            LoginGate::Allowed(custid) => custid,
            LoginGate::LoginRequired => return Ok(RowAction::Switch(ListKind::Login)),
        };
        let book = self.client.book_detail(id)?;
        let order = self.client.create_order(&OrderFormInput {
            custid,
            bookid: book.bookid,
            saleprice: book.price,
            list_price: Some(book.price),
        })?;
        tracing::info!(
            order = order.get(),
            book = book.bookid.get(),
            custid = custid.get(),
            "order placed"
        );
        Ok(RowAction::Status(format!(
            "ordered {} for {} (order {order})",
            book.bookname,
            format_won(book.price)
        )))
    }

    fn describe_customer(&self, id: CustomerId) -> Result<RowAction> {
        let customer = self.client.customer_detail(id)?;
        let stats = self.client.order_stats(id)?;
        Ok(RowAction::Status(format!(
            "{}: {} orders, {} spent",
            customer.name,
            format_number(stats.order_count),
            format_won(stats.total_amount)
        )))
    }
}

impl<R> ListRuntime<R> for ApiRuntime<'_>
where
    R: DeserializeOwned + Send + 'static,
{
    fn load_list(&mut self, query: &ListQuery) -> Result<ListPayload<R>> {
        self.client.list(query)
    }

    fn spawn_list_fetch(
        &mut self,
        seq: u64,
        query: ListQuery,
        tx: Sender<InternalEvent<R>>,
    ) -> Result<()> {
        let client = self.client.clone();
        tracing::debug!(seq, %query, "spawning list fetch");
        thread::spawn(move || {
            let result = client.list(&query);
            let _ = tx.send(InternalEvent::ListLoaded { seq, result });
        });
        Ok(())
    }

    fn activate_row(&mut self, kind: ListKind, record_id: i64) -> Result<Option<RowAction>> {
        let action = match kind {
            ListKind::Login => self.log_in(CustomerId::new(record_id))?,
            ListKind::Books => self.describe_book(BookId::new(record_id))?,
            ListKind::Customers => self.describe_customer(CustomerId::new(record_id))?,
            ListKind::Orders => return Ok(None),
        };
        Ok(Some(action))
    }

    fn order_row(&mut self, kind: ListKind, record_id: i64) -> Result<Option<RowAction>> {
        match kind {
            ListKind::Books => self.order_book(BookId::new(record_id)).map(Some),
            ListKind::Customers | ListKind::Orders | ListKind::Login => Ok(None),
        }
    }
}
