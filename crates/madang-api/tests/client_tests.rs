// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use madang_api::{ApiError, Client};
use madang_app::{
    Book, BookFormInput, BookId, CustomerFormInput, CustomerId, ListController, ListKind,
    ListPayload, ListQuery, OrderFormInput, OrderId, Role, ViewState,
};
use serde_json::{Value, json};
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

#[derive(Debug)]
struct Recorded {
    method: String,
    url: String,
    body: String,
}

/// Answers each request with the next canned `(status, body)` and records
/// what arrived.
fn serve(replies: Vec<(u16, &'static str)>) -> Result<(String, JoinHandle<Vec<Recorded>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let mut request = server.recv().expect("request expected");
            let mut received = String::new();
            request
                .as_reader()
                .read_to_string(&mut received)
                .expect("request body should be readable");
            seen.push(Recorded {
                method: request.method().to_string(),
                url: request.url().to_owned(),
                body: received,
            });
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid content type header"),
                );
            request.respond(response).expect("response should succeed");
        }
        seen
    });
    Ok((addr, handle))
}

fn book_query() -> ListQuery {
    let mut state = ViewState::new(ListKind::Books, 10);
    state.filters.insert("title", "역사".to_owned());
    ListQuery::build(ListKind::Books, &[], &state)
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))
        .expect("client should initialize");

    let error = client
        .health()
        .expect_err("health should fail for unreachable endpoint");
    assert!(matches!(
        error.downcast_ref::<ApiError>(),
        Some(ApiError::Transport { .. })
    ));
    assert!(error.to_string().contains("cannot reach http://127.0.0.1:1"));
}

#[test]
fn list_sends_query_and_decodes_page() -> Result<()> {
    let (addr, handle) = serve(vec![(
        200,
        r#"{"success": true, "data": {"items": [{"bookid": 1, "bookname": "축구의 역사", "publisher": "굿스포츠", "price": 7000}], "page": 1, "pageSize": 10, "totalItems": 1, "totalPages": 1, "hasNext": false, "hasPrevious": false}}"#,
    )])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let payload: ListPayload<Book> = client.list(&book_query())?;
    let (books, slice) = payload.into_parts();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].bookname, "축구의 역사");
    assert_eq!((slice.page, slice.total_pages, slice.total_items), (1, 1, 1));

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].method, "GET");
    assert!(
        seen[0]
            .url
            .starts_with("/api/books?action=list&sortBy=bookid&direction=asc&page=1&pageSize=10&title="),
        "{}",
        seen[0].url
    );
    Ok(())
}

#[test]
fn list_accepts_bare_arrays_and_null_data() -> Result<()> {
    let (addr, handle) = serve(vec![
        (
            200,
            r#"{"success": true, "data": [{"bookid": 1, "bookname": "a", "publisher": "p", "price": 1000}, {"bookid": 2, "bookname": "b", "publisher": "p", "price": 2000}]}"#,
        ),
        (200, r#"{"success": true, "data": null}"#),
    ])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let legacy: ListPayload<Book> = client.list(&book_query())?;
    assert!(matches!(legacy, ListPayload::Unpaged(ref books) if books.len() == 2));

    let empty: ListPayload<Book> = client.list(&book_query())?;
    assert!(empty.is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unsuccessful_envelope_is_an_application_error() -> Result<()> {
    let (addr, handle) = serve(vec![(
        200,
        r#"{"success": false, "error": "도서를 찾을 수 없습니다."}"#,
    )])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let error = client
        .book_detail(BookId::new(99))
        .expect_err("detail should fail");
    assert_eq!(
        error.downcast_ref::<ApiError>(),
        Some(&ApiError::Application("도서를 찾을 수 없습니다.".to_owned()))
    );

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].url, "/api/books?action=detail&id=99");
    Ok(())
}

#[test]
fn non_success_status_is_a_status_error() -> Result<()> {
    let (addr, handle) = serve(vec![(
        500,
        r#"{"success": false, "error": "database unavailable"}"#,
    )])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let error = client.overview().expect_err("overview should fail");
    assert_eq!(
        error.downcast_ref::<ApiError>(),
        Some(&ApiError::Status {
            status: 500,
            message: "database unavailable".to_owned(),
        })
    );
    assert_eq!(error.to_string(), "server error (500): database unavailable");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn malformed_body_is_a_decode_error() -> Result<()> {
    let (addr, handle) = serve(vec![(200, "this is not json")])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let error = client.publishers().expect_err("publishers should fail");
    assert!(matches!(
        error.downcast_ref::<ApiError>(),
        Some(ApiError::Decode(_))
    ));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn login_posts_customer_id() -> Result<()> {
    let (addr, handle) = serve(vec![(
        200,
        r#"{"success": true, "data": {"customer": {"custid": 1, "name": "박지성", "address": "영국 맨체스타", "phone": "000-5000-0001", "role": "admin"}, "sessionId": "abc123"}}"#,
    )])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let login = client.login(CustomerId::new(1))?;
    assert_eq!(login.customer.name, "박지성");
    assert_eq!(login.session_id, "abc123");

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/api/customers?action=login");
    let body: Value = serde_json::from_str(&seen[0].body)?;
    assert_eq!(body, json!({"custid": 1}));
    Ok(())
}

#[test]
fn order_price_update_and_delete() -> Result<()> {
    let (addr, handle) = serve(vec![
        (200, r#"{"success": true, "data": {"updated": true}}"#),
        (200, r#"{"success": true, "data": {"deleted": true}}"#),
    ])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    client.update_order_price(OrderId::new(4), CustomerId::new(2), 6_500, Some(7_000))?;
    client.delete_order(OrderId::new(4), CustomerId::new(2))?;

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].method, "PUT");
    assert_eq!(seen[0].url, "/api/orders?action=update");
    let body: Value = serde_json::from_str(&seen[0].body)?;
    assert_eq!(
        body,
        json!({"orderid": 4, "custid": 2, "saleprice": 6500})
    );
    assert_eq!(seen[1].method, "DELETE");
    assert_eq!(seen[1].url, "/api/orders?action=delete&id=4&custid=2");
    Ok(())
}

#[test]
fn price_above_list_price_is_rejected_before_sending() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))?;
    let error = client
        .update_order_price(OrderId::new(4), CustomerId::new(2), 8_000, Some(7_000))
        .expect_err("price above list price");
    assert!(error.downcast_ref::<ApiError>().is_none());
    assert!(error.to_string().contains("list price"));
    Ok(())
}

fn sport_book() -> BookFormInput {
    BookFormInput {
        bookname: "축구의 이해".to_owned(),
        publisher: "대한미디어".to_owned(),
        price: 22_000,
    }
}

fn new_customer() -> CustomerFormInput {
    CustomerFormInput {
        name: "손흥민".to_owned(),
        address: "대한민국 춘천".to_owned(),
        phone: "010-7777-0007".to_owned(),
        role: Role::Customer,
    }
}

#[test]
fn book_create_update_delete() -> Result<()> {
    let (addr, handle) = serve(vec![
        (
            200,
            r#"{"success": true, "data": {"bookid": 11, "bookname": "축구의 이해", "publisher": "대한미디어", "price": 22000}}"#,
        ),
        (
            200,
            r#"{"success": true, "data": {"bookid": 11, "bookname": "축구의 이해", "publisher": "대한미디어", "price": 22000}}"#,
        ),
        (200, r#"{"success": true, "data": null}"#),
    ])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let created = client.create_book(&sport_book())?;
    assert_eq!(created.bookid, BookId::new(11));
    let updated = client.update_book(BookId::new(11), &sport_book())?;
    assert_eq!(updated.price, 22_000);
    client.delete_book(BookId::new(11))?;

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/api/books?action=create");
    let body: Value = serde_json::from_str(&seen[0].body)?;
    assert_eq!(
        body,
        json!({"bookname": "축구의 이해", "publisher": "대한미디어", "price": 22000})
    );

    assert_eq!(seen[1].method, "PUT");
    assert_eq!(seen[1].url, "/api/books?action=update");
    let body: Value = serde_json::from_str(&seen[1].body)?;
    assert_eq!(
        body,
        json!({"bookid": 11, "bookname": "축구의 이해", "publisher": "대한미디어", "price": 22000})
    );

    assert_eq!(seen[2].method, "DELETE");
    assert_eq!(seen[2].url, "/api/books?action=delete&id=11");
    assert!(seen[2].body.is_empty());
    Ok(())
}

#[test]
fn customer_create_update_delete() -> Result<()> {
    let (addr, handle) = serve(vec![
        (
            200,
            r#"{"success": true, "data": {"custid": 6, "name": "손흥민", "address": "대한민국 춘천", "phone": "010-7777-0007", "role": "customer"}}"#,
        ),
        (
            200,
            r#"{"success": true, "data": {"custid": 6, "name": "손흥민", "address": "대한민국 춘천", "phone": "010-7777-0007", "role": "admin"}}"#,
        ),
        (200, r#"{"success": true, "data": {"deleted": true}}"#),
    ])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let created = client.create_customer(&new_customer())?;
    assert_eq!(created.custid, CustomerId::new(6));
    assert_eq!(created.role, Role::Customer);

    let promoted = CustomerFormInput {
        role: Role::Admin,
        ..new_customer()
    };
    let updated = client.update_customer(CustomerId::new(6), &promoted)?;
    assert_eq!(updated.role, Role::Admin);
    client.delete_customer(CustomerId::new(6))?;

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/api/customers?action=create");
    let body: Value = serde_json::from_str(&seen[0].body)?;
    assert_eq!(
        body,
        json!({"name": "손흥민", "address": "대한민국 춘천", "phone": "010-7777-0007", "role": "customer"})
    );

    assert_eq!(seen[1].method, "PUT");
    assert_eq!(seen[1].url, "/api/customers?action=update");
    let body: Value = serde_json::from_str(&seen[1].body)?;
    assert_eq!(body["custid"], json!(6));
    assert_eq!(body["role"], json!("admin"));

    assert_eq!(seen[2].method, "DELETE");
    assert_eq!(seen[2].url, "/api/customers?action=delete&id=6");
    Ok(())
}

#[test]
fn create_order_returns_new_id_and_omits_list_price() -> Result<()> {
    let (addr, handle) = serve(vec![(200, r#"{"success": true, "data": {"orderid": 11}}"#)])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let order = client.create_order(&OrderFormInput {
        custid: CustomerId::new(1),
        bookid: BookId::new(3),
        saleprice: 21_000,
        list_price: Some(22_000),
    })?;
    assert_eq!(order, OrderId::new(11));

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/api/orders?action=create");
    let body: Value = serde_json::from_str(&seen[0].body)?;
    assert_eq!(body, json!({"custid": 1, "bookid": 3, "saleprice": 21000}));
    Ok(())
}

#[test]
fn create_order_without_id_is_a_decode_error() -> Result<()> {
    let (addr, handle) = serve(vec![(200, r#"{"success": true, "data": {"created": true}}"#)])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let error = client
        .create_order(&OrderFormInput {
            custid: CustomerId::new(1),
            bookid: BookId::new(3),
            saleprice: 21_000,
            list_price: None,
        })
        .expect_err("response without orderid");
    assert!(matches!(
        error.downcast_ref::<ApiError>(),
        Some(ApiError::Decode(_))
    ));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn invalid_forms_are_rejected_before_sending() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))?;

    let untitled = BookFormInput {
        bookname: " ".to_owned(),
        ..sport_book()
    };
    let error = client.create_book(&untitled).expect_err("title is required");
    assert!(error.downcast_ref::<ApiError>().is_none());
    assert!(error.to_string().contains("book title is required"));

    let free = BookFormInput {
        price: 0,
        ..sport_book()
    };
    let error = client
        .update_book(BookId::new(11), &free)
        .expect_err("price must be positive");
    assert!(error.downcast_ref::<ApiError>().is_none());

    let nameless = CustomerFormInput {
        name: String::new(),
        ..new_customer()
    };
    let error = client
        .create_customer(&nameless)
        .expect_err("name is required");
    assert!(error.downcast_ref::<ApiError>().is_none());

    let overpriced = OrderFormInput {
        custid: CustomerId::new(1),
        bookid: BookId::new(3),
        saleprice: 30_000,
        list_price: Some(22_000),
    };
    let error = client
        .create_order(&overpriced)
        .expect_err("price above list price");
    assert!(error.downcast_ref::<ApiError>().is_none());
    Ok(())
}

#[test]
fn controller_loads_through_client() -> Result<()> {
    let (addr, handle) = serve(vec![(
        200,
        r#"{"success": true, "data": {"items": [{"bookid": 11, "bookname": "a", "publisher": "p", "price": 1000}, {"bookid": 12, "bookname": "b", "publisher": "p", "price": 1000}, {"bookid": 13, "bookname": "c", "publisher": "p", "price": 1000}], "page": 2, "totalPages": 5, "totalItems": 47}}"#,
    )])?;

    let mut client = Client::new(&addr, Duration::from_secs(2))?;
    let mut controller = ListController::<Book>::new(ListKind::Books, 10);
    let pending = controller.reload();
    let result = madang_app::ListSource::<Book>::fetch_list(&mut client, &pending.query);
    controller.complete(pending.seq, result);

    let view = controller.view();
    assert_eq!(view.body.row_count(), 3);
    assert_eq!(view.pagination.page_info(), "page 2 of 5");
    assert_eq!(view.pagination.items_info(), "47 total");

    handle.join().expect("server thread should join");
    Ok(())
}
