// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use madang_app::{
    Book, BookId, Customer, CustomerId, ListPayload, ListQuery, ListRecord, ListSource,
    LoginCandidate, Order, OrderId, PageResponse, Role, SortDirection,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use time::{Date, Duration, Month};

const BOOKS: [(i64, &str, &str, i64); 10] = [
    (1, "축구의 역사", "굿스포츠", 7_000),
    (2, "축구아는 여자", "나무수", 13_000),
    (3, "축구의 이해", "대한미디어", 22_000),
    (4, "골프 바이블", "대한미디어", 35_000),
    (5, "피겨 교본", "굿스포츠", 8_000),
    (6, "역도 단계별기술", "굿스포츠", 6_000),
    (7, "야구의 추억", "이상미디어", 20_000),
    (8, "야구를 부탁해", "이상미디어", 13_000),
    (9, "올림픽 이야기", "삼성당", 7_500),
    (10, "Olympic Champions", "Pearson", 13_000),
];

const CUSTOMERS: [(i64, &str, &str, &str, Role); 5] = [
    (1, "박지성", "영국 맨체스타", "000-5000-0001", Role::Admin),
    (2, "김연아", "대한민국 서울", "000-6000-0001", Role::Customer),
    (3, "장미란", "대한민국 강원도", "000-7000-0001", Role::Customer),
    (4, "추신수", "미국 클리블랜드", "000-8000-0001", Role::Customer),
    (5, "박세리", "대한민국 대전", "", Role::Customer),
];

/// `(orderid, custid, bookid, saleprice, orderdate)`
const ORDERS: [(i64, i64, i64, i64, &str); 10] = [
    (1, 1, 1, 6_000, "2014-07-01"),
    (2, 1, 3, 21_000, "2014-07-03"),
    (3, 2, 5, 8_000, "2014-07-03"),
    (4, 3, 6, 6_000, "2014-07-04"),
    (5, 4, 7, 20_000, "2014-07-05"),
    (6, 1, 2, 12_000, "2014-07-07"),
    (7, 4, 8, 13_000, "2014-07-07"),
    (8, 3, 10, 12_000, "2014-07-08"),
    (9, 2, 10, 7_000, "2014-07-09"),
    (10, 3, 8, 13_000, "2014-07-10"),
];

const TITLE_SUBJECTS: [&str; 10] = [
    "축구", "야구", "농구", "배구", "골프", "수영", "테니스", "마라톤", "스키", "역도",
];
const TITLE_PATTERNS: [&str; 6] = ["{}의 역사", "{} 교본", "{} 바이블", "{}의 이해", "{} 이야기", "{}를 부탁해"];
const PUBLISHERS: [&str; 7] = [
    "굿스포츠",
    "나무수",
    "대한미디어",
    "이상미디어",
    "삼성당",
    "Pearson",
    "마당출판",
];
const FAMILY_NAMES: [&str; 10] = ["김", "이", "박", "최", "정", "강", "조", "윤", "장", "임"];
const GIVEN_NAMES: [&str; 12] = [
    "민준", "서연", "도윤", "지우", "하준", "서윤", "시우", "하은", "주원", "지민", "예준", "수아",
];
const REGIONS: [&str; 8] = [
    "대한민국 서울",
    "대한민국 부산",
    "대한민국 대전",
    "대한민국 광주",
    "대한민국 강원도",
    "영국 맨체스타",
    "미국 클리블랜드",
    "일본 도쿄",
];

pub fn madang_books() -> Vec<Book> {
    BOOKS
        .iter()
        .map(|(id, name, publisher, price)| Book {
            bookid: BookId::new(*id),
            bookname: (*name).to_owned(),
            publisher: (*publisher).to_owned(),
            price: *price,
        })
        .collect()
}

pub fn madang_customers() -> Vec<Customer> {
    CUSTOMERS
        .iter()
        .map(|(id, name, address, phone, role)| Customer {
            custid: CustomerId::new(*id),
            name: (*name).to_owned(),
            address: (*address).to_owned(),
            phone: (*phone).to_owned(),
            role: *role,
        })
        .collect()
}

/// Orders joined with their book, the way the orders endpoint returns them.
pub fn madang_orders() -> Vec<Order> {
    let books = madang_books();
    ORDERS
        .iter()
        .map(|(orderid, custid, bookid, saleprice, orderdate)| {
            let book = books.iter().find(|book| book.bookid.get() == *bookid);
            Order {
                orderid: OrderId::new(*orderid),
                custid: Some(CustomerId::new(*custid)),
                bookid: Some(BookId::new(*bookid)),
                orderdate: (*orderdate).to_owned(),
                bookname: book.map(|book| book.bookname.clone()).unwrap_or_default(),
                publisher: book.map(|book| book.publisher.clone()).unwrap_or_default(),
                saleprice: *saleprice,
                list_price: book.map(|book| book.price),
            }
        })
        .collect()
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("madang.db");
    Ok((dir, db_path))
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for catalogs larger than the fixed Madang data.
#[derive(Debug, Clone)]
pub struct BookstoreFaker {
    rng: DeterministicRng,
}

impl BookstoreFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn book(&mut self, id: i64) -> Book {
        let subject = self.pick(&TITLE_SUBJECTS);
        let pattern = self.pick(&TITLE_PATTERNS);
        Book {
            bookid: BookId::new(id),
            bookname: pattern.replacen("{}", subject, 1),
            publisher: self.pick(&PUBLISHERS).to_owned(),
            price: self.int_range(5, 40) * 1_000,
        }
    }

    pub fn books(&mut self, count: usize) -> Vec<Book> {
        (1..=count as i64).map(|id| self.book(id)).collect()
    }

    pub fn customer(&mut self, id: i64) -> Customer {
        let name = format!("{}{}", self.pick(&FAMILY_NAMES), self.pick(&GIVEN_NAMES));
        Customer {
            custid: CustomerId::new(id),
            name,
            address: self.pick(&REGIONS).to_owned(),
            phone: format!(
                "010-{:04}-{:04}",
                self.int_range(0, 9_999),
                self.int_range(0, 9_999)
            ),
            role: Role::Customer,
        }
    }

    pub fn customers(&mut self, count: usize) -> Vec<Customer> {
        (1..=count as i64).map(|id| self.customer(id)).collect()
    }

    /// An order for `custid` at or below the book's list price.
    pub fn order(&mut self, id: i64, custid: CustomerId, book: &Book) -> Order {
        let discount = self.int_range(0, 3) * 500;
        Order {
            orderid: OrderId::new(id),
            custid: Some(custid),
            bookid: Some(book.bookid),
            orderdate: self.date_in_year(2024).to_string(),
            bookname: book.bookname.clone(),
            publisher: book.publisher.clone(),
            saleprice: (book.price - discount).max(1_000),
            list_price: Some(book.price),
        }
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let start = Date::from_calendar_date(year, Month::January, 1).unwrap_or(Date::MIN);
        let offset = self.int_range(0, 364);
        start
            .checked_add(Duration::days(offset))
            .unwrap_or(start)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Int(i64),
    Text(String),
}

/// Server-side behavior of one record type: what a sort column compares
/// and whether a filter parameter matches.
pub trait FakeRecord: ListRecord + Clone {
    fn sort_key(&self, column: &str) -> Option<SortKey>;
    fn matches(&self, key: &str, value: &str) -> bool;
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl FakeRecord for Book {
    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "bookid" => Some(SortKey::Int(self.bookid.get())),
            "bookname" => Some(SortKey::Text(self.bookname.clone())),
            "publisher" => Some(SortKey::Text(self.publisher.clone())),
            "price" => Some(SortKey::Int(self.price)),
            _ => None,
        }
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        match key {
            "title" => contains(&self.bookname, value),
            "publisher" => contains(&self.publisher, value),
            "priceMin" => value.parse().is_ok_and(|min: i64| self.price >= min),
            "priceMax" => value.parse().is_ok_and(|max: i64| self.price <= max),
            _ => true,
        }
    }
}

impl FakeRecord for Customer {
    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "custid" => Some(SortKey::Int(self.custid.get())),
            "name" => Some(SortKey::Text(self.name.clone())),
            "address" => Some(SortKey::Text(self.address.clone())),
            "phone" => Some(SortKey::Text(self.phone.clone())),
            "role" => Some(SortKey::Text(self.role.as_str().to_owned())),
            _ => None,
        }
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        match key {
            "name" => contains(&self.name, value),
            "phone" => contains(&self.phone, value),
            "address" => contains(&self.address, value),
            "role" => Role::parse(value) == Some(self.role),
            _ => true,
        }
    }
}

impl FakeRecord for LoginCandidate {
    fn sort_key(&self, column: &str) -> Option<SortKey> {
        self.0.sort_key(column)
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        self.0.matches(key, value)
    }
}

impl FakeRecord for Order {
    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "orderid" => Some(SortKey::Int(self.orderid.get())),
            "orderdate" => Some(SortKey::Text(self.orderdate.clone())),
            "bookname" => Some(SortKey::Text(self.bookname.clone())),
            "publisher" => Some(SortKey::Text(self.publisher.clone())),
            "saleprice" => Some(SortKey::Int(self.saleprice)),
            _ => None,
        }
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        match key {
            "custid" => self
                .custid
                .is_some_and(|custid| custid.to_string() == value),
            _ => true,
        }
    }
}

const CONTROL_PARAMS: [&str; 5] = ["action", "sortBy", "direction", "page", "pageSize"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Paged,
    /// Every match in one bare array, ignoring paging.
    Legacy,
}

/// An in-memory list endpoint that filters, sorts and pages like the
/// server. Records every query it receives; queued failures are returned
/// before any data.
#[derive(Debug, Clone)]
pub struct FakeSource<R> {
    records: Vec<R>,
    shape: ResponseShape,
    failures: VecDeque<String>,
    requests: Vec<ListQuery>,
}

impl<R: FakeRecord> FakeSource<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            shape: ResponseShape::Paged,
            failures: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    pub fn with_shape(mut self, shape: ResponseShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn fail_next(&mut self, message: &str) {
        self.failures.push_back(message.to_owned());
    }

    pub fn requests(&self) -> &[ListQuery] {
        &self.requests
    }

    pub fn respond(&self, query: &ListQuery) -> ListPayload<R> {
        let mut matched: Vec<R> = self
            .records
            .iter()
            .filter(|record| {
                query
                    .params()
                    .iter()
                    .filter(|(key, _)| !CONTROL_PARAMS.contains(&key.as_str()))
                    .all(|(key, value)| record.matches(key, value))
            })
            .cloned()
            .collect();

        let column = query.get("sortBy").unwrap_or_default();
        let direction = query
            .get("direction")
            .and_then(SortDirection::parse)
            .unwrap_or(SortDirection::Asc);
        matched.sort_by(|left, right| {
            let ordering = left
                .sort_key(column)
                .cmp(&right.sort_key(column))
                .then_with(|| left.record_id().cmp(&right.record_id()));
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        if self.shape == ResponseShape::Legacy {
            return ListPayload::Unpaged(matched);
        }

        let page = query.page().max(1);
        let page_size = query
            .get("pageSize")
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(madang_app::DEFAULT_PAGE_SIZE);
        let total_items = matched.len() as u64;
        let total_pages = total_items.div_ceil(u64::from(page_size)) as u32;
        let start = ((page - 1) as usize).saturating_mul(page_size as usize);
        let items: Vec<R> = matched
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        ListPayload::Paged(PageResponse {
            items,
            page: Some(page),
            page_size: Some(page_size),
            total_pages: Some(total_pages),
            total_items: Some(total_items),
        })
    }
}

impl<R: FakeRecord> ListSource<R> for FakeSource<R> {
    fn fetch_list(&mut self, query: &ListQuery) -> Result<ListPayload<R>> {
        self.requests.push(query.clone());
        if let Some(message) = self.failures.pop_front() {
            return Err(anyhow!(message));
        }
        Ok(self.respond(query))
    }
}
