// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    ColumnHeader, FilterView, ListKind, ListPayload, ListQuery, ListRecord, ListView,
    PaginationView, TableBody, TableRow, ViewState, is_valid_page_size,
};

/// Supplies list pages for a query. Implemented by the HTTP client and the
/// in-memory test source.
pub trait ListSource<R> {
    fn fetch_list(&mut self, query: &ListQuery) -> Result<ListPayload<R>>;
}

pub trait ListRenderer {
    fn render_list(&mut self, view: &ListView);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    SetFilter(Vec<(String, String)>),
    ClearFilters,
    SetSort(String),
    SetPageSize(u32),
    GoToPage(u32),
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// A load the controller has committed to. The caller fetches `query` and
/// hands the result back with the same `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub seq: u64,
    pub query: ListQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { rows: usize },
    Failed(String),
    /// A newer load was issued after this one; the response was dropped.
    Stale,
}

/// Owns one screen's view state and cached page. State is committed before
/// each fetch; only the response to the most recently issued load is
/// applied.
#[derive(Debug)]
pub struct ListController<R> {
    kind: ListKind,
    state: ViewState,
    base_params: Vec<(String, String)>,
    cache: Vec<R>,
    status: LoadStatus,
    last_seq: u64,
    in_flight: Option<u64>,
}

impl<R> ListController<R> {
    pub fn new(kind: ListKind, page_size: u32) -> Self {
        let page_size = if is_valid_page_size(page_size) {
            page_size
        } else {
            crate::DEFAULT_PAGE_SIZE
        };
        Self {
            kind,
            state: ViewState::new(kind, page_size),
            base_params: Vec::new(),
            cache: Vec::new(),
            status: LoadStatus::Idle,
            last_seq: 0,
            in_flight: None,
        }
    }

    /// Adds a parameter sent with every request, ahead of the sort fields.
    pub fn with_base_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_params.push((key.into(), value.into()));
        self
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn records(&self) -> &[R] {
        &self.cache
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn query(&self) -> ListQuery {
        ListQuery::build(self.kind, &self.base_params, &self.state)
    }

    pub fn dispatch(&mut self, command: ListCommand) -> Option<PendingLoad> {
        match command {
            ListCommand::SetFilter(fields) => {
                let borrowed: Vec<(&str, &str)> = fields
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect();
                Some(self.set_filter(&borrowed))
            }
            ListCommand::ClearFilters => Some(self.clear_filters()),
            ListCommand::SetSort(column) => self.set_sort(&column),
            ListCommand::SetPageSize(size) => self.set_page_size(size),
            ListCommand::GoToPage(page) => self.go_to_page(page),
            ListCommand::Reload => Some(self.reload()),
        }
    }

    /// Merges filter values; an empty value clears its field. Fields this
    /// list does not filter on are ignored.
    pub fn set_filter(&mut self, fields: &[(&str, &str)]) -> PendingLoad {
        for (key, raw) in fields {
            let Some(field) = self.kind.filter_field(key) else {
                tracing::warn!(kind = self.kind.as_str(), field = *key, "ignoring unknown filter");
                continue;
            };
            let value = field.normalize(raw);
            if value.is_empty() {
                self.state.filters.remove(field.key);
            } else {
                self.state.filters.insert(field.key, value);
            }
        }
        self.state.page = 1;
        self.reload()
    }

    pub fn clear_filters(&mut self) -> PendingLoad {
        self.state.filters.clear();
        self.state.page = 1;
        self.reload()
    }

    /// Returns `None` for columns outside the sort allow-list.
    pub fn set_sort(&mut self, column: &str) -> Option<PendingLoad> {
        let Some(column) = self.kind.sort_column(column) else {
            tracing::warn!(kind = self.kind.as_str(), column, "ignoring unsortable column");
            return None;
        };
        self.state.apply_sort(column);
        Some(self.reload())
    }

    pub fn set_page_size(&mut self, size: u32) -> Option<PendingLoad> {
        if !is_valid_page_size(size) {
            tracing::warn!(kind = self.kind.as_str(), size, "ignoring unsupported page size");
            return None;
        }
        self.state.page_size = size;
        self.state.page = 1;
        Some(self.reload())
    }

    /// No-op for pages outside `[1, total_pages]` and for the current page.
    pub fn go_to_page(&mut self, page: u32) -> Option<PendingLoad> {
        if page < 1 || page > self.state.total_pages || page == self.state.page {
            return None;
        }
        self.state.page = page;
        Some(self.reload())
    }

    pub fn next_page(&mut self) -> Option<PendingLoad> {
        if self.state.is_last_page() {
            return None;
        }
        self.go_to_page(self.state.page + 1)
    }

    pub fn prev_page(&mut self) -> Option<PendingLoad> {
        if self.state.is_first_page() {
            return None;
        }
        self.go_to_page(self.state.page - 1)
    }

    pub fn last_page(&mut self) -> Option<PendingLoad> {
        self.go_to_page(self.state.total_pages)
    }

    pub fn reload(&mut self) -> PendingLoad {
        self.last_seq += 1;
        let seq = self.last_seq;
        self.in_flight = Some(seq);
        self.status = LoadStatus::Loading;
        let query = self.query();
        tracing::debug!(kind = self.kind.as_str(), seq, query = %query, "list load issued");
        PendingLoad { seq, query }
    }

    /// Applies a fetch result if `seq` is the load still awaited.
    pub fn complete(&mut self, seq: u64, result: Result<ListPayload<R>>) -> LoadOutcome {
        if self.in_flight != Some(seq) {
            tracing::debug!(
                kind = self.kind.as_str(),
                seq,
                latest = self.last_seq,
                "dropping stale list response"
            );
            return LoadOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(payload) => {
                let (records, slice) = payload.into_parts();
                self.state.apply_page(&slice);
                self.cache = records;
                self.status = LoadStatus::Loaded;
                tracing::debug!(
                    kind = self.kind.as_str(),
                    seq,
                    rows = self.cache.len(),
                    page = slice.page,
                    total_pages = slice.total_pages,
                    "list load applied"
                );
                LoadOutcome::Applied {
                    rows: self.cache.len(),
                }
            }
            Err(error) => {
                let message = format!("{error:#}");
                tracing::warn!(kind = self.kind.as_str(), seq, error = %message, "list load failed");
                self.status = LoadStatus::Failed(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Renders a loading frame, fetches, applies and renders again. For
    /// callers that fetch on the same thread.
    pub fn execute<S, V>(&mut self, pending: PendingLoad, source: &mut S, renderer: &mut V) -> LoadOutcome
    where
        R: ListRecord,
        S: ListSource<R> + ?Sized,
        V: ListRenderer + ?Sized,
    {
        renderer.render_list(&self.view());
        let result = source.fetch_list(&pending.query);
        let outcome = self.complete(pending.seq, result);
        renderer.render_list(&self.view());
        outcome
    }
}

impl<R: ListRecord> ListController<R> {
    /// Projects the cached rows and the current view state. The pagination
    /// widget follows `state.page`, so it always offers the same targets
    /// `go_to_page` accepts. A failed load replaces the rows with one error
    /// row.
    pub fn view(&self) -> ListView {
        let columns: Vec<ColumnHeader> = self
            .kind
            .columns()
            .iter()
            .map(|spec| ColumnHeader {
                key: spec.key,
                label: spec.label,
                sort: (spec.key == self.state.sort_column).then_some(self.state.sort_direction),
            })
            .collect();
        let span = columns.len();

        let body = match &self.status {
            LoadStatus::Failed(_) => TableBody::Error {
                message: self.kind.error_message().to_owned(),
                span,
            },
            _ if self.cache.is_empty() => TableBody::Empty {
                message: self.kind.empty_message().to_owned(),
                span,
            },
            _ => TableBody::Rows(
                self.cache
                    .iter()
                    .map(|record| TableRow {
                        id: record.record_id(),
                        cells: record.cells(),
                    })
                    .collect(),
            ),
        };

        let filters = self
            .kind
            .filters()
            .iter()
            .map(|field| FilterView {
                field: *field,
                value: self.state.filter(field.key).to_owned(),
            })
            .collect();

        ListView {
            kind: self.kind,
            columns,
            body,
            pagination: PaginationView::new(
                self.state.page,
                self.state.total_pages,
                self.state.total_items,
            ),
            page_size: self.state.page_size,
            loading: self.is_loading(),
            filters,
        }
    }
}
