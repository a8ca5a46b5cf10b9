// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FilterField, ListKind, PaginationView, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub key: &'static str,
    pub label: &'static str,
    pub sort: Option<SortDirection>,
}

impl ColumnHeader {
    pub fn title(&self) -> String {
        match self.sort {
            Some(direction) => format!("{} {}", self.label, direction.indicator()),
            None => self.label.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<TableRow>),
    /// One placeholder row spanning every column.
    Empty { message: String, span: usize },
    /// Same shape as `Empty`; `r` retries.
    Error { message: String, span: usize },
}

impl TableBody {
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Empty { .. } | Self::Error { .. } => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterView {
    pub field: FilterField,
    pub value: String,
}

/// Everything a renderer needs for one frame, projected from a single
/// controller snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub kind: ListKind,
    pub columns: Vec<ColumnHeader>,
    pub body: TableBody,
    pub pagination: PaginationView,
    pub page_size: u32,
    pub loading: bool,
    pub filters: Vec<FilterView>,
}
