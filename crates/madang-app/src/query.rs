// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use url::form_urlencoded;

use crate::{ListKind, ViewState};

pub const LIST_ACTION: &str = "list";

/// Query parameters for one list request, in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub kind: ListKind,
    params: Vec<(String, String)>,
}

impl ListQuery {
    /// Builds the request for `state`. Base parameters (the orders screen's
    /// `custid`) come first; filters follow in the kind's declared order and
    /// empty ones are left out.
    pub fn build(kind: ListKind, base_params: &[(String, String)], state: &ViewState) -> Self {
        let mut params = Vec::with_capacity(6 + base_params.len() + state.filters.len());
        params.push(("action".to_owned(), LIST_ACTION.to_owned()));
        params.extend(base_params.iter().cloned());
        params.push(("sortBy".to_owned(), state.sort_column.to_owned()));
        params.push((
            "direction".to_owned(),
            state.sort_direction.as_str().to_owned(),
        ));
        params.push(("page".to_owned(), state.page.to_string()));
        params.push(("pageSize".to_owned(), state.page_size.to_string()));
        for field in kind.filters() {
            let value = state.filter(field.key);
            if !value.is_empty() {
                params.push((field.key.to_owned(), value.to_owned()));
            }
        }
        Self { kind, params }
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn page(&self) -> u32 {
        self.get("page")
            .and_then(|value| value.parse().ok())
            .unwrap_or(1)
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }
}

impl std::fmt::Display for ListQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}?{}", self.kind.endpoint(), self.to_query_string())
    }
}
