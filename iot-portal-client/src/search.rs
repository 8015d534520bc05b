//! Paginated search request/response types for list views.

use crate::record::EntityRecord;
use serde::{Deserialize, Serialize};

/// Sort direction for a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Restrict a list to rows whose `key` is one of `value`.
///
/// A filter with an empty `value` list is ignored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub value: Vec<String>,
}

/// Body of a `POST {segment}/list` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub offset: u32,
    pub length: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Empty means the backend default (newest first)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sort_key: String,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl SearchParams {
    /// First page of `length` rows with no filtering.
    pub fn page(length: u32) -> Self {
        Self {
            offset: 0,
            length,
            keyword: String::new(),
            filters: Vec::new(),
            sort_key: String::new(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: Vec<String>) -> Self {
        self.filters.push(Filter {
            key: key.into(),
            value,
        });
        self
    }

    pub fn sorted_by(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort_key = key.into();
        self.sort_order = order;
        self
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::page(20)
    }
}

/// One page of list results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<EntityRecord>,
    /// Total matching rows across all pages
    pub total: u64,
}

impl Page {
    /// Whether rows exist past this page, given the request that produced it.
    pub fn has_more(&self, params: &SearchParams) -> bool {
        u64::from(params.offset) + (self.items.len() as u64) < self.total
    }
}
