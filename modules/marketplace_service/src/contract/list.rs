//! Pagination, sorting and list filters

use rust_decimal::Decimal;
use uuid::Uuid;

use super::model::{OrderStatus, Role, UserStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Sortable columns shared by the listable entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Price,
    Rating,
    TotalAmount,
    Status,
}

impl SortField {
    /// Accepts camelCase and snake_case names; unknown values fall back to `CreatedAt`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or_default() {
            "updatedAt" | "updated_at" => SortField::UpdatedAt,
            "name" | "businessName" | "business_name" => SortField::Name,
            "price" => SortField::Price,
            "rating" => SortField::Rating,
            "totalAmount" | "total_amount" => SortField::TotalAmount,
            "status" => SortField::Status,
            _ => SortField::CreatedAt,
        }
    }
}

const MAX_OFFSET: u64 = i64::MAX as u64;

/// Normalised page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }

    pub fn sorted(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Row offset of the page, capped to what a SQL `OFFSET` (bigint) can hold
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(MAX_OFFSET)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, 10, 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// One page of results plus its pagination block
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            data,
            pagination: Pagination {
                total,
                page: request.page,
                limit: request.limit,
                total_pages: total.div_ceil(request.limit),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

// ===== Filters =====

#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    /// Matches name, description or ingredients, case-insensitive
    pub search: Option<String>,
    /// Category name substring
    pub category: Option<String>,
    pub category_ids: Vec<Uuid>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    /// Cuisine name substring
    pub cuisine: Option<String>,
    pub is_vegan: Option<bool>,
    pub is_featured: Option<bool>,
    pub provider_id: Option<Uuid>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Matches order number, customer name/email or provider business name
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_is_clamped() {
        let req = PageRequest::new(Some(0), Some(500), 10, 100);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 100);

        let req = PageRequest::new(Some(3), None, 10, 100);
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn huge_page_offset_saturates() {
        let req = PageRequest::new(Some(u64::MAX), Some(100), 10, 100);
        assert_eq!(req.page, u64::MAX);
        assert_eq!(req.offset(), i64::MAX as u64);

        let req = PageRequest::new(Some(u64::MAX / 50), Some(100), 10, 100);
        assert_eq!(req.offset(), i64::MAX as u64);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(Some(1), Some(10), 10, 100);
        let page: Page<u8> = Page::new(vec![], 21, &req);
        assert_eq!(page.pagination.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], 0, &req);
        assert_eq!(empty.pagination.total_pages, 0);
    }

    #[test]
    fn sort_parsing_falls_back() {
        assert_eq!(SortField::parse(Some("price")), SortField::Price);
        assert_eq!(SortField::parse(Some("; drop table")), SortField::CreatedAt);
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }
}
