use crate::{
    error::{AppError, AppResult},
    models::Page,
};

/// A validated, 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> AppResult<Self> {
        if page == 0 {
            return Err(AppError::InvalidInput("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(AppError::InvalidInput("limit must be at least 1".to_string()));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Slices `[(page - 1) * limit, page * limit)` out of the ranked items
///
/// Pages past the end come back empty with the same metadata.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_count = items.len();
    let limit = request.limit as usize;
    let total_pages = u32::try_from(total_count.div_ceil(limit)).unwrap_or(u32::MAX);
    let start = (request.page as usize - 1).saturating_mul(limit);

    let items = items.into_iter().skip(start).take(limit).collect();

    Page {
        items,
        page_number: request.page,
        total_pages,
        total_count,
    }
}
