use serde::Deserialize;

use crate::error::ServerError;
use crate::store::Page;

/// `?limit=&page=` query parameters, pages counted from 1
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl PaginationParams {
    pub fn into_page(self) -> Result<Page, ServerError> {
        if let Some(limit) = self.limit {
            if limit <= 0 {
                return Err(ServerError::BadRequest(
                    "limit must be greater than 0".to_string(),
                ));
            }
        }
        if let Some(page) = self.page {
            if page < 0 {
                return Err(ServerError::BadRequest("page must not be negative".to_string()));
            }
        }

        let offset = match (self.limit, self.page) {
            (Some(limit), Some(page)) if page > 0 => Some((page - 1) * limit),
            _ => None,
        };
        Ok(Page {
            limit: self.limit,
            offset,
        })
    }
}
