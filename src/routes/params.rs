use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Bounds arrive as raw strings so a bad value surfaces as a caller error
    /// instead of silently matching nothing.
    pub fn price_bounds(&self) -> AppResult<(Option<i64>, Option<i64>)> {
        let min = parse_price(self.min_price.as_deref())?;
        let max = parse_price(self.max_price.as_deref())?;
        if let (Some(lo), Some(hi)) = (min, max) {
            if hi <= lo {
                return Err(AppError::BadRequest(
                    "Max price must be greater than min price".into(),
                ));
            }
        }
        Ok((min, max))
    }
}

fn parse_price(raw: Option<&str>) -> AppResult<Option<i64>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::BadRequest("min_price and max_price must be integers".into()))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SellerListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub approved: Option<bool>,
}

impl SellerListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSortBy {
    CreatedAt,
    Rating,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReviewQuery {
    pub sort: Option<String>,
}

impl ReviewQuery {
    /// Accepts `created_at`, `rating` and their `-` prefixed descending
    /// forms. Anything else is a caller error. Absent means newest first.
    pub fn order(&self) -> AppResult<(ReviewSortBy, SortOrder)> {
        let Some(raw) = self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok((ReviewSortBy::CreatedAt, SortOrder::Desc));
        };
        let (order, field) = match raw.strip_prefix('-') {
            Some(rest) => (SortOrder::Desc, rest),
            None => (SortOrder::Asc, raw),
        };
        match field {
            "created_at" => Ok((ReviewSortBy::CreatedAt, order)),
            "rating" => Ok((ReviewSortBy::Rating, order)),
            other => Err(AppError::BadRequest(format!("Cannot sort by '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price_query(min: Option<&str>, max: Option<&str>) -> ProductQuery {
        ProductQuery {
            min_price: min.map(String::from),
            max_price: max.map(String::from),
            ..ProductQuery::default()
        }
    }

    #[test]
    fn absent_bounds_are_not_applied() {
        assert_eq!(price_query(None, None).price_bounds().unwrap(), (None, None));
        assert_eq!(
            price_query(Some(""), None).price_bounds().unwrap(),
            (None, None)
        );
    }

    #[test]
    fn single_bound_is_allowed() {
        assert_eq!(
            price_query(Some("500"), None).price_bounds().unwrap(),
            (Some(500), None)
        );
        assert_eq!(
            price_query(None, Some("9000")).price_bounds().unwrap(),
            (None, Some(9000))
        );
    }

    #[test]
    fn non_integer_bound_is_rejected() {
        let err = price_query(Some("cheap"), None).price_bounds().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = price_query(None, Some("9.99")).price_bounds().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn max_must_exceed_min() {
        assert_eq!(
            price_query(Some("100"), Some("200")).price_bounds().unwrap(),
            (Some(100), Some(200))
        );
        assert!(price_query(Some("200"), Some("100")).price_bounds().is_err());
        assert!(price_query(Some("100"), Some("100")).price_bounds().is_err());
    }

    #[test]
    fn pagination_normalizes_out_of_range_values() {
        let (page, per_page, offset) = Pagination {
            page: Some(0),
            per_page: Some(1000),
        }
        .normalize();
        assert_eq!((page, per_page, offset), (1, 100, 0));

        let (page, per_page, offset) = Pagination::default().normalize();
        assert_eq!((page, per_page, offset), (1, 20, 0));
    }

    #[test]
    fn review_sort_parses_prefix_and_field() {
        let query = |sort: &str| ReviewQuery {
            sort: Some(sort.to_string()),
        };
        assert_eq!(
            query("rating").order().unwrap(),
            (ReviewSortBy::Rating, SortOrder::Asc)
        );
        assert_eq!(
            query("-created_at").order().unwrap(),
            (ReviewSortBy::CreatedAt, SortOrder::Desc)
        );
        assert_eq!(
            ReviewQuery::default().order().unwrap(),
            (ReviewSortBy::CreatedAt, SortOrder::Desc)
        );
        assert!(query("helpfulness").order().is_err());
    }
}
