//! Translation of raw list/count query parameters into a typed filter.
//!
//! `page` and `limit` are validated strictly and reject the request. Enum and
//! boolean filters are lenient: an unrecognized value drops that filter and is
//! only logged.

use serde::Deserialize;
use thiserror::Error;

use crate::products::{ProductGender, ProductType};
use crate::validation::{is_non_empty_string, is_positive_integer, parse_boolean, parse_integer};

/// Raw query string for `GET /products` and `GET /products/count`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "promptDelivery")]
    pub prompt_delivery: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("limit must be a positive integer")]
    InvalidLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Rows to skip: `(page - 1) * limit`.
    #[must_use]
    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Validated, typed product filter. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub gender: Option<ProductGender>,
    pub product_type: Option<ProductType>,
    pub prompt_delivery: Option<bool>,
    /// Present only when both `page` and `limit` were supplied.
    pub pagination: Option<Pagination>,
}

impl ProductFilters {
    /// Builds filters from a raw query.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] when `page` or `limit` is present but not a
    /// positive integer.
    pub fn from_query(query: &ProductQuery) -> Result<Self, FilterError> {
        let page = parse_bound(query.page.as_deref(), FilterError::InvalidPage)?;
        let limit = parse_bound(query.limit.as_deref(), FilterError::InvalidLimit)?;

        let pagination = match (page, limit) {
            (Some(page), Some(limit)) => Some(Pagination { page, limit }),
            _ => None,
        };

        let gender = present(query.gender.as_deref()).and_then(|raw| {
            raw.parse::<ProductGender>()
                .map_err(|_| tracing::warn!(gender = raw, "invalid gender filter ignored"))
                .ok()
        });

        let product_type = present(query.product_type.as_deref()).and_then(|raw| {
            raw.parse::<ProductType>()
                .map_err(|_| tracing::warn!(product_type = raw, "invalid product type filter ignored"))
                .ok()
        });

        let prompt_delivery = query.prompt_delivery.as_deref().and_then(|raw| {
            let parsed = parse_boolean(raw);
            if parsed.is_none() {
                tracing::warn!(prompt_delivery = raw, "invalid promptDelivery filter ignored");
            }
            parsed
        });

        Ok(Self {
            brand: present(query.brand.as_deref()).map(ToOwned::to_owned),
            category: present(query.category.as_deref()).map(ToOwned::to_owned),
            gender,
            product_type,
            prompt_delivery,
            pagination,
        })
    }
}

/// Empty query values count as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| is_non_empty_string(v))
}

fn parse_bound(raw: Option<&str>, error: FilterError) -> Result<Option<i64>, FilterError> {
    match present(raw) {
        None => Ok(None),
        Some(raw) => parse_integer(raw)
            .filter(|v| is_positive_integer(*v))
            .map(Some)
            .ok_or(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ProductQuery {
        let mut q = ProductQuery::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "page" => q.page = value,
                "limit" => q.limit = value,
                "brand" => q.brand = value,
                "category" => q.category = value,
                "gender" => q.gender = value,
                "promptDelivery" => q.prompt_delivery = value,
                "type" => q.product_type = value,
                other => panic!("unknown query key {other}"),
            }
        }
        q
    }

    #[test]
    fn empty_query_applies_no_filters() {
        let filters = ProductFilters::from_query(&ProductQuery::default()).expect("filters");
        assert_eq!(filters, ProductFilters::default());
    }

    #[test]
    fn page_and_limit_produce_offset() {
        let filters =
            ProductFilters::from_query(&query(&[("page", "3"), ("limit", "20")])).expect("filters");
        let pagination = filters.pagination.expect("pagination");
        assert_eq!(pagination.limit, 20);
        assert_eq!(pagination.offset(), 40);
    }

    #[test]
    fn page_or_limit_alone_disables_pagination() {
        let only_page = ProductFilters::from_query(&query(&[("page", "2")])).expect("filters");
        assert!(only_page.pagination.is_none());
        let only_limit = ProductFilters::from_query(&query(&[("limit", "5")])).expect("filters");
        assert!(only_limit.pagination.is_none());
    }

    #[test]
    fn invalid_page_values_are_rejected() {
        for raw in ["0", "-1", "1.5", "abc", "3x"] {
            let err = ProductFilters::from_query(&query(&[("page", raw)])).unwrap_err();
            assert_eq!(err, FilterError::InvalidPage, "page={raw}");
        }
    }

    #[test]
    fn invalid_limit_values_are_rejected() {
        for raw in ["0", "-10", "ten"] {
            let err = ProductFilters::from_query(&query(&[("limit", raw)])).unwrap_err();
            assert_eq!(err, FilterError::InvalidLimit, "limit={raw}");
        }
    }

    #[test]
    fn empty_page_is_treated_as_absent() {
        let filters = ProductFilters::from_query(&query(&[("page", ""), ("limit", "5")]))
            .expect("filters");
        assert!(filters.pagination.is_none());
    }

    #[test]
    fn enum_filters_are_upper_cased() {
        let filters =
            ProductFilters::from_query(&query(&[("gender", "female"), ("type", "Footwear")]))
                .expect("filters");
        assert_eq!(filters.gender, Some(ProductGender::Female));
        assert_eq!(filters.product_type, Some(ProductType::Footwear));
    }

    #[test]
    fn unknown_enum_values_are_dropped_not_rejected() {
        let filters = ProductFilters::from_query(&query(&[
            ("gender", "invalid_value"),
            ("type", "spaceship"),
            ("brand", "Acme"),
        ]))
        .expect("unknown enums must not fail the request");
        assert_eq!(filters.gender, None);
        assert_eq!(filters.product_type, None);
        assert_eq!(filters.brand.as_deref(), Some("Acme"));
    }

    #[test]
    fn prompt_delivery_parses_literals_and_drops_the_rest() {
        let yes = ProductFilters::from_query(&query(&[("promptDelivery", "TRUE")])).expect("ok");
        assert_eq!(yes.prompt_delivery, Some(true));
        let no = ProductFilters::from_query(&query(&[("promptDelivery", "false")])).expect("ok");
        assert_eq!(no.prompt_delivery, Some(false));
        let junk = ProductFilters::from_query(&query(&[("promptDelivery", "1")])).expect("ok");
        assert_eq!(junk.prompt_delivery, None);
    }

    #[test]
    fn brand_and_category_are_matched_verbatim() {
        let filters =
            ProductFilters::from_query(&query(&[("brand", "Acme Co"), ("category", "T-Shirts")]))
                .expect("filters");
        assert_eq!(filters.brand.as_deref(), Some("Acme Co"));
        assert_eq!(filters.category.as_deref(), Some("T-Shirts"));
    }

    #[test]
    fn offset_saturates_instead_of_overflowing() {
        let pagination = Pagination {
            page: i64::MAX,
            limit: i64::MAX,
        };
        assert_eq!(pagination.offset(), i64::MAX);
    }
}
