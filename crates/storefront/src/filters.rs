//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Pluralizes a review count, e.g. `128 reviews` or `1 review`.
///
/// Usage in templates: `{{ product.review_count|reviews }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn reviews(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let count = count.to_string();
    let noun = if count == "1" { "review" } else { "reviews" };
    Ok(format!("{count} {noun}"))
}
