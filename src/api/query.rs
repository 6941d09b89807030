// Query string parsing for the rows endpoint

use crate::db::{DbError, RowQuery};

/// First value of `key` in a URL query string, percent-decoded
pub fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    let query = query?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Build a [`RowQuery`] from `limit`, `q` and `since_id`
pub fn parse_row_query(query: Option<&str>) -> Result<RowQuery, DbError> {
    let limit = RowQuery::parse_limit(query_param(query, "limit").as_deref())?;
    Ok(RowQuery {
        limit,
        q: query_param(query, "q"),
        since_id: query_param(query, "since_id"),
    })
}
