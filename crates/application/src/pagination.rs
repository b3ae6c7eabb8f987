//! Connection page URL resolution

use graphlink_domain::Page;

use crate::query::set_query_param;

const AFTER_PARAM: &str = "after";
const BEFORE_PARAM: &str = "before";

/// Direction of travel through a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the `next` page / `after` cursor
    Next,
    /// Toward the `previous` page / `before` cursor
    Previous,
}

/// URL of the page after `page`, if there is one.
#[must_use]
pub fn next_url<T>(page: &Page<T>) -> Option<String> {
    resolve(page, Direction::Next)
}

/// URL of the page before `page`, if there is one.
#[must_use]
pub fn previous_url<T>(page: &Page<T>) -> Option<String> {
    resolve(page, Direction::Previous)
}

/// Resolves the URL of the adjacent page in `direction`.
///
/// An explicit URL in the paging metadata wins. Otherwise the cursor for
/// that direction is set on the page's origin URL. Returned URLs always
/// use `https`.
#[must_use]
pub fn resolve<T>(page: &Page<T>, direction: Direction) -> Option<String> {
    let paging = page.paging.as_ref()?;
    let (explicit, cursor, param) = match direction {
        Direction::Next => (paging.next.as_deref(), paging.after_cursor(), AFTER_PARAM),
        Direction::Previous => (
            paging.previous.as_deref(),
            paging.before_cursor(),
            BEFORE_PARAM,
        ),
    };

    let url = match (non_blank(explicit), non_blank(cursor)) {
        (Some(url), _) => url.to_string(),
        (None, Some(cursor)) => set_query_param(page.origin_url()?, param, cursor),
        (None, None) => return None,
    };

    Some(force_https(url))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn force_https(url: String) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url,
    }
}
