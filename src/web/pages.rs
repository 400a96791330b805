//! HTML pages: the landing instructions and the per-spool selection page.

const HOME_PAGE: &str = include_str!("../../web/templates/home.html");
const SELECT_PAGE: &str = include_str!("../../web/templates/select.html");

const SPOOL_ID_PLACEHOLDER: &str = "{{SPOOL_ID}}";

/// Spool ids end up in upstream URLs and in the page's inline script, so
/// only a conservative character set is accepted.
pub fn is_valid_spool_id(spool_id: &str) -> bool {
    !spool_id.is_empty()
        && spool_id.len() <= 64
        && spool_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn home_page() -> &'static str {
    HOME_PAGE
}

/// Render the selection page. Callers must validate `spool_id` first.
pub fn select_page(spool_id: &str) -> String {
    SELECT_PAGE.replace(SPOOL_ID_PLACEHOLDER, spool_id)
}
