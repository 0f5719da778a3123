mod admin;
mod curated;
mod feeds;
mod pages;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub use admin::health;
pub use curated::{create_curated, get_curated, update_curated};
pub use feeds::{adhoc_feed, curated_feed, page_feed};
pub use pages::{all_pages, get_page, recent};

/// Everything but RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Path-segment form of a page key, safe for URLs and headers.
fn encode_page(page: &str) -> String {
    utf8_percent_encode(page, PATH_SEGMENT).to_string()
}
