//! Deep-link addressing: a page address optionally carries a `locationId`
//! query parameter selecting single-location mode, and a successful share
//! produces an address of the same shape pointing at the new record.

use reqwest::Url;

/// Query parameter naming the deep-linked record.
pub const LOCATION_ID_PARAM: &str = "locationId";

/// Extracts the optional location identifier from a page address.
///
/// Pure and infallible: a missing parameter, an empty value, or an address
/// that does not parse all yield `None`.
pub fn location_id_from_url(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == LOCATION_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Builds the shareable address for a record id: the page's base address
/// with its query replaced by `locationId=<id>`.
pub fn share_link(page_url: &Url, id: &str) -> Url {
    let mut link = page_url.clone();
    link.set_fragment(None);
    link.query_pairs_mut().clear().append_pair(LOCATION_ID_PARAM, id);
    link
}
