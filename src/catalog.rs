use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;

use crate::error::FilterError;
use crate::models::SearchResponse;

const EVENTS: [&str; 2] = ["Catalog", "Events"];
const AUTOCOMPLETE: [&str; 2] = ["Catalog", "Autocomplete"];
const AUTOCOMPLETE_CATALOGS: [&str; 4] = ["event", "performer", "venue", "category"];
const LOOKUP_PER_PAGE: u32 = 10;

/// Anything that can hand out numbered pages of search results.
pub trait PageSource {
    fn fetch_page(&mut self, page: u32, per_page: u32) -> Result<SearchResponse, FilterError>;
}

pub fn default_base_url(env: &str) -> String {
    format!("https://{}.tflapis.com", env.trim())
}

/// Blocking client for the catalog endpoints.
pub struct CatalogClient {
    client: Client,
    base: Url,
    token: String,
}

impl CatalogClient {
    /// A `timeout` of `None` lets requests wait indefinitely.
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, FilterError> {
        let base = Url::parse(base_url.trim())
            .map_err(|err| FilterError::usage(format!("invalid base URL {base_url:?}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(FilterError::usage(format!(
                "invalid base URL {base_url:?}: not a hierarchical URL"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("event-filter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FilterError::Transport)?;

        Ok(Self {
            client,
            base,
            token: token.to_string(),
        })
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn events_url(&self, search: &str, page: u32, per_page: u32) -> Url {
        let mut url = self.endpoint(EVENTS);
        url.query_pairs_mut()
            .append_pair("query", search)
            .append_pair("page", &page.to_string())
            .append_pair("perPage", &per_page.to_string());
        url
    }

    pub fn tickets_url(&self, event_id: &str) -> Url {
        self.endpoint(["Catalog", "Events", event_id, "Tickets"])
    }

    pub fn autocomplete_url(&self, search: &str) -> Url {
        let mut url = self.endpoint(AUTOCOMPLETE);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("searchText", search);
            for catalog in AUTOCOMPLETE_CATALOGS {
                query.append_pair("catalogs", catalog);
            }
        }
        url
    }

    /// GETs `url` and returns the body of a 2xx response.
    fn get_text(&self, url: Url) -> Result<String, FilterError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(FilterError::Transport)?;
        let status = response.status();
        let body = response.text().map_err(FilterError::Transport)?;

        if !status.is_success() {
            return Err(FilterError::Upstream {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(body)
    }

    fn get_json(&self, url: Url) -> Result<Value, FilterError> {
        let body = self.get_text(url)?;
        serde_json::from_str(&body).map_err(|err| FilterError::malformed(err, &body))
    }

    pub fn search_page(
        &self,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchResponse, FilterError> {
        let body = self.get_text(self.events_url(search, page, per_page))?;
        SearchResponse::from_body(&body)
    }

    /// Paged view of one search, for the pagination loop.
    pub fn search<'a>(&'a self, search: &'a str) -> EventSearch<'a> {
        EventSearch {
            client: self,
            search,
        }
    }

    /// First page of a search, untouched.
    pub fn events(&self, search: &str) -> Result<Value, FilterError> {
        self.get_json(self.events_url(search, 1, LOOKUP_PER_PAGE))
    }

    pub fn tickets(&self, event_id: &str) -> Result<Value, FilterError> {
        self.get_json(self.tickets_url(event_id))
    }

    pub fn autocomplete(&self, search: &str) -> Result<Value, FilterError> {
        self.get_json(self.autocomplete_url(search))
    }
}

pub struct EventSearch<'a> {
    client: &'a CatalogClient,
    search: &'a str,
}

impl PageSource for EventSearch<'_> {
    fn fetch_page(&mut self, page: u32, per_page: u32) -> Result<SearchResponse, FilterError> {
        self.client.search_page(self.search, page, per_page)
    }
}
