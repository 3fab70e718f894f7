//! Search query construction for the NZBIndex RSS endpoint


/// Sort order understood by the RSS endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest posts first
    AgeDesc,
}

impl SortOrder {
    fn as_param(self) -> &'static str {
        match self {
            SortOrder::AgeDesc => "agedesc",
        }
    }
}

/// Immutable description of one outbound search
///
/// Built fresh for every search and rendered with [`SearchQuery::to_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    max_results: u32,
    min_size: u32,
    hide_spam: bool,
    complete_only: bool,
    nzb_link: bool,
    sort: Option<SortOrder>,
}

impl SearchQuery {
    /// Create a query for `text`, wrapping it in double quotes when `quoted`
    ///
    /// # Example
    /// ```
    /// use nzbindex_core::query::SearchQuery;
    ///
    /// let query = SearchQuery::new("Show.Name.S01E02", true);
    /// assert_eq!(query.text(), "\"Show.Name.S01E02\"");
    /// ```
    pub fn new(text: &str, quoted: bool) -> Self {
        let text = if quoted {
            format!("\"{}\"", text)
        } else {
            text.to_string()
        };

        Self {
            text,
            max_results: 200,
            min_size: 100,
            hide_spam: true,
            complete_only: true,
            nzb_link: true,
            sort: None,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Render the full RSS search URL below `base_url`
    ///
    /// # Example
    /// ```
    /// use nzbindex_core::query::SearchQuery;
    ///
    /// let url = SearchQuery::new("lost", false).to_url("http://nzbindex.nl/");
    /// assert_eq!(
    ///     url,
    ///     "http://nzbindex.nl/rss/?q=lost&max=200&hidespam=1&complete=1&minsize=100&nzblink=1"
    /// );
    /// ```
    pub fn to_url(&self, base_url: &str) -> String {
        let mut url = format!(
            "{}/rss/?q={}&max={}&hidespam={}&complete={}&minsize={}&nzblink={}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.text),
            self.max_results,
            flag(self.hide_spam),
            flag(self.complete_only),
            self.min_size,
            flag(self.nzb_link),
        );

        if let Some(sort) = self.sort {
            url.push_str(&format!("&sort={}", sort.as_param()));
        }

        url
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}
