//! URL builders for the joke API.
//!
//! ```
//! use quip_fetch::JokeApi;
//!
//! let api = JokeApi::new("https://api.chucknorris.io").unwrap();
//! assert_eq!(api.random().as_str(), "https://api.chucknorris.io/jokes/random");
//! assert_eq!(
//!     api.search("round house").as_str(),
//!     "https://api.chucknorris.io/jokes/search?query=round+house"
//! );
//! ```

use url::{ParseError, Url};

pub use quip_common::DEFAULT_BASE_URL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JokeApi {
    base: Url,
    random: Url,
    categories: Url,
    search: Url,
}

impl JokeApi {
    /// Anchor the endpoints at `base`; a missing trailing slash is added so
    /// that paths nest under it.
    pub fn new(base: &str) -> Result<Self, ParseError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            random: base.join("jokes/random")?,
            categories: base.join("jokes/categories")?,
            search: base.join("jokes/search")?,
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// A random joke from any category.
    pub fn random(&self) -> Url {
        self.random.clone()
    }

    /// A random joke from `category`.
    pub fn random_in(&self, category: &str) -> Url {
        let mut url = self.random.clone();
        url.query_pairs_mut().append_pair("category", category);
        url
    }

    /// The list of known categories.
    pub fn categories(&self) -> Url {
        self.categories.clone()
    }

    /// Free-text search. The query is sent as given; length validation is
    /// left to the server.
    pub fn search(&self, query: &str) -> Url {
        let mut url = self.search.clone();
        url.query_pairs_mut().append_pair("query", query);
        url
    }
}

impl Default for JokeApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("default base URL parses")
    }
}
