//! Fallback selector profiles.
//!
//! A profile is a pair of CSS selector groups: one that finds headline
//! elements on a front page, one that finds the article body on an article
//! page. Profiles are keyed by host suffix (`chosun.com` matches
//! `www.chosun.com`); the longest matching key wins and unmatched hosts use
//! the generic default. Adding support for a new outlet means registering a
//! profile in the config file, not editing the scrapers.

use crate::config::ConfigError;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Generic headline selectors tried on sites without a dedicated profile.
pub const DEFAULT_HEADLINE_SELECTORS: &str =
    "h1 a, h2 a, h3 a, h1, h2, h3, article a, .headline a, .title a, .card a";

/// Generic article body selectors tried on sites without a dedicated profile.
pub const DEFAULT_CONTENT_SELECTORS: &str = "article, .article, .article-content, .story-content, \
     .news-content, .entry-content, .post-content";

/// Selector strings as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfileConfig {
    pub headlines: String,
    pub content: String,
}

/// A compiled profile.
#[derive(Debug, Clone)]
pub struct SelectorProfile {
    pub headlines: Selector,
    pub content: Selector,
}

impl SelectorProfile {
    fn compile(key: &str, config: &ProfileConfig) -> Result<Self, ConfigError> {
        let parse = |group: &str| {
            Selector::parse(group)
                .map_err(|e| ConfigError::Invalid(format!("selector profile `{key}`: {e}")))
        };
        Ok(Self {
            headlines: parse(&config.headlines)?,
            content: parse(&config.content)?,
        })
    }
}

fn builtin_profiles() -> Vec<(String, ProfileConfig)> {
    vec![(
        "chosun.com".to_string(),
        ProfileConfig {
            headlines: "h2.news_title a, .center-card h2 a, .news_list_item a".to_string(),
            content: ".article, #news_body_id".to_string(),
        },
    )]
}

/// Lookup table from host suffix to compiled profile.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    by_host: BTreeMap<String, SelectorProfile>,
    default: SelectorProfile,
}

impl ProfileTable {
    /// Compile the built-in profiles plus `extra`; an entry in `extra`
    /// replaces a built-in with the same key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if any selector group fails to parse.
    pub fn new(extra: &BTreeMap<String, ProfileConfig>) -> Result<Self, ConfigError> {
        let default = SelectorProfile::compile(
            "default",
            &ProfileConfig {
                headlines: DEFAULT_HEADLINE_SELECTORS.to_string(),
                content: DEFAULT_CONTENT_SELECTORS.to_string(),
            },
        )?;

        let mut by_host = BTreeMap::new();
        let configured = builtin_profiles()
            .into_iter()
            .chain(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        for (key, config) in configured {
            let key = key.trim_start_matches('.').to_ascii_lowercase();
            let profile = SelectorProfile::compile(&key, &config)?;
            by_host.insert(key, profile);
        }

        Ok(Self { by_host, default })
    }

    /// The profile for `url`'s host, or the default.
    pub fn for_url(&self, url: &Url) -> &SelectorProfile {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return &self.default;
        };
        let matched = self
            .by_host
            .iter()
            .filter(|(key, _)| host == **key || host.ends_with(&format!(".{key}")))
            .max_by_key(|(key, _)| key.len());

        match matched {
            Some((key, profile)) => {
                debug!(%host, profile = %key, "Using site selector profile");
                profile
            }
            None => &self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn matches(selector: &Selector, html: &str) -> usize {
        Html::parse_fragment(html).select(selector).count()
    }

    #[test]
    fn test_builtin_profile_matches_subdomain() {
        let table = ProfileTable::new(&BTreeMap::new()).unwrap();
        let profile = table.for_url(&url("https://www.chosun.com/politics/"));
        assert_eq!(matches(&profile.content, r#"<div id="news_body_id">x</div>"#), 1);
    }

    #[test]
    fn test_unknown_host_uses_default() {
        let table = ProfileTable::new(&BTreeMap::new()).unwrap();
        let profile = table.for_url(&url("https://www.lemonde.fr/"));
        assert_eq!(matches(&profile.content, "<article>x</article>"), 1);
        assert_eq!(matches(&profile.content, r#"<div id="news_body_id">x</div>"#), 0);
    }

    #[test]
    fn test_suffix_must_align_on_label() {
        let table = ProfileTable::new(&BTreeMap::new()).unwrap();
        // "notchosun.com" must not borrow the chosun.com profile
        let profile = table.for_url(&url("https://notchosun.com/"));
        assert_eq!(matches(&profile.content, r#"<div id="news_body_id">x</div>"#), 0);
    }

    #[test]
    fn test_configured_profile_overrides_and_longest_wins() {
        let mut extra = BTreeMap::new();
        extra.insert(
            "example.com".to_string(),
            ProfileConfig {
                headlines: ".lead a".to_string(),
                content: ".body".to_string(),
            },
        );
        extra.insert(
            "news.example.com".to_string(),
            ProfileConfig {
                headlines: ".top a".to_string(),
                content: ".story".to_string(),
            },
        );
        let table = ProfileTable::new(&extra).unwrap();

        let profile = table.for_url(&url("https://news.example.com/"));
        assert_eq!(matches(&profile.content, r#"<p class="story">x</p>"#), 1);
        let profile = table.for_url(&url("https://www.example.com/"));
        assert_eq!(matches(&profile.content, r#"<p class="body">x</p>"#), 1);
    }

    #[test]
    fn test_bad_selector_is_config_error() {
        let mut extra = BTreeMap::new();
        extra.insert(
            "broken.example".to_string(),
            ProfileConfig {
                headlines: "h2[".to_string(),
                content: "article".to_string(),
            },
        );
        let err = ProfileTable::new(&extra).unwrap_err();
        assert!(err.to_string().contains("broken.example"));
    }
}
