//! The site catalog: which news outlets belong to which country.
//!
//! The catalog is pure data. It is read from configuration at startup (or
//! falls back to [`Catalog::default`]) and never changes during a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One outlet as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteEntry {
    /// Display name, also written to the document store as the source.
    pub name: String,
    /// Front page URL, the entry point for headline extraction.
    pub url: String,
}

impl SiteEntry {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Mapping of country name to its outlets.
///
/// Backed by a `BTreeMap` so iteration order (and therefore site order when
/// every country is selected) is stable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, Vec<SiteEntry>>);

impl Catalog {
    pub fn new(countries: BTreeMap<String, Vec<SiteEntry>>) -> Self {
        Self(countries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Country names in catalog order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn sites(&self, country: &str) -> Option<&[SiteEntry]> {
        self.0.get(country).map(Vec::as_slice)
    }
}

impl FromIterator<(String, Vec<SiteEntry>)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Vec<SiteEntry>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let entries: [(&str, Vec<SiteEntry>); 15] = [
            (
                "South Korea",
                vec![
                    SiteEntry::new("Yonhap News", "https://www.yna.co.kr/"),
                    SiteEntry::new("Chosun Ilbo", "https://www.chosun.com/"),
                    SiteEntry::new("JoongAng Ilbo", "https://joongang.joins.com/"),
                    SiteEntry::new("KBS", "https://news.kbs.co.kr/"),
                    SiteEntry::new("MBC", "https://imnews.imbc.com/"),
                ],
            ),
            (
                "Japan",
                vec![
                    SiteEntry::new("Asahi Shimbun", "https://www.asahi.com/"),
                    SiteEntry::new("Yomiuri Shimbun", "https://www.yomiuri.co.jp/"),
                    SiteEntry::new("NHK", "https://www3.nhk.or.jp/news/"),
                    SiteEntry::new("Mainichi Shimbun", "https://mainichi.jp/"),
                ],
            ),
            (
                "China",
                vec![
                    SiteEntry::new("Xinhua", "http://www.xinhuanet.com/"),
                    SiteEntry::new("Global Times", "https://www.globaltimes.cn/"),
                    SiteEntry::new("CGTN", "https://www.cgtn.com/"),
                ],
            ),
            (
                "United States",
                vec![
                    SiteEntry::new("CNN", "https://www.cnn.com/"),
                    SiteEntry::new("New York Times", "https://www.nytimes.com/"),
                    SiteEntry::new("Washington Post", "https://www.washingtonpost.com/"),
                    SiteEntry::new("Fox News", "https://www.foxnews.com/"),
                    SiteEntry::new("CNBC", "https://www.cnbc.com/"),
                ],
            ),
            (
                "United Kingdom",
                vec![
                    SiteEntry::new("BBC", "https://www.bbc.com/news"),
                    SiteEntry::new("The Guardian", "https://www.theguardian.com/"),
                    SiteEntry::new("The Times", "https://www.thetimes.co.uk/"),
                    SiteEntry::new("Financial Times", "https://www.ft.com/"),
                ],
            ),
            (
                "France",
                vec![
                    SiteEntry::new("Le Monde", "https://www.lemonde.fr/"),
                    SiteEntry::new("Le Figaro", "https://www.lefigaro.fr/"),
                    SiteEntry::new("France 24", "https://www.france24.com/"),
                ],
            ),
            (
                "Germany",
                vec![
                    SiteEntry::new("Der Spiegel", "https://www.spiegel.de/"),
                    SiteEntry::new("Die Welt", "https://www.welt.de/"),
                    SiteEntry::new("Deutsche Welle", "https://www.dw.com/"),
                ],
            ),
            (
                "Russia",
                vec![
                    SiteEntry::new("Russia Today", "https://www.rt.com/"),
                    SiteEntry::new("Tass", "https://tass.com/"),
                    SiteEntry::new("Pravda", "https://www.pravda.ru/"),
                ],
            ),
            (
                "India",
                vec![
                    SiteEntry::new("The Times of India", "https://timesofindia.indiatimes.com/"),
                    SiteEntry::new("Hindustan Times", "https://www.hindustantimes.com/"),
                    SiteEntry::new("The Hindu", "https://www.thehindu.com/"),
                ],
            ),
            (
                "Brazil",
                vec![
                    SiteEntry::new("O Globo", "https://oglobo.globo.com/"),
                    SiteEntry::new("Folha de S.Paulo", "https://www.folha.uol.com.br/"),
                ],
            ),
            (
                "Australia",
                vec![
                    SiteEntry::new("The Sydney Morning Herald", "https://www.smh.com.au/"),
                    SiteEntry::new("The Australian", "https://www.theaustralian.com.au/"),
                    SiteEntry::new("ABC News", "https://www.abc.net.au/news/"),
                ],
            ),
            (
                "Canada",
                vec![
                    SiteEntry::new("CBC", "https://www.cbc.ca/news"),
                    SiteEntry::new("The Globe and Mail", "https://www.theglobeandmail.com/"),
                ],
            ),
            (
                "South Africa",
                vec![
                    SiteEntry::new("News24", "https://www.news24.com/"),
                    SiteEntry::new("Mail & Guardian", "https://mg.co.za/"),
                ],
            ),
            (
                "Egypt",
                vec![
                    SiteEntry::new("Al-Ahram", "http://english.ahram.org.eg/"),
                    SiteEntry::new("Egypt Independent", "https://egyptindependent.com/"),
                ],
            ),
            (
                "Mexico",
                vec![
                    SiteEntry::new("El Universal", "https://www.eluniversal.com.mx/"),
                    SiteEntry::new("Reforma", "https://www.reforma.com/"),
                ],
            ),
        ];

        entries
            .into_iter()
            .map(|(country, sites)| (country.to_string(), sites))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_default_catalog_has_fifteen_countries() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 15);
        assert!(catalog.sites("Japan").is_some());
        assert!(catalog.sites("Atlantis").is_none());
    }

    #[test]
    fn test_default_catalog_urls_are_absolute() {
        let catalog = Catalog::default();
        for country in catalog.countries() {
            for site in catalog.sites(country).unwrap() {
                let url = Url::parse(&site.url).unwrap();
                assert!(url.scheme() == "http" || url.scheme() == "https");
            }
        }
    }

    #[test]
    fn test_catalog_yaml_is_a_plain_map() {
        let yaml = r#"
Iceland:
  - name: RUV
    url: https://www.ruv.is/
"#;
        let catalog: Catalog = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.sites("Iceland").unwrap()[0].name, "RUV");
    }
}
