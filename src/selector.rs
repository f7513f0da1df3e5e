//! Random country selection and expansion into a flat site list.
//!
//! This is the only stage whose faults are fatal to a run: an empty catalog,
//! a selected country missing from the catalog, or a site with an unparsable
//! URL all indicate a configuration problem rather than a transient one.

use crate::catalog::Catalog;
use crate::error::SelectionError;
use crate::models::Site;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};
use url::Url;

/// Pick `count` distinct countries from the catalog, uniformly at random.
///
/// If `count` covers the whole catalog every country is returned in catalog
/// order. Otherwise a Fisher–Yates shuffle is run over the country names,
/// stopping once `count` of them have been drawn.
///
/// # Errors
///
/// [`SelectionError::EmptyCatalog`] if there is nothing to select from.
pub fn select_countries(catalog: &Catalog, count: usize) -> Result<Vec<String>, SelectionError> {
    select_countries_with(catalog, count, &mut rand::rng())
}

/// [`select_countries`] with an explicit random source.
pub fn select_countries_with<R: Rng + ?Sized>(
    catalog: &Catalog,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, SelectionError> {
    if catalog.is_empty() {
        return Err(SelectionError::EmptyCatalog);
    }

    let mut countries: Vec<String> = catalog.countries().map(str::to_string).collect();
    if count >= countries.len() {
        return Ok(countries);
    }

    let (chosen, _) = countries.partial_shuffle(rng, count);
    let countries = chosen.to_vec();

    debug!(?countries, "Shuffled country selection");
    Ok(countries)
}

/// Expand selected countries into their sites, in selection order.
///
/// # Errors
///
/// - [`SelectionError::UnknownCountry`] for a name absent from the catalog
/// - [`SelectionError::InvalidSiteUrl`] for a site URL that does not parse
#[instrument(level = "debug", skip(catalog))]
pub fn expand_sites(catalog: &Catalog, countries: &[String]) -> Result<Vec<Site>, SelectionError> {
    let mut sites = Vec::new();
    for country in countries {
        let entries = catalog
            .sites(country)
            .ok_or_else(|| SelectionError::UnknownCountry(country.clone()))?;

        for entry in entries {
            let url = Url::parse(&entry.url).map_err(|e| SelectionError::InvalidSiteUrl {
                site: entry.name.clone(),
                url: entry.url.clone(),
                reason: e.to_string(),
            })?;
            sites.push(Site {
                country: country.clone(),
                name: entry.name.clone(),
                url,
            });
        }
    }
    Ok(sites)
}
