use std::{collections::BTreeSet, fs, io, path::Path};

use crate::{error::CatalogError, model::CityRecord};

/// Load the unique, sorted names of all cities in `country` from a
/// `city.list.json` style file.
pub fn load_city_names(path: &Path, country: &str) -> Result<Vec<String>, CatalogError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            CatalogError::NotFound { path: path.to_path_buf() }
        } else {
            CatalogError::Io { path: path.to_path_buf(), source }
        }
    })?;

    let records: Vec<CityRecord> = serde_json::from_str(&contents)
        .map_err(|source| CatalogError::Malformed { path: path.to_path_buf(), source })?;

    let names = city_names_in(records, country);
    tracing::info!(country, count = names.len(), path = %path.display(), "loaded city catalog");

    Ok(names)
}

fn city_names_in(records: Vec<CityRecord>, country: &str) -> Vec<String> {
    records
        .into_iter()
        .filter(|r| r.country.as_deref() == Some(country))
        .map(|r| r.name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
