use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Display;

use roi_engine_core::catalog::CatalogData;
use roi_engine_core::RoiEngine;

/// Arguments for listing the profile catalog
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only list one section of the catalog
    #[arg(long, value_enum)]
    pub section: Option<CatalogSection>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CatalogSection {
    Companies,
    Industries,
    Projects,
}

pub fn run_catalog(engine: &RoiEngine, args: CatalogArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let catalog = engine.catalog();
    let value = match args.section {
        None => serde_json::to_value(CatalogData::from(catalog.clone()))?,
        Some(CatalogSection::Companies) => rows(catalog.company_sizes())?,
        Some(CatalogSection::Industries) => rows(catalog.industries())?,
        Some(CatalogSection::Projects) => rows(catalog.project_types())?,
    };
    Ok(value)
}

/// One object per profile with its id as the `id` field.
fn rows<'a, K, V, I>(entries: I) -> Result<Value, serde_json::Error>
where
    K: Display + 'a,
    V: Serialize + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut out = Vec::new();
    for (id, profile) in entries {
        let mut row = Map::new();
        row.insert("id".into(), Value::String(id.to_string()));
        if let Value::Object(fields) = serde_json::to_value(profile)? {
            row.extend(fields);
        }
        out.push(Value::Object(row));
    }
    Ok(Value::Array(out))
}
