//! Output rendering for discovered resources

use crate::resource::{Resource, ResourceSet};
use anyhow::Result;
use clap::ValueEnum;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

const NAME_HEADER: &str = "NAME";
const ERROR_HEADER: &str = "ERROR";

/// Render a whole resource set
pub fn render_set(resources: &ResourceSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(resources.values())),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(resources)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(resources)?),
    }
}

/// Render one resource
pub fn render_one(resource: &Resource, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(std::iter::once(resource))),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(resource)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(resource)?),
    }
}

fn render_table<'a>(resources: impl Iterator<Item = &'a Resource> + Clone) -> String {
    let width = resources
        .clone()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(NAME_HEADER.len());

    let mut out = format!("{:<width$}  {}\n", NAME_HEADER, ERROR_HEADER, width = width);
    for resource in resources {
        let marker = if resource.is_error_variant { "yes" } else { "no" };
        out.push_str(&format!("{:<width$}  {}\n", resource.name, marker, width = width));
    }
    out
}
