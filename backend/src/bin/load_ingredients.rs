//! Load the ingredient catalog from a JSON file.
//!
//! The file holds an array of `{"name": ..., "measurement_unit": ...}`
//! objects. Pairs already in the catalog are skipped, so reruns are safe.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use recipe_backend::domain::{IngredientService, NewIngredient};
use recipe_backend::outbound::persistence::{DbPool, DieselIngredientRepository, PoolConfig};
use serde::Deserialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const DATABASE_URL_VAR: &str = "RECIPES_DATABASE_URL";

/// `load-ingredients` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-ingredients",
    about = "Insert missing ingredient name/unit pairs into the catalog",
    version
)]
struct CliArgs {
    /// Path to the JSON catalog file.
    #[arg(long = "file", value_name = "path")]
    file: PathBuf,
    /// Database connection URL. Falls back to `RECIPES_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    measurement_unit: String,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let raw = read_catalog(&args.file)?;
    let ingredients = parse_catalog(&raw)?;

    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let service = IngredientService::new(Arc::new(DieselIngredientRepository::new(pool)));

    let outcome = service
        .import(&ingredients)
        .await
        .map_err(|error| io::Error::other(format!("import failed: {error}")))?;

    println!("inserted={}", outcome.inserted);
    println!("skipped={}", outcome.skipped);
    Ok(())
}

fn read_catalog(path: &Path) -> io::Result<String> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "catalog path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open catalog directory '{}': {error}",
            parent.display()
        ))
    })?;
    directory
        .read_to_string(Path::new(file_name))
        .map_err(|error| io::Error::other(format!("read catalog '{}': {error}", path.display())))
}

fn parse_catalog(raw: &str) -> io::Result<Vec<NewIngredient>> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(raw).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("catalog is not a JSON array of ingredients: {error}"),
        )
    })?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            NewIngredient::new(entry.name, entry.measurement_unit).map_err(|error| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("entry {index}: {error}"),
                )
            })
        })
        .collect()
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    let value = match explicit {
        Some(value) => value,
        None => env::var(DATABASE_URL_VAR).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "database URL missing: set --database-url or RECIPES_DATABASE_URL",
            )
        })?,
    };
    if value.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL must not be empty",
        ));
    }
    Ok(value)
}
