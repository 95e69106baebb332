//! Browse commands: environments, products, folders, search.

use dataramp_client::SearchIndex;

use crate::{api_error, make_client, CliError};

pub fn cmd_envs(api_base: Option<&str>, json: bool) -> Result<(), CliError> {
    let client = make_client(api_base);
    let envs = client.environments().map_err(api_error)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&envs).map_err(|e| CliError::general(e.to_string()))?
        );
        return Ok(());
    }

    if envs.is_empty() {
        eprintln!("No environments configured");
        return Ok(());
    }
    for env in envs {
        if env.buckets.is_empty() {
            println!("{}  {}", env.id, env.name);
        } else {
            println!("{}  {}  [{}]", env.id, env.name, env.buckets.join(", "));
        }
    }
    Ok(())
}

pub fn cmd_products(
    api_base: Option<&str>,
    env: &str,
    bucket: &str,
    json: bool,
) -> Result<(), CliError> {
    let client = make_client(api_base);
    let products = client.products(env, bucket).map_err(api_error)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&products)
                .map_err(|e| CliError::general(e.to_string()))?
        );
        return Ok(());
    }

    if products.is_empty() {
        eprintln!("No products in {}/{}", env, bucket);
        return Ok(());
    }
    for p in products {
        match (p.table_count, p.updated) {
            (Some(n), Some(ts)) => println!("{}  ({} tables, updated {})", p.name, n, ts),
            (Some(n), None) => println!("{}  ({} tables)", p.name, n),
            _ => println!("{}", p.name),
        }
    }
    Ok(())
}

pub fn cmd_folders(
    api_base: Option<&str>,
    env: &str,
    bucket: &str,
    product: &str,
    json: bool,
) -> Result<(), CliError> {
    let client = make_client(api_base);
    let tables = client.folders(env, bucket, product).map_err(api_error)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tables).map_err(|e| CliError::general(e.to_string()))?
        );
        return Ok(());
    }

    if tables.is_empty() {
        eprintln!("No tables under {}", product);
        return Ok(());
    }
    for t in tables {
        match (t.size, t.updated) {
            (Some(size), Some(ts)) => println!("{}  {}  {}", t.name, size, ts),
            (Some(size), None) => println!("{}  {}", t.name, size),
            _ => println!("{}", t.name),
        }
    }
    Ok(())
}

pub fn cmd_search(api_base: Option<&str>, env: &str, term: &str) -> Result<(), CliError> {
    let client = make_client(api_base);
    let index = SearchIndex::build(&client, env).map_err(api_error)?;
    let matches = index.lookup(term);

    if matches.is_empty() {
        eprintln!("No products matching '{}'", term);
        return Ok(());
    }
    for entry in matches {
        println!("{}", entry.label());
    }
    Ok(())
}
