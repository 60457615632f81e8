mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use odata_bridge::edm_catalog::{EdmSchemaConfig, SchemaCatalog};
use odata_bridge::requestor::{ProtocolAdapter, V2Adapter};
use serde_json::{Map, Value};

use config::ClientConfig;

/// One-shot OData client that speaks V4 to you and V2 to the service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Resource path to read, e.g. SalesOrderList or SalesOrderList('42')
    resource: String,

    /// Base URL of the legacy service
    #[arg(long, env = "ODATA_SERVICE_URL")]
    service_url: Option<String>,

    /// Path to the EDM schema YAML file
    #[arg(long, env = "ODATA_SCHEMA_FILE")]
    schema: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "ODATA_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Comma-separated $select paths
    #[arg(long)]
    select: Option<String>,

    /// $expand tree as JSON, e.g. '{"SO_2_BP": {"$select": ["CompanyName"]}}'
    #[arg(long)]
    expand: Option<String>,

    /// $filter relation, e.g. "GrossAmount gt 100"
    #[arg(long)]
    filter: Option<String>,

    /// Request an inline count
    #[arg(long)]
    count: bool,

    /// $orderby clause, passed through to the service
    #[arg(long)]
    orderby: Option<String>,

    /// Custom query parameter, repeatable
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Sort $expand/$select path lists for canonical URLs
    #[arg(long)]
    sort_expand_select: bool,
}

/// Assemble the V4 option map in a fixed order so the emitted V2 query
/// string is reproducible run to run.
fn build_options(cli: &Cli) -> anyhow::Result<Map<String, Value>> {
    let mut options = Map::new();
    if cli.count {
        options.insert("$count".to_string(), Value::Bool(true));
    }
    if let Some(filter) = &cli.filter {
        options.insert("$filter".to_string(), Value::String(filter.clone()));
    }
    if let Some(select) = &cli.select {
        options.insert("$select".to_string(), Value::String(select.clone()));
    }
    if let Some(expand) = &cli.expand {
        let tree: Value =
            serde_json::from_str(expand).context("--expand must be a JSON object")?;
        options.insert("$expand".to_string(), tree);
    }
    if let Some(orderby) = &cli.orderby {
        options.insert("$orderby".to_string(), Value::String(orderby.clone()));
    }
    for param in &cli.params {
        let (name, value) = param
            .split_once('=')
            .with_context(|| format!("--param expects NAME=VALUE, got `{}`", param))?;
        options.insert(name.to_string(), Value::String(value.to_string()));
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    config.merge_cli(cli.service_url.clone(), cli.schema.clone(), cli.timeout_secs)?;

    log::info!(
        "odq v{} reading {} from {}",
        env!("CARGO_PKG_VERSION"),
        cli.resource,
        config.service_url
    );

    let schema_config = EdmSchemaConfig::from_yaml_file(&config.schema_file)
        .with_context(|| format!("cannot load schema from {}", config.schema_file))?;
    let catalog = Arc::new(SchemaCatalog::new(schema_config.into_schema()?));
    let adapter = V2Adapter::new(Arc::clone(&catalog));
    adapter.ready().await?;

    let options = build_options(&cli)?;
    let mut query: Vec<(String, String)> = Vec::new();
    adapter.convert_system_query_options(
        &cli.resource,
        &options,
        &mut |name, value| query.push((name.to_string(), value.to_string())),
        false,
        cli.sort_expand_select,
    )?;

    let url = format!(
        "{}/{}",
        config.service_url.trim_end_matches('/'),
        cli.resource.trim_start_matches('/')
    );
    log::debug!("GET {} with {} query parameters", url, query.len());

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    let mut request = http.get(&url).query(&query);
    for (name, value) in adapter.request_headers() {
        request = request.header(*name, *value);
    }
    let request = request.header("X-Request-ID", uuid::Uuid::new_v4().to_string());

    let response = request.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let get_header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
    };
    adapter.check_version_header(&get_header, &cli.resource)?;

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("service answered {}: {}", status, body);
    }

    let body: Value = response.json().await?;
    let converted = adapter.convert_response(body)?;
    println!("{}", serde_json::to_string_pretty(&converted)?);
    Ok(())
}
