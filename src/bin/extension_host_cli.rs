//! extension-host: 扩展目录与放置查询的命令行工具
//!
//! Usage:
//!   extension-host list [<base-url>] [--config <file>]              Load extensions and print the layout
//!   extension-host placements <placement> [<base-url>] [--config <file>]
//!   extension-host version

use anyhow::{anyhow, Context};
use extension_host::{ExtensionLoader, ExtensionRuntimeContext, HostConfig, LoadReport, Placement};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "list" => cmd_list(&args[2..]).await,
        "placements" => cmd_placements(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("extension-host {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"extension-host - 扩展宿主命令行工具

USAGE:
    extension-host <COMMAND> [OPTIONS]

COMMANDS:
    list [<base-url>]                     Load the catalog and print components per placement
    placements <placement> [<base-url>]   Print components for one placement
    version                               Show version information
    help                                  Show this help message

OPTIONS:
    --config <file>                       YAML or JSON host configuration

ENVIRONMENT:
    EXTENSION_HOST_BASE_URL               Extension service base URL
    EXTENSION_HOST_SCRIPT_TIMEOUT_SECS    Per-script load bound (0 disables)
    EXTENSION_HOST_HTTP_TIMEOUT_SECS      HTTP timeout
    EXTENSION_HOST_PROXY_URL              Proxy for extension traffic
    RUST_LOG                              Log filter (default: info)"#
    );
}

/// Splits `--config <file>` out of `args`, returning the remaining positionals.
fn resolve_config(args: &[String]) -> anyhow::Result<(HostConfig, Vec<String>)> {
    let mut config_path = None;
    let mut positionals = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config_path = Some(iter.next().ok_or_else(|| anyhow!("--config needs a file path"))?);
        } else {
            positionals.push(arg.clone());
        }
    }

    let config = match config_path {
        Some(path) => HostConfig::from_file(path)
            .with_context(|| format!("failed to read configuration from {}", path))?,
        None => HostConfig::default(),
    };
    Ok((config.apply_env()?, positionals))
}

async fn boot(config: HostConfig, base_url: Option<&String>) -> anyhow::Result<(Arc<ExtensionRuntimeContext>, LoadReport)> {
    let config = match base_url {
        Some(url) => config.with_base_url(url.as_str()),
        None => config,
    };
    let context = Arc::new(ExtensionRuntimeContext::new());
    let loader = ExtensionLoader::builder()
        .config(config)
        .context(context.clone())
        .build()?;
    let report = loader.load_configured().await;
    print_report(&report);
    Ok((context, report))
}

fn print_report(report: &LoadReport) {
    if let Some(e) = &report.aborted {
        println!("No extensions available: {}", e);
        return;
    }
    println!(
        "Catalog: {} extension(s), {} with a manifest ({} ms)",
        report.catalog_size,
        report.outcomes.len(),
        report.elapsed.as_millis()
    );
    for outcome in &report.outcomes {
        println!(
            "  {:<24} {:<13} {}",
            outcome.extension_id,
            outcome.status.as_str(),
            outcome.script_url
        );
    }
    println!();
}

async fn cmd_list(args: &[String]) -> anyhow::Result<()> {
    let (config, positionals) = resolve_config(args)?;
    let (context, _) = boot(config, positionals.first()).await?;

    let registry = context.placement_registry();
    let layout = registry.layout();
    if layout.is_empty() {
        println!("No extension components declared.");
        return Ok(());
    }
    println!("{} extension(s) published", registry.len());
    for (placement, components) in layout {
        println!("[{}]", placement);
        for c in components {
            println!(
                "  {:<24} <{}> {}",
                c.plugin_id,
                c.tag_name,
                c.label.as_deref().unwrap_or("")
            );
        }
    }

    let defined = context.document().custom_elements().defined_names();
    if defined.is_empty() {
        println!("\nNo custom elements defined; nothing is mountable.");
    } else {
        println!("\nDefined elements: {}", defined.join(", "));
    }
    Ok(())
}

async fn cmd_placements(args: &[String]) -> anyhow::Result<()> {
    let (config, positionals) = resolve_config(args)?;
    let placement: Placement = positionals
        .first()
        .ok_or_else(|| anyhow!("missing <placement>"))?
        .parse()
        .map_err(|e: String| anyhow!(e))?;

    let (context, _) = boot(config, positionals.get(1)).await?;
    let components = context
        .placement_registry()
        .components_by_placement(placement);
    println!("[{}] {} component(s)", placement, components.len());
    for c in components {
        println!("  {:<24} <{}>", c.plugin_id, c.tag_name);
    }
    Ok(())
}
