use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use serde_json::Value;

use refdocs_core::config::{self, CONFIG_FILE_NAME, Environment, RefdocsConfig, ServiceDescriptor};
use refdocs_core::transform::{Annotator, build_servers};
use refdocs_core::GeneratedFile;
use refdocs_fetch::{AggregateReport, Aggregator, DocumentSource, HttpSource, StaticSource};
use refdocs_scalar::ScalarPage;

#[derive(Parser)]
#[command(
    name = "refdocs",
    about = "Aggregated OpenAPI reference builder",
    version
)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, annotate and render all service documents
    Build {
        /// Deployment environment: local, dev or prod
        #[arg(long, env = "REFDOCS_API_ENV")]
        env: Option<String>,

        /// Output directory (defaults to `output` from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read `<service>.json` files from this directory instead of fetching
        #[arg(long)]
        documents_dir: Option<PathBuf>,

        /// Page title
        #[arg(long, default_value = "API Reference")]
        title: String,
    },

    /// Annotate a local OpenAPI document and print it as JSON
    Annotate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Service name used as the client namespace
        #[arg(short, long)]
        service: String,

        /// API version segment of the server URLs
        #[arg(long, default_value = "v1")]
        api_version: String,

        /// Deployment environment: local, dev or prod
        #[arg(long, env = "REFDOCS_API_ENV")]
        env: Option<String>,
    },

    /// List configured services with their document and server URLs
    Services {
        /// Deployment environment: local, dev or prod
        #[arg(long, env = "REFDOCS_API_ENV")]
        env: Option<String>,
    },

    /// Initialize a new refdocs configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    match cli.command {
        Commands::Build {
            env,
            output,
            documents_dir,
            title,
        } => cmd_build(&config_path, env, output, documents_dir, title),

        Commands::Annotate {
            input,
            service,
            api_version,
            env,
        } => cmd_annotate(&config_path, input, service, api_version, env),

        Commands::Services { env } => cmd_services(&config_path, env),

        Commands::Init { force } => cmd_init(&config_path, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "refdocs", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<RefdocsConfig> {
    Ok(config::load_config(path)?.unwrap_or_default())
}

/// Resolve the environment before doing any work that depends on it.
fn resolve_environment(selector: Option<&str>, cfg: &RefdocsConfig) -> Result<Environment> {
    config::resolve_environment(selector, cfg).context("invalid environment selection")
}

fn read_document(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let document: Value = match ext {
        "yaml" | "yml" => serde_yaml_ng::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?,
    };
    Ok(document)
}

fn run_aggregate<S: DocumentSource>(
    services: Vec<ServiceDescriptor>,
    annotator: Annotator,
    source: S,
) -> Result<AggregateReport> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let aggregator = Aggregator::new(services, annotator, source);
    let report = runtime.block_on(aggregator.aggregate())?;
    Ok(report)
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

fn cmd_build(
    config_path: &Path,
    env: Option<String>,
    output: Option<PathBuf>,
    documents_dir: Option<PathBuf>,
    title: String,
) -> Result<()> {
    let cfg = load_config(config_path)?;
    let env = resolve_environment(env.as_deref(), &cfg)?;
    let output_dir = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let annotator = Annotator::from_config(env, &cfg);

    let report = match documents_dir {
        Some(dir) => {
            eprintln!(
                "Loading {} API documents from {} ({env})",
                cfg.services.len(),
                dir.display()
            );
            let source = StaticSource::from_dir(&dir, &cfg.services);
            run_aggregate(cfg.services.clone(), annotator, source)
        }
        None => {
            let base_url = cfg.base_urls.get(env);
            eprintln!(
                "Fetching {} API documents from {base_url} ({env})",
                cfg.services.len()
            );
            let timeout = cfg.fetch.timeout_secs.map(Duration::from_secs);
            let source = HttpSource::new(base_url, timeout)?;
            run_aggregate(cfg.services.clone(), annotator, source)
        }
    }
    .context("no API documentation could be loaded")?;

    for failure in &report.failures {
        eprintln!(
            "  warning: skipped {} ({}): {}",
            failure.service.title, failure.service.service, failure.error
        );
    }

    let page = ScalarPage::new(title, cfg.renderer.clone());
    let files = page.emit(&report.documents)?;

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    write_files(&output_dir, &files)?;

    eprintln!(
        "Rendered {} of {} APIs into {}",
        report.documents.len(),
        cfg.services.len(),
        output_dir.display()
    );
    Ok(())
}

fn cmd_annotate(
    config_path: &Path,
    input: PathBuf,
    service: String,
    api_version: String,
    env: Option<String>,
) -> Result<()> {
    let cfg = load_config(config_path)?;
    let env = resolve_environment(env.as_deref(), &cfg)?;

    let descriptor = cfg
        .services
        .iter()
        .find(|s| s.service == service && s.version == api_version)
        .cloned()
        .unwrap_or_else(|| ServiceDescriptor::new(&service, &service, &api_version));

    let mut document = read_document(&input)?;
    Annotator::from_config(env, &cfg).annotate(&mut document, &descriptor);

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn cmd_services(config_path: &Path, env: Option<String>) -> Result<()> {
    let cfg = load_config(config_path)?;
    let env = resolve_environment(env.as_deref(), &cfg)?;
    let base_url = cfg.base_urls.get(env);

    for service in &cfg.services {
        println!("{} ({})", service.title, service.service);
        println!("  document: {}", service.document_url(base_url));
        for server in build_servers(&service.path_prefix(), env, &cfg.base_urls) {
            println!("  server:   {} [{}]", server.url, server.description);
        }
    }
    Ok(())
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
