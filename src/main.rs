mod cli;

use cmdforge::config;

use anyhow::{Context, Result};
use cf_av::{argv, Generator, OperationKind, ParameterSet};
use cf_docs::DocsClient;
use clap::Parser;
use cli::{Cli, Commands, DocsCommands};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cmdforge=trace,cf_av=trace,cf_docs=debug,cf_core=debug".to_string()
        } else {
            "cmdforge=info,cf_av=info,cf_docs=info,cf_core=warn".to_string()
        }
    });

    // stdout carries JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            operation,
            inputs,
            output,
            params,
            execute,
            timeout,
        } => {
            let kind: OperationKind = operation.parse()?;
            let params = collect_params(kind, inputs, output, &params)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(generate(cli.config.as_deref(), kind, params, execute, timeout))
        }
        Commands::Run { command, timeout } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run(cli.config.as_deref(), &command, timeout))
        }
        Commands::Docs { command } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(docs(cli.config.as_deref(), command))
        }
        Commands::Operations => list_operations(cli.config.as_deref()),
        Commands::CheckTools => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(check_tools(cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cmdforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Assemble a parameter set from the dedicated flags and `key=value` pairs.
fn collect_params(
    kind: OperationKind,
    inputs: Vec<String>,
    output: Option<String>,
    pairs: &[String],
) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();

    let input_key = if kind == OperationKind::Concat {
        "input_files"
    } else {
        "input_file"
    };
    if kind != OperationKind::Concat && inputs.len() > 1 {
        anyhow::bail!("{kind} takes a single --input");
    }
    for input in inputs {
        params.push(input_key, input);
    }
    if let Some(output) = output {
        params.insert("output_file", output);
    }

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got {pair:?}"))?;
        params.push(key.trim(), value);
    }

    Ok(params)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn generator(config_path: Option<&Path>, timeout: Option<u64>) -> Result<Generator> {
    let config = config::load_config_or_default(config_path)?;
    let generator = Generator::from_config(&config);
    Ok(match timeout {
        Some(secs) if secs > 0 => generator.with_timeout(Duration::from_secs(secs)),
        Some(_) => anyhow::bail!("--timeout must be positive"),
        None => generator,
    })
}

async fn generate(
    config_path: Option<&Path>,
    kind: OperationKind,
    params: ParameterSet,
    execute: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let generator = generator(config_path, timeout)?;
    let envelope = generator.generate(kind, &params, execute).await?;
    print_json(&envelope)?;

    if let Some(result) = &envelope.execution_result {
        if !result.is_success() {
            anyhow::bail!(
                "execution failed: {}",
                result.message.as_deref().unwrap_or("unknown error")
            );
        }
    }
    Ok(())
}

async fn run(config_path: Option<&Path>, command: &[String], timeout: Option<u64>) -> Result<()> {
    let generator = generator(config_path, timeout)?;

    // A single argument is a whole command line; several are already split.
    let line = match command {
        [line] => line.clone(),
        tokens => tokens
            .iter()
            .map(|t| argv::quote(t))
            .collect::<Vec<_>>()
            .join(" "),
    };

    let result = generator.run_command(&line).await?;
    print_json(&result)?;
    if !result.is_success() {
        anyhow::bail!(
            "execution failed: {}",
            result.message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

async fn docs(config_path: Option<&Path>, command: DocsCommands) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let client = DocsClient::new(&config.docs)?;

    match command {
        DocsCommands::Urls { category } => print_json(&client.urls(Some(category.as_str()))?),
        DocsCommands::Get { category, name } => {
            let text = client.get_service_documentation(&category, &name).await?;
            println!("{text}");
            Ok(())
        }
        DocsCommands::Fetch { url } => {
            let text = client.fetch_url(&url).await?;
            println!("{text}");
            Ok(())
        }
        DocsCommands::Search { term, category } => {
            let hits = client.search(&term, category.as_deref()).await?;
            if hits.is_empty() {
                tracing::info!("no results found for {term:?}");
            }
            print_json(&hits)
        }
    }
}

fn list_operations(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let catalog = cf_av::Catalog::from_config(&config.defaults);
    print_json(&catalog.contracts())
}

async fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let tools = cf_av::ToolRegistry::discover(&config.tools)
        .check_all()
        .await;
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable execution.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("✓ Configuration is valid");
            } else {
                println!("Configuration loaded with {} warning(s):", warnings.len());
                for w in &warnings {
                    println!("  ! {w}");
                }
            }
            print_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_summary(&cf_core::Config::default());
        }
    }

    Ok(())
}

fn print_summary(config: &cf_core::Config) {
    println!("  Timeout: {}s", config.execution.timeout_secs);
    println!(
        "  Defaults: crf {}, preset {}, audio {}, overlay {}",
        config.defaults.crf,
        config.defaults.preset,
        config.defaults.audio_format,
        config.defaults.overlay_position
    );
    println!("  Docs timeout: {}s", config.docs.request_timeout_secs);
}
