//! OpenAPI to TOSCA CLI
//!
//! Command-line interface for converting Swagger 2.0 and OpenAPI 3.x
//! documents into TOSCA profiles.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use oas2tosca_common::ConvertError;
use oas2tosca_generator::ProfileGenerator;
use oas2tosca_parser::{Conversion, Converter, ConverterConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "OAS2TOSCA_LOG";

#[derive(Parser)]
#[command(name = "oas2tosca")]
#[command(version, about = "Generate TOSCA profiles from OpenAPI documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (overrides OAS2TOSCA_LOG)
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document and write one directory per profile
    #[command(after_help = "EXAMPLES:\n  \
        # Convert the Kubernetes API\n  \
        oas2tosca convert --input swagger.json --output ./profiles\n\n  \
        # Keep only v2 schemas\n  \
        oas2tosca convert --input openapi.yaml --output ./profiles --supported-version v2")]
    Convert {
        /// Path to the Swagger/OpenAPI document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./profiles")]
        output: PathBuf,

        /// Schemas with any other version tag are ignored
        #[arg(long, default_value = "v1")]
        supported_version: String,
    },

    /// Convert a document and show the resulting profiles without writing them
    Inspect {
        /// Path to the Swagger/OpenAPI document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,

        /// Schemas with any other version tag are ignored
        #[arg(long, default_value = "v1")]
        supported_version: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            supported_version,
        } => convert_command(
            input.as_path(),
            output.as_path(),
            &supported_version,
            cli.verbose,
        ),
        Commands::Inspect {
            input,
            supported_version,
        } => inspect_command(input.as_path(), &supported_version, cli.verbose),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Process exit code for a failed run
fn exit_code(error: &anyhow::Error) -> u8 {
    let cause = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ConvertError>());

    match cause {
        Some(ConvertError::Parse(_))
        | Some(ConvertError::Io(_))
        | Some(ConvertError::Json(_))
        | Some(ConvertError::Yaml(_)) => 1,
        Some(ConvertError::UnsupportedVersion(_)) => 2,
        Some(ConvertError::MissingVersion) => 3,
        _ => 4,
    }
}

fn load(input: &Path, supported_version: &str) -> Result<Converter> {
    println!("{} Reading document: {}", "→".cyan(), input.display());

    let config = ConverterConfig::default().with_supported_version(supported_version);
    tracing::debug!(?config, "Converter configuration");
    let converter = Converter::from_file(input, config)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    println!(
        "{} Detected {} document",
        "→".cyan(),
        converter.version_label().yellow()
    );
    Ok(converter)
}

fn convert_command(
    input: &Path,
    output: &Path,
    supported_version: &str,
    verbose: bool,
) -> Result<()> {
    let converter = load(input, supported_version)?;

    if verbose {
        println!("  Supported version: {}", supported_version);
        println!("  Output: {}", output.display());
    }

    println!("{} Converting schemas...", "→".cyan());
    let conversion = converter.convert().context("Conversion failed")?;
    report_skipped(&conversion, verbose);

    println!("{} Writing profiles...", "→".cyan());
    let source = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let mut generator = ProfileGenerator::new(output)
        .context("Failed to load templates")?
        .with_source(source);
    let written = conversion
        .write_to(&mut generator)
        .context("Failed to write profiles")?;

    println!("\n{}", "✓ Conversion complete!".green().bold());
    println!("  Profiles: {}", written.to_string().yellow());
    println!("  Node types: {}", conversion.node_type_count());
    println!("  Data types: {}", conversion.data_type_count());

    if verbose {
        println!("\n{}", "Generated files:".bold());
        for profile in conversion.profiles.values() {
            let dir = generator.profile_dir(profile)?;
            println!("  📄 {}", dir.join("profile.yaml").display());
        }
    }

    Ok(())
}

fn inspect_command(input: &Path, supported_version: &str, verbose: bool) -> Result<()> {
    let converter = load(input, supported_version)?;
    let conversion = converter.convert().context("Conversion failed")?;

    println!("\n{}", "Profiles:".bold());
    for profile in conversion.profiles.values() {
        println!(
            "  • {} (prefix {}, {} node types, {} data types)",
            profile.name.cyan(),
            profile.prefix,
            profile.node_types.len(),
            profile.data_types.len()
        );
        for (namespace, prefix) in &profile.dependencies {
            println!("    imports {} as {}", namespace, prefix.yellow());
        }
        if verbose {
            for record in &profile.node_types {
                println!("    node type {}", record.name);
            }
            for record in &profile.data_types {
                println!("    data type {}", record.name);
            }
        }
    }

    if !conversion.unhandled_keywords.is_empty() {
        let keywords: Vec<&str> = conversion
            .unhandled_keywords
            .iter()
            .map(String::as_str)
            .collect();
        println!("\n{} {}", "Unhandled keywords:".bold(), keywords.join(", "));
    }
    report_skipped(&conversion, verbose);

    Ok(())
}

fn report_skipped(conversion: &Conversion, verbose: bool) {
    if conversion.skipped.is_empty() {
        return;
    }
    println!(
        "{} {} schemas skipped",
        "⚠".yellow(),
        conversion.skipped.len()
    );
    if verbose {
        for (name, reason) in &conversion.skipped {
            println!("    {}: {}", name, reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_arguments() {
        let cli = Cli::try_parse_from([
            "oas2tosca", "-d", "convert", "--input", "swagger.json", "--output", "out",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Convert {
                input,
                output,
                supported_version,
            } => {
                assert_eq!(input, PathBuf::from("swagger.json"));
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(supported_version, "v1");
            }
            Commands::Inspect { .. } => panic!("expected convert"),
        }
    }

    #[test]
    fn test_exit_codes() {
        let error = anyhow::Error::new(ConvertError::UnsupportedVersion("1.2".to_string()))
            .context("Failed to load swagger.json");
        assert_eq!(exit_code(&error), 2);

        let error = anyhow::Error::new(ConvertError::MissingVersion);
        assert_eq!(exit_code(&error), 3);

        let error = anyhow::Error::new(ConvertError::Parse("bad".to_string()));
        assert_eq!(exit_code(&error), 1);

        let error = anyhow::Error::new(ConvertError::MissingInfo);
        assert_eq!(exit_code(&error), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 4);
    }
}
