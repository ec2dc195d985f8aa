use std::fs;
use std::io::Write;

use colored::Colorize;
use harbor_dockergen::models::GenerationRequest;

use crate::cli::GenerateArgs;
use crate::client::ApiClient;
use crate::error::{ClientError, Result};

/// Split a comma-separated dependency list, dropping blank items.
pub fn parse_dependencies(raw: &str) -> Option<Vec<String>> {
    let deps: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();
    if deps.is_empty() {
        None
    } else {
        Some(deps)
    }
}

pub fn build_request(args: &GenerateArgs) -> GenerationRequest {
    GenerationRequest {
        language: args.language.clone(),
        version: args.lang_version.clone(),
        dependencies: args.deps.as_deref().and_then(parse_dependencies),
        port: args.port,
        app_type: args.app_type.clone(),
        additional_instructions: args.instructions.clone(),
    }
}

/// Request a Dockerfile and write it to `--output` or `out`.
///
/// `quiet` drops the confirmation line printed after writing a file.
pub fn handle_generate(client: &ApiClient, args: &GenerateArgs, quiet: bool, out: &mut impl Write) -> Result<()> {
    let request = build_request(args);

    log::info!("Starting Dockerfile generation...");
    log::info!("  Language: {}", request.language);
    if let Some(version) = &request.version {
        log::info!("  Version: {}", version);
    }
    if let Some(deps) = &request.dependencies {
        log::info!("  Dependencies: {}", deps.join(", "));
    }
    if let Some(port) = request.port {
        log::info!("  Port: {}", port);
    }
    if let Some(app_type) = &request.app_type {
        log::info!("  App Type: {}", app_type);
    }
    if let Some(instructions) = &request.additional_instructions {
        log::info!("  Instructions: {}", instructions);
    }

    let response = client.generate(&request)?;
    log::info!(
        "Base image {} resolved to {}",
        response.base_image.generic,
        response.base_image.harbor_path
    );

    match &args.output {
        Some(path) => {
            fs::write(path, &response.dockerfile_content)?;
            if !quiet {
                eprintln!("{} {}", "✅ Wrote Dockerfile to".green(), path.display());
            }
        }
        None => {
            writeln!(out, "{}", response.dockerfile_content)?;
        }
    }
    Ok(())
}

pub fn handle_check_server(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    let health = client.health()?;
    if health.status != "healthy" {
        return Err(ClientError::UnexpectedResponse(format!(
            "server at {} reported status '{}'",
            client.base_url(),
            health.status
        )));
    }

    writeln!(
        out,
        "Server at {} is {} (configuration: {})",
        client.base_url(),
        health.status,
        health.configuration
    )?;
    if health.configuration != "loaded" {
        log::warn!("Server configuration is unavailable; generation requests will fail until it is fixed.");
    }
    Ok(())
}
