//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `relmap_core` linkage and print the resolved type catalog.
//! - Accept an optional JSON settings path as the first argument.

use log::info;
use relmap_core::model::sql_types::type_code_name;
use relmap_core::{TypeConfiguration, TypeSettings};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("relmap_core ping={}", relmap_core::ping());
    println!("relmap_core version={}", relmap_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings_path: Option<String>) -> Result<(), String> {
    let settings = match settings_path.as_deref() {
        Some(path) => TypeSettings::load(path).map_err(|err| format!("{path}: {err}"))?,
        None => TypeSettings::default(),
    };
    if settings.apply_logging().map_err(|err| err.to_string())? {
        info!("event=cli_start module=cli status=ok");
    }

    let configuration = TypeConfiguration::from_settings(&settings).map_err(|err| err.to_string())?;
    let registry = configuration.basic_type_registry();
    println!("basic_types={}", registry.len());
    for name in registry.names() {
        let representation = registry
            .representation_of(&name)
            .map(|representation| representation.name())
            .unwrap_or("?");
        println!("  {name} -> {representation}");
    }

    println!("jdbc_types={}", configuration.jdbc_type_registry().len());
    for code in configuration.jdbc_type_registry().codes() {
        let label = configuration
            .jdbc_type_registry()
            .descriptor(code)
            .map(|descriptor| descriptor.name.to_string())
            .or_else(|| type_code_name(code).map(str::to_string))
            .unwrap_or_default();
        println!("  {code} {label}");
    }
    Ok(())
}
