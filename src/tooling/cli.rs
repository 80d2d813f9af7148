//! CLI Tooling
//!
//! `envwrap resolve` declares a signature on the command line and reports the
//! value each parameter would receive; `envwrap scan` lists the variables that
//! match a prefix.

use crate::args::{Arguments, CallArgs};
use crate::convert::{Annotation, Converter, TypeMap};
use crate::env::{scan_prefixed, EnvSource, ProcessEnv};
use crate::logging::LoggingConfig;
use crate::settings::SettingsLoader;
use crate::signature::{Param, Signature};
use crate::target::Function;
use crate::value::Value;
use crate::wrap::{envwrap, Origin, Resolution};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Envwrap CLI - environment overrides for parameter defaults
#[derive(Parser)]
#[command(name = "envwrap")]
#[command(about = "Resolve parameter values from defaults, environment and call site")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file path (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the effective value of every declared parameter
    Resolve {
        /// Environment variable prefix, e.g. FOO_
        #[arg(long)]
        prefix: String,
        /// Parameter spec: name[:type[|type...]][=default]
        #[arg(long = "param", value_name = "SPEC")]
        params: Vec<String>,
        /// Call-site keyword argument: name=value
        #[arg(long = "set", value_name = "NAME=VALUE")]
        sets: Vec<String>,
        /// Treat the first parameter as a receiver; guessed from its name when omitted
        #[arg(long)]
        is_method: Option<bool>,
        /// Converter for parameters with no type and no default (int, float, bool, str, literal)
        #[arg(long)]
        fallback: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List environment variables starting with a prefix
    Scan {
        /// Environment variable prefix, e.g. FOO_
        #[arg(long)]
        prefix: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

impl Cli {
    /// Logging configuration from the settings file and environment, with CLI flags on top.
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        let settings = SettingsLoader::load(self.config.as_deref())
            .context("Failed to load settings")?;
        let mut logging = settings.logging;
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        Ok(logging)
    }
}

/// Command execution context.
pub struct CliContext {
    source: Arc<dyn EnvSource>,
}

impl CliContext {
    /// Context reading the process environment.
    pub fn new() -> Self {
        Self::with_source(ProcessEnv)
    }

    pub fn with_source(source: impl EnvSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Resolve {
                prefix,
                params,
                sets,
                is_method,
                fallback,
                format,
            } => self.resolve(prefix, params, sets, *is_method, fallback.as_deref(), format),
            Commands::Scan { prefix, format } => self.scan(prefix, format),
        }
    }

    fn resolve(
        &self,
        prefix: &str,
        specs: &[String],
        sets: &[String],
        is_method: Option<bool>,
        fallback: Option<&str>,
        format: &str,
    ) -> Result<String> {
        let params = specs
            .iter()
            .map(|spec| parse_param_spec(spec))
            .collect::<Result<Vec<_>>>()?;

        let mut call = CallArgs::new();
        for set in sets {
            let (name, raw) = set
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid --set '{}' (expected NAME=VALUE)", set))?;
            call = call.kwarg(name.trim(), literal_or_text(raw));
        }

        let mut types = TypeMap::new();
        if let Some(name) = fallback {
            let converter = Converter::from_name(name)
                .ok_or_else(|| anyhow!("Unknown fallback converter '{}'", name))?;
            types = types.with_fallback(converter);
        }

        let wrapped = envwrap(prefix)
            .types(types)
            .is_method(is_method)
            .source(Arc::clone(&self.source))
            .wrap(Function::new(Signature::new(params), |args: Arguments| args))?;

        let report = wrapped.explain(&call)?;
        match format {
            "json" => Ok(serde_json::to_string_pretty(&resolution_json(&report))?),
            "text" => Ok(resolution_table(&report)),
            other => bail!("Invalid format '{}' (must be 'text' or 'json')", other),
        }
    }

    fn scan(&self, prefix: &str, format: &str) -> Result<String> {
        let found = scan_prefixed(self.source.as_ref(), prefix);
        match format {
            "json" => {
                let rows: Vec<_> = found
                    .iter()
                    .map(|(name, c)| json!({ "name": name, "variable": c.variable, "raw": c.raw }))
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            "text" => {
                if found.is_empty() {
                    return Ok(format!("No variables start with '{}'", prefix));
                }
                let mut table = Table::new();
                table.load_preset(UTF8_BORDERS_ONLY);
                table.set_header(vec!["Parameter", "Variable", "Raw value"]);
                for (name, c) in &found {
                    table.add_row(vec![name.clone(), c.variable.clone(), c.raw.clone()]);
                }
                Ok(table.to_string())
            }
            other => bail!("Invalid format '{}' (must be 'text' or 'json')", other),
        }
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `name[:type[|type...]][=default]`.
///
/// The default is converted with the declared types when one accepts it,
/// otherwise read as a literal, otherwise kept as text.
pub fn parse_param_spec(spec: &str) -> Result<Param> {
    let (head, default) = match spec.split_once('=') {
        Some((head, default)) => (head, Some(default)),
        None => (spec, None),
    };
    let (name, type_names) = match head.split_once(':') {
        Some((name, types)) => (name.trim(), Some(types)),
        None => (head.trim(), None),
    };
    if name.is_empty() {
        bail!("Parameter spec '{}' has no name", spec);
    }

    let annotation = match type_names {
        Some(names) => {
            let converters = names
                .split('|')
                .map(|n| {
                    Converter::from_name(n)
                        .ok_or_else(|| anyhow!("Unknown type '{}' in parameter spec '{}'", n, spec))
                })
                .collect::<Result<Vec<_>>>()?;
            Some(Annotation::union(converters))
        }
        None => None,
    };

    let mut param = Param::new(name);
    if let Some(raw) = default {
        let value = annotation
            .as_ref()
            .and_then(|a| a.convert(raw))
            .unwrap_or_else(|| literal_or_text(raw));
        param = param.default(value);
    }
    if let Some(annotation) = annotation {
        param = param.annotated(annotation);
    }
    Ok(param)
}

fn literal_or_text(raw: &str) -> Value {
    Converter::literal()
        .convert(raw)
        .unwrap_or_else(|_| Value::Str(raw.to_string()))
}

fn origin_label(origin: Option<&Origin>) -> String {
    match origin {
        Some(Origin::Default) => "default".to_string(),
        Some(Origin::Environment { variable }) => format!("env ({})", variable),
        Some(Origin::CallSite) => "call".to_string(),
        None => "unset".to_string(),
    }
}

fn resolution_table(report: &[Resolution]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Parameter", "Value", "Type", "Source"]);
    for row in report {
        let (value, type_name) = match &row.value {
            Some(v) => (v.to_string(), v.value_type().to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        let name = if row.eligible {
            row.name.clone()
        } else {
            format!("{} (receiver)", row.name)
        };
        table.add_row(vec![name, value, type_name, origin_label(row.origin.as_ref())]);
    }
    table.to_string()
}

fn resolution_json(report: &[Resolution]) -> serde_json::Value {
    let rows: Vec<_> = report
        .iter()
        .map(|row| {
            let variable = match &row.origin {
                Some(Origin::Environment { variable }) => Some(variable.clone()),
                _ => None,
            };
            let source = match &row.origin {
                Some(Origin::Default) => "default",
                Some(Origin::Environment { .. }) => "env",
                Some(Origin::CallSite) => "call",
                None => "unset",
            };
            json!({
                "name": row.name,
                "value": row.value,
                "type": row.value.as_ref().map(|v| v.value_type()),
                "source": source,
                "variable": variable,
                "eligible": row.eligible,
            })
        })
        .collect();
    json!({ "parameters": rows })
}
