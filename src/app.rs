use std::collections::HashMap;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::form::{CountPolicy, CONTAINER_ID, COUNT_FIELD_ID};
use crate::output::{self, OutputFormat};
use crate::runner::{Options, Runner, ValuesSource};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn tag_line(tag: &str, message: &str) -> String {
    let tag = match tag {
        "ERR" => tag.bold().red(),
        "WRN" => tag.bold().yellow(),
        _ => tag.bold().green(),
    };
    format!("{}{}{} {}", "[".bold().white(), tag, "]".bold().white(), message)
}

/// Formats a failure the way the CLI reports it on stderr.
pub fn error_line(message: &str) -> String {
    tag_line("ERR", message)
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn ignored_value_message(name: &str) -> String {
    if name == COUNT_FIELD_ID {
        format!("'{name}' in values ignored, the count comes from --count or the config")
    } else {
        format!("no input named '{name}', value ignored")
    }
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');
    if let Some(long_about) = cmd.get_long_about().or(cmd.get_about()) {
        out.push_str(&long_about.to_string());
        out.push('\n');
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS]\n\n", cmd.get_name()));

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();
    for arg in cmd.get_arguments().filter(|a| !a.is_hide_set()) {
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = *section_idx.entry(heading.clone()).or_insert_with(|| {
            sections.push((heading, Vec::new()));
            sections.len() - 1
        });
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&format!("{heading}:\n"));
        for arg in args {
            let mut parts: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                parts.push(format!("-{short}"));
            }
            if let Some(aliases) = arg.get_visible_aliases() {
                parts.extend(aliases.into_iter().map(|a| format!("--{a}")));
            }
            if let Some(long) = arg.get_long() {
                let rendered = format!("--{long}");
                if !parts.contains(&rendered) {
                    parts.push(rendered);
                }
            }
            let mut flags = parts.join(", ");
            if arg.get_action().takes_values() {
                if let Some(names) = arg.get_value_names() {
                    for name in names {
                        flags.push_str(&format!(" <{name}>"));
                    }
                }
            }
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            out.push_str(&format!("  {flags:<34} {help}\n"));
        }
        out.push('\n');
    }
    out
}

#[derive(Clone, Debug)]
struct RunConfig {
    count: String,
    policy: CountPolicy,
    max_records: usize,
    values: Option<String>,
    output: Option<String>,
    output_format: OutputFormat,
    page: bool,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let count = args.count.or(cfg.count).unwrap_or_else(|| "0".to_string());

    let policy = if args.strict {
        CountPolicy::Strict
    } else {
        match cfg.count_policy.as_deref() {
            Some(raw) => CountPolicy::parse(raw).ok_or_else(|| {
                format!("invalid count_policy '{raw}', expected lenient or strict")
            })?,
            None => CountPolicy::Lenient,
        }
    };

    let max_records = args
        .max_records
        .or(cfg.max_records)
        .unwrap_or(crate::form::DEFAULT_MAX_RECORDS);
    if max_records == 0 {
        return Err("invalid max-records, expected positive integer".to_string());
    }

    let values = args
        .values
        .or(cfg.values)
        .map(|p| config::expand_tilde_string(&p));
    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let page = args.page || cfg.page.unwrap_or(false);

    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected html, json or text"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Html),
    };
    if page && output_format != OutputFormat::Html {
        return Err("--page only supports the html output format".to_string());
    }

    Ok(RunConfig {
        count,
        policy,
        max_records,
        values,
        output,
        output_format,
        page,
        no_color,
    })
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let runner = Runner::new(Options {
        count: run.count.clone(),
        policy: run.policy,
        max_records: run.max_records,
        values: run.values.clone().map(ValuesSource::FilePath),
    })
    .map_err(|e| e.to_string())?;
    let result = runner.run().await.map_err(|e| e.to_string())?;

    for name in &result.unknown_fields {
        eprintln!("{}", tag_line("WRN", &ignored_value_message(name)));
    }
    if !result.violations.is_empty() {
        for v in &result.violations {
            eprintln!("{}", error_line(&v.to_string()));
        }
        return Err(format!(
            "form has {} constraint violation(s)",
            result.violations.len()
        ));
    }

    let rendered = if run.page {
        output::page::render_page(&result.document, &result.offer).map_err(|e| e.to_string())?
    } else if let Some(records) = result.records.as_ref() {
        output::render_records(run.output_format, records, &result.offer)
    } else {
        let container = result
            .document
            .container(CONTAINER_ID)
            .map_err(|e| e.to_string())?;
        output::render_fragment(run.output_format, container)
    };

    match run.output.as_ref() {
        Some(outfile_path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(outfile_path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|_| "failed to write output file".to_string())?;

            format_kv_line("Records", &result.count.to_string());
            format_kv_line("Policy", run.policy.as_str());
            format_kv_line("Output", outfile_path);
            eprintln!(
                "{}",
                tag_line(
                    "INF",
                    &format!("done in {}ms", result.elapsed.as_millis())
                )
            );
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to flush stdout: {e}"))?;
        }
    }

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine a config path".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!("{}", path.display());
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };
    tracing::debug!(?cfg, "loaded config");

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
