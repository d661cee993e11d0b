//! Compile a stylesheet and print the rule-set document as JSON.
//!
//! ```text
//! native_css <input.css> [--config <options.json>] [--pretty]
//! ```

use anyhow::{Context as _, Error, anyhow, bail};
use css_compiler::{CompileOptions, Warnings, compile};
use env_logger::{Builder, Env};
use log::{error, info, warn};
use std::env;
use std::fs;
use std::io::{Write as _, stdout};
use std::path::PathBuf;
use std::process::exit;

/// Parsed command line.
#[derive(Debug, Default)]
struct Arguments {
    input: PathBuf,
    config: Option<PathBuf>,
    pretty: bool,
}

fn parse_arguments(args: impl Iterator<Item = String>) -> Result<Arguments, Error> {
    let mut input = None;
    let mut config = None;
    let mut pretty = false;
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        if let Some(path) = arg.strip_prefix("--config=") {
            config = Some(PathBuf::from(path));
        } else if arg == "--config" {
            let path = args.next().ok_or_else(|| anyhow!("--config needs a path"))?;
            config = Some(PathBuf::from(path));
        } else if arg == "--pretty" {
            pretty = true;
        } else if arg.starts_with("--") {
            bail!("unknown option {arg}");
        } else if input.replace(PathBuf::from(&arg)).is_some() {
            bail!("more than one input file given");
        }
    }
    let input = input.ok_or_else(|| anyhow!("usage: native_css <input.css> [--config <options.json>] [--pretty]"))?;
    Ok(Arguments { input, config, pretty })
}

fn load_options(config: Option<&PathBuf>) -> Result<CompileOptions, Error> {
    let Some(path) = config else {
        return Ok(CompileOptions::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing options in {}", path.display()))
}

fn report(warnings: &Warnings) {
    if !warnings.properties.is_empty() {
        warn!("Unsupported properties: {}", warnings.properties.join(", "));
    }
    for (property, values) in &warnings.values {
        warn!("Unsupported values for {property}: {}", values.join(", "));
    }
    if !warnings.functions.is_empty() {
        warn!("Unsupported functions: {}", warnings.functions.join(", "));
    }
}

fn run(arguments: &Arguments) -> Result<(), Error> {
    let options = load_options(arguments.config.as_ref())?;
    let css = fs::read_to_string(&arguments.input)
        .with_context(|| format!("reading {}", arguments.input.display()))?;
    let output = compile(&css, &options).with_context(|| format!("compiling {}", arguments.input.display()))?;
    let (stylesheet, warnings) = output.into_parts();
    report(&warnings);
    info!("Compiled {} classes", stylesheet.rules.len());
    let json = if arguments.pretty {
        stylesheet.to_json_pretty()?
    } else {
        stylesheet.to_json()?
    };
    let mut out = stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}

fn main() {
    let _log_init: Result<(), _> = Builder::from_env(Env::default().filter_or("RUST_LOG", "warn")).try_init();
    let result = parse_arguments(env::args()).and_then(|arguments| run(&arguments));
    if let Err(err) = result {
        error!("{err:#}");
        exit(1);
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        ["native_css"]
            .iter()
            .chain(list)
            .map(|arg| (*arg).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn reads_input_and_flags() {
        let parsed = parse_arguments(args(&["app.css", "--config", "opts.json", "--pretty"])).unwrap();
        assert_eq!(parsed.input, PathBuf::from("app.css"));
        assert_eq!(parsed.config, Some(PathBuf::from("opts.json")));
        assert!(parsed.pretty);

        let inline = parse_arguments(args(&["--config=o.json", "a.css"])).unwrap();
        assert_eq!(inline.config, Some(PathBuf::from("o.json")));
        assert!(!inline.pretty);
    }

    #[test]
    fn rejects_bad_command_lines() {
        let message = |list: &[&str]| parse_arguments(args(list)).unwrap_err().to_string();
        assert!(message(&[]).starts_with("usage:"));
        assert_eq!(message(&["a.css", "b.css"]), "more than one input file given");
        assert_eq!(message(&["a.css", "--verbose"]), "unknown option --verbose");
        assert_eq!(message(&["a.css", "--config"]), "--config needs a path");
    }

    #[test]
    fn options_default_without_config() {
        assert_eq!(load_options(None).unwrap(), CompileOptions::default());
    }
}
