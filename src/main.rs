//! `scrub`: sanitize HTML from a file or stdin to stdout.
//!
//! ```text
//! scrub [--config FILE] [--fragment] [INPUT]
//! ```

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use html::{ConverterConfig, HtmlToHtmlConverter, OutputMode};
use tools::Utf8ChunkDecoder;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const READ_CHUNK: usize = 64 * 1024;

const USAGE: &str = "usage: scrub [--config FILE] [--fragment] [INPUT]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    fragment: bool,
    input: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a file")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--fragment" => parsed.fragment = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            "-" if parsed.input.is_none() => {}
            other if other.starts_with('-') => {
                return Err(format!("unknown option {other}\n{USAGE}"));
            }
            other => {
                if parsed.input.is_some() {
                    return Err(format!("more than one input given\n{USAGE}"));
                }
                parsed.input = Some(PathBuf::from(other));
            }
        }
    }
    Ok(parsed)
}

fn load_config(args: &Args) -> Result<ConverterConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
            ConverterConfig::from_toml_str(&text)?
        }
        None => ConverterConfig::default(),
    };
    if args.fragment {
        config.output_mode = OutputMode::Fragment;
    }
    Ok(config)
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args(std::env::args().skip(1))?;
    let policy = Arc::new(load_config(&args)?.build()?);

    let mut reader: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).map_err(|err| format!("cannot open {}: {err}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    let mut converter = HtmlToHtmlConverter::new(policy);
    let mut decoder = Utf8ChunkDecoder::new();
    let mut bytes = vec![0u8; READ_CHUNK];
    let mut text = String::with_capacity(READ_CHUNK);
    loop {
        let read = match reader.read(&mut bytes) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        text.clear();
        decoder.decode(&bytes[..read], &mut text);
        converter.push_str(&text)?;
        out.write_all(converter.take_output().as_bytes())?;
    }
    text.clear();
    decoder.finish(&mut text);
    converter.push_str(&text)?;
    converter.finish()?;
    out.write_all(converter.take_output().as_bytes())?;
    out.flush()?;

    let stats = converter.stats();
    log::info!(
        "done: {} tags written, {} dropped, {} attributes dropped, {} urls rejected, {} css properties dropped",
        stats.tags_written,
        stats.tags_dropped,
        stats.attributes_dropped,
        stats.urls_rejected,
        stats.css_properties_dropped
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("scrub: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_options_and_input() {
        let parsed = args(&["--fragment", "--config", "c.toml", "in.html"]).expect("valid");
        assert!(parsed.fragment);
        assert_eq!(parsed.config, Some(PathBuf::from("c.toml")));
        assert_eq!(parsed.input, Some(PathBuf::from("in.html")));
    }

    #[test]
    fn dash_means_stdin() {
        let parsed = args(&["-"]).expect("valid");
        assert_eq!(parsed.input, None);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--bogus"]).is_err());
        assert!(args(&["a", "b"]).is_err());
    }

    #[test]
    fn fragment_flag_overrides_config() {
        let parsed = Args {
            fragment: true,
            ..Args::default()
        };
        let config = load_config(&parsed).expect("default config");
        assert_eq!(config.output_mode, OutputMode::Fragment);
    }
}
