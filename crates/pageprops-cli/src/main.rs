use pageprops::qr::{QrFormat, QrPreset, QrStyle, WidgetOptions, render_whatsapp_qr};
use pageprops::{
    HtmlDocument, PropertyReadError, PropsReader, ReadOptions, Shape, SiteConfig, embed_props,
};
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PAGEPROPS_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(pageprops::Error),
    Props(PropertyReadError),
    Qr(pageprops::qr::Error),
    Json(serde_json::Error),
    NoCanvas(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Props(err) => write!(f, "{err}"),
            CliError::Qr(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoCanvas(id) => write!(f, "QR code canvas element `{id}` not found"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<pageprops::Error> for CliError {
    fn from(value: pageprops::Error) -> Self {
        Self::Core(value)
    }
}

impl From<PropertyReadError> for CliError {
    fn from(value: PropertyReadError) -> Self {
        Self::Props(value)
    }
}

impl From<pageprops::qr::Error> for CliError {
    fn from(value: pageprops::qr::Error) -> Self {
        Self::Qr(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Props,
    Embed,
    Qr,
    Swap,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    props_id: Option<String>,
    schema: Option<String>,
    require_element: bool,
    pretty: bool,
    canvas_id: Option<String>,
    preset: QrPreset,
    format: QrFormat,
    status: Option<u16>,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapOut {
    status: u16,
    should_swap: bool,
    is_error: bool,
}

fn usage() -> &'static str {
    "pageprops-cli\n\
\n\
USAGE:\n\
  pageprops-cli [props] --id <props-id> [--schema <shape.json>] [--require-element] [--pretty] [--config <path>] [<page.html>|-]\n\
  pageprops-cli embed --id <props-id> [<value.json>|-]\n\
  pageprops-cli qr [--style widget|signup] [--format svg|png] [--props-id <id>] [--canvas-id <id>] [--out <path>] [--config <path>] [<page.html>|-]\n\
  pageprops-cli swap --status <code> [--config <path>]\n\
\n\
NOTES:\n\
  - If the input path is omitted or '-', input is read from stdin.\n\
  - props prints the props JSON; a missing element reads as {} unless --require-element is set.\n\
  - qr prints SVG to stdout by default; PNG output defaults to writing next to the input file (or ./qr.png for stdin).\n\
  - qr exits with status 3 when the page has no QR canvas element.\n\
  - Set PAGEPROPS_LOG (e.g. PAGEPROPS_LOG=debug) to control log output on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "props" => args.command = Command::Props,
            "embed" => args.command = Command::Embed,
            "qr" => args.command = Command::Qr,
            "swap" => args.command = Command::Swap,
            "--pretty" => args.pretty = true,
            "--require-element" => args.require_element = true,
            "--id" | "--props-id" => args.props_id = Some(next_value(&mut it)?.clone()),
            "--canvas-id" => args.canvas_id = Some(next_value(&mut it)?.clone()),
            "--schema" => args.schema = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--style" => {
                args.preset = next_value(&mut it)?
                    .parse::<QrPreset>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--format" => {
                args.format = next_value(&mut it)?
                    .parse::<QrFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--status" => {
                let status = next_value(&mut it)?
                    .parse::<u16>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(100..=599).contains(&status) {
                    return Err(CliError::Usage(usage()));
                }
                args.status = Some(status);
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(a.clone());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    match args.command {
        Command::Props | Command::Embed if args.props_id.is_none() => {
            Err(CliError::Usage(usage()))
        }
        Command::Swap if args.status.is_none() => Err(CliError::Usage(usage())),
        _ => Ok(args),
    }
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("qr.{ext}")),
    }
}

fn load_config(path: Option<&str>) -> Result<SiteConfig, CliError> {
    match path {
        None => Ok(SiteConfig::defaults()),
        Some(path) => Ok(SiteConfig::from_json_str(&std::fs::read_to_string(path)?)?),
    }
}

fn read_options(args: &Args, config: &SiteConfig) -> Result<ReadOptions, CliError> {
    if args.require_element {
        return Ok(ReadOptions::strict());
    }
    Ok(config.read_options()?)
}

fn run_props(args: &Args, config: &SiteConfig) -> Result<(), CliError> {
    let props_id = args.props_id.as_deref().ok_or(CliError::Usage(usage()))?;
    let html = read_input(args.input.as_deref())?;
    let document = HtmlDocument::parse(&html)?;
    let reader = PropsReader::with_options(&document, read_options(args, config)?);

    let value: Value = match args.schema.as_deref() {
        Some(path) => {
            let shape: Shape = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            reader.parse(props_id, &shape)?
        }
        None => reader.raw(props_id)?,
    };
    write_json(&value, args.pretty)
}

fn run_embed(args: &Args) -> Result<(), CliError> {
    let props_id = args.props_id.as_deref().ok_or(CliError::Usage(usage()))?;
    let value: Value = serde_json::from_str(&read_input(args.input.as_deref())?)?;
    println!("{}", embed_props(props_id, &value)?);
    Ok(())
}

fn run_qr(args: &Args, config: &SiteConfig) -> Result<(), CliError> {
    let html = read_input(args.input.as_deref())?;
    let document = HtmlDocument::parse(&html)?;

    let mut options = WidgetOptions {
        style: QrStyle::from_config(config, args.preset)?,
        format: args.format,
        read: read_options(args, config)?,
        ..WidgetOptions::default()
    };
    if let Some(id) = &args.props_id {
        options.props_id = id.clone();
    }
    if let Some(id) = &args.canvas_id {
        options.canvas_id = id.clone();
    }

    let Some(rendered) = render_whatsapp_qr(&document, &options)? else {
        return Err(CliError::NoCanvas(options.canvas_id));
    };

    match (rendered.format, args.out.as_deref()) {
        (QrFormat::Svg, None) => {
            std::io::stdout().lock().write_all(&rendered.bytes)?;
        }
        (QrFormat::Svg, Some(path)) => std::fs::write(path, &rendered.bytes)?,
        (QrFormat::Png, out) => {
            let path = match out {
                Some(path) => std::path::PathBuf::from(path),
                None => default_raster_out_path(args.input.as_deref(), "png"),
            };
            std::fs::write(&path, &rendered.bytes)?;
            tracing::info!(path = %path.display(), link = %rendered.link, "wrote QR code");
        }
    }
    Ok(())
}

fn run_swap(args: &Args, config: &SiteConfig) -> Result<(), CliError> {
    let status = args.status.ok_or(CliError::Usage(usage()))?;
    let detail = config.swap_policy()?.resolve(status);
    write_json(
        &SwapOut {
            status: detail.status,
            should_swap: detail.should_swap,
            is_error: detail.is_error,
        },
        args.pretty,
    )
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Props => run_props(&args, &config),
        Command::Embed => run_embed(&args),
        Command::Qr => run_qr(&args, &config),
        Command::Swap => run_swap(&args, &config),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::NoCanvas(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
