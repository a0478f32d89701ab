use scaffview_core::{
    Depicter, DepictionError, DepictionResult, DepictionSize, DisplayBackend, MatrixCollection,
    RenderConfig, Settings, assemble,
};
use scaffview_render::Quality;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Core(scaffview_core::Error),
    Render(scaffview_render::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<scaffview_core::Error> for CliError {
    fn from(value: scaffview_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<scaffview_render::Error> for CliError {
    fn from(value: scaffview_render::Error) -> Self {
        Self::Render(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Snapshot,
    Display,
    Export,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    no_labels: bool,
    style: Option<String>,
    graph_id: Option<String>,
    size: Option<DepictionSize>,
    settings: Option<String>,
    working_dir: Option<String>,
    backend: Option<DisplayBackend>,
    quality: Quality,
    out: Option<String>,
}

fn usage() -> &'static str {
    "scaffview-cli\n\
\n\
USAGE:\n\
  scaffview-cli [snapshot] [--pretty] [OPTIONS] [<path>|-]\n\
  scaffview-cli display [--backend svg|raster] [OPTIONS] [<path>|-]\n\
  scaffview-cli export [--quality fast|high] [--out <path>] [OPTIONS] [<path>|-]\n\
\n\
OPTIONS:\n\
  --id <graph-id>        graph identifier (default: Graph)\n\
  --no-labels            do not label nodes with level and index\n\
  --style <path>         style sheet file replacing the default one\n\
  --size <w>x<h>         depiction size per node (default: 2048x2048)\n\
  --settings <path>      JSON settings (workingDir, tempDir, backend, viewport, highQualityResolution)\n\
  --working-dir <dir>    overrides the working directory from the settings\n\
\n\
NOTES:\n\
  - Input is a JSON object {\"matrix\": [[0,1,..],..], \"nodes\": [{\"level\": 0, \"structure\": \"img.png\"},..]}.\n\
  - Structures are image paths, resolved relative to the input file (or the current directory for stdin).\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - export defaults to writing next to the input file (or ./out.png for stdin).\n\
  - Set RUST_LOG to see depiction warnings and debug output.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "snapshot" => args.command = Command::Snapshot,
            "display" => args.command = Command::Display,
            "export" => args.command = Command::Export,
            "--pretty" => args.pretty = true,
            "--no-labels" => args.no_labels = true,
            "--style" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.style = Some(path.to_string());
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.graph_id = Some(id.to_string());
            }
            "--size" => {
                let Some(size) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.size = Some(size.parse::<DepictionSize>()?);
            }
            "--settings" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.settings = Some(path.to_string());
            }
            "--working-dir" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.working_dir = Some(dir.to_string());
            }
            "--backend" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.backend = Some(name.parse::<DisplayBackend>()?);
            }
            "--quality" => {
                let Some(q) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.quality = q.parse::<Quality>()?;
            }
            "--out" | "-o" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.to_string());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            other => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(other.to_string());
            }
        }
    }

    Ok(args)
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
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

/// Loads node structures from image files and scales them down to the requested size.
struct FileDepicter {
    base_dir: PathBuf,
}

impl Depicter<String> for FileDepicter {
    fn depict(&self, structure: &String, size: DepictionSize) -> DepictionResult {
        if structure.trim().is_empty() {
            return Err(DepictionError::structure("no image path"));
        }
        let path = self.base_dir.join(structure);
        let img = image::open(&path)?;
        let img = if img.width() > size.width || img.height() > size.height {
            img.resize(
                size.width,
                size.height,
                image::imageops::FilterType::Triangle,
            )
        } else {
            img
        };
        Ok(img.to_rgba8())
    }
}

fn load_settings(args: &Args) -> Result<Settings, CliError> {
    let mut settings = match args.settings.as_deref() {
        Some(path) => Settings::from_json_str(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    if let Some(dir) = args.working_dir.as_deref() {
        settings.working_dir = PathBuf::from(dir);
    }
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }
    Ok(settings)
}

fn render_config(args: &Args) -> Result<RenderConfig, CliError> {
    let mut config = RenderConfig::default().with_labels(!args.no_labels);
    if let Some(path) = args.style.as_deref() {
        config = config.with_style_sheet(std::fs::read_to_string(path)?);
    }
    if let Some(id) = args.graph_id.as_deref() {
        config = config.with_graph_id(id);
    }
    if let Some(size) = args.size {
        config = config.with_depiction_size(size);
    }
    Ok(config)
}

fn default_export_path(input: Option<&str>) -> PathBuf {
    match input {
        None | Some("-") => PathBuf::from("out.png"),
        Some(path) => Path::new(path).with_extension("png"),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let collection: MatrixCollection<String> = serde_json::from_str(&text)?;
    let base_dir = match args.input.as_deref() {
        None | Some("-") => PathBuf::from("."),
        Some(path) => Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let settings = load_settings(&args)?;
    let config = render_config(&args)?;
    let mut graph = assemble(&collection, &FileDepicter { base_dir }, &config, &settings)?;

    let result = match args.command {
        Command::Snapshot => write_json(&graph.snapshot(), args.pretty),
        Command::Display => {
            let view = scaffview_render::display(&graph, &settings)?;
            println!("{}", view.output().display());
            Ok(())
        }
        Command::Export => {
            let out = args
                .out
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| default_export_path(args.input.as_deref()));
            scaffview_render::export(&graph, &out, args.quality, &settings)?;
            Ok(())
        }
    };

    if let Err(err) = graph.release_depictions() {
        tracing::warn!(error = %err, "failed to remove depiction directory");
    }
    result
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
