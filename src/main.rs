// ABOUTME: Command-line front end that dumps a binary device tree as text
// ABOUTME: Reads a file, renders every node and property to stdout and maps failures to exit codes

use clap::Parser;
use devicetree_inspect::{IndentStyle, RenderConfig, RenderError, render};
use std::fmt;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "devicetree-inspect")]
#[command(about = "Print the nodes and properties of a binary device tree")]
#[command(version)]
struct Args {
    /// Device tree file to read
    path: PathBuf,

    /// Print property values in full instead of cutting them short
    #[arg(short, long)]
    verbose: bool,

    /// Draw nesting with tree lines instead of plain indentation
    #[arg(short, long)]
    tree: bool,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        let style = if self.tree {
            IndentStyle::Tree
        } else {
            IndentStyle::Flat
        };
        let config = RenderConfig::default().with_style(style);
        if self.verbose { config.verbose() } else { config }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: devicetree_inspect::DeviceTreeError,
    },
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Io { .. } => ExitCode::from(2),
            CliError::Parse { .. } => ExitCode::from(3),
        }
    }
}

/// Forwards formatted text to a byte stream, keeping the first I/O error
struct IoAdapter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> fmt::Write for IoAdapter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let shown = args.path.display().to_string();
    let io_error = |source: io::Error| CliError::Io {
        path: shown.clone(),
        source,
    };

    let data = std::fs::read(&args.path).map_err(io_error)?;
    tracing::debug!(path = %shown, bytes = data.len(), "loaded device tree");

    let stdout = io::stdout();
    let mut out = IoAdapter {
        inner: BufWriter::new(stdout.lock()),
        error: None,
    };
    let result = render(&data, &args.render_config(), &mut out);

    // Whatever was rendered before a failure is still worth showing
    let flushed = out.inner.flush();

    match result {
        Ok(()) => flushed.map_err(io_error),
        Err(RenderError::Structure(source)) => Err(CliError::Parse {
            path: shown.clone(),
            source,
        }),
        Err(RenderError::Output(_)) => {
            let source = out
                .error
                .take()
                .unwrap_or_else(|| io::Error::other("formatter error"));
            Err(io_error(source))
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "render failed");
            eprintln!("devicetree-inspect: {e}");
            e.exit_code()
        }
    }
}
