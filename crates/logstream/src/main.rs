use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use logstream::parser::Segment;
use logstream::query::Order;
use logstream::runtime::boot;
use logstream::service::LogService;

/// Read entries from a log file, newest or oldest first.
#[derive(Parser, Debug)]
#[command(name = "logstream")]
#[command(about = "Query a log file in any common text format", long_about = None)]
#[command(version)]
struct Args {
    /// Log file to read
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// asc (file order) or desc (newest first)
    #[arg(long, default_value = "asc")]
    order: Order,

    /// Maximum number of entries to return
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Case-insensitive text to look for in messages
    #[arg(short, long)]
    search: Option<String>,

    /// Force a format instead of auto-detecting (json, apache, syslog, ...)
    #[arg(short, long, value_name = "NAME")]
    format: Option<String>,

    /// Print one JSON object per entry
    #[arg(long)]
    json: bool,

    /// Segments to omit from rendered lines
    #[arg(long, value_delimiter = ',', value_name = "date,level")]
    hide: Vec<Segment>,

    /// Bytes per read call
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Configuration file (overrides LOGSTREAM_CONFIG_FILE)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    boot::init_logging();

    let config = boot::boot(args.config.as_deref())?;
    let service = LogService::new(&config);

    let mut options = service.options().order(args.order);
    if let Some(limit) = args.limit {
        options = options.limit(limit);
    }
    if let Some(search) = args.search {
        options = options.search(search);
    }
    if let Some(format) = args.format {
        options = options.format(format);
    }
    if let Some(chunk_size) = args.chunk_size {
        options = options.chunk_size(chunk_size);
    }

    let entries = match service.get_entries(args.path, options).await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("could not read log: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut out = io::BufWriter::new(io::stdout().lock());
    for entry in &entries {
        if args.json {
            serde_json::to_writer(&mut out, entry)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", entry.render(&args.hide))?;
        }
    }
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}
