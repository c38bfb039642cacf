use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;

use csv2vw::config::{label_index_from_signed, parse_index_list};
use csv2vw::convert::quadratic::QuadraticSpec;
use csv2vw::{
    ConversionPipeline, ConvertConfig, CsvSource, Delimiter, LineSink, MemorySource,
    NamespaceSource, RecordSource, StreamSource, WriterSink,
};

/// Path meaning stdin / stdout.
const STDIO: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "csv2vw",
    version,
    about = "Convert CSV/TSV file to Vowpal Wabbit format"
)]
pub struct Args {
    /// Path to CSV input file (`-` for stdin)
    pub input_file: PathBuf,

    /// Path to output file (`-` for stdout)
    pub output_file: PathBuf,

    /// There is a header in the file; use it for namespace names
    #[arg(short, long, conflicts_with = "skip_header")]
    pub parse_header: bool,

    /// There is a header in the file; skip it and use made up names instead
    #[arg(short, long)]
    pub skip_header: bool,

    /// Index of label column (default 0, use -1 if there are no labels)
    #[arg(short, long, allow_negative_numbers = true)]
    pub label_index: Option<i64>,

    /// Convert labels for binary classification from 0 to -1
    #[arg(short = 'z', long)]
    pub convert_zeros: bool,

    /// Zero-based index(es) of columns to ignore, for example 0 or 3 or 3,4,5
    #[arg(short, long)]
    pub ignore_columns: Option<String>,

    /// Zero-based index(es) of columns to treat as real-valued
    #[arg(short, long)]
    pub real_valued: Option<String>,

    /// Cross namespaces by prefix, VW style (`ab`) or as a pair (`age,color`).
    /// Can be repeated.
    #[arg(short, long)]
    pub quadratic: Vec<String>,

    /// Keep only features that occurred at least this many times. 1 disables
    /// filtering. All occurrences are held in memory while counting.
    #[arg(short, long)]
    pub min_shows: Option<u32>,

    /// Input is tab-separated
    #[arg(short, long)]
    pub tsv: bool,

    /// JSON file with conversion settings. Options given on the command line
    /// replace the matching settings (`-q` replaces the whole quadratic list);
    /// `-z`, `-t`, `-p` and `-s` can only switch a setting on
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl Args {
    /// Start from the config file (or the defaults) and apply every option
    /// given on the command line on top.
    pub fn build_config(&self) -> Result<ConvertConfig> {
        let mut config = match &self.config {
            Some(path) => ConvertConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ConvertConfig::default(),
        };

        if self.parse_header {
            config.namespaces = NamespaceSource::ParsedHeader;
        } else if self.skip_header {
            config.namespaces = NamespaceSource::SkipHeader;
        }
        if let Some(index) = self.label_index {
            config.label_index = label_index_from_signed(index)?;
        }
        if self.convert_zeros {
            config.convert_zeros = true;
        }
        if let Some(list) = &self.ignore_columns {
            config.ignore_columns = parse_index_list(list)?;
        }
        if let Some(list) = &self.real_valued {
            config.real_valued = parse_index_list(list)?;
        }
        if !self.quadratic.is_empty() {
            config.quadratic = self
                .quadratic
                .iter()
                .map(|spec| spec.parse::<QuadraticSpec>())
                .collect::<csv2vw::Result<Vec<_>>>()?;
        }
        if let Some(min_shows) = self.min_shows {
            config.min_shows = min_shows;
        }
        if self.tsv {
            config.delimiter = Delimiter::Tab;
        }

        Ok(config)
    }
}

pub fn run(args: &Args) -> Result<()> {
    let config = args.build_config()?;
    let pipeline = ConversionPipeline::new(config).context("invalid conversion settings")?;

    let mut source = open_source(&args.input_file, pipeline.config())?;
    let mut sink = open_sink(&args.output_file)?;

    let summary = pipeline
        .run(source.as_mut(), sink.as_mut())
        .with_context(|| format!("converting {}", args.input_file.display()))?;

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary {}", path.display()))?;
    }
    Ok(())
}

fn open_source(path: &Path, config: &ConvertConfig) -> Result<Box<dyn RecordSource>> {
    if path.as_os_str() != STDIO {
        let source = CsvSource::open_path(path, config.delimiter)
            .with_context(|| format!("opening {}", path.display()))?;
        return Ok(Box::new(source));
    }

    if config.filtering_enabled() {
        // Two passes are needed, stdin only gives one.
        log::info!("buffering stdin for the counting pass");
        let source = MemorySource::from_reader(io::stdin(), config.delimiter)
            .context("reading stdin")?;
        Ok(Box::new(source))
    } else {
        Ok(Box::new(StreamSource::new(
            Box::new(io::stdin()),
            config.delimiter,
        )))
    }
}

fn open_sink(path: &Path) -> Result<Box<dyn LineSink>> {
    if path.as_os_str() == STDIO {
        return Ok(Box::new(WriterSink::new(io::stdout().lock())));
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(Box::new(WriterSink::new(file)))
}
