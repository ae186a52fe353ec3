use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "colortig",
    about = "colortig - inserted-sequence contig assembly from a colored compacted de Bruijn graph.",
    version,
    author
)]
pub struct Cli {
    /// Input graph in GFA format; omit to reuse a cached graph from the output directory
    pub graph: Option<String>,

    /// Per-unitig color table (samples header, then name/strand/head/tail rows)
    #[arg(short, long)]
    pub colors: Option<String>,

    /// K-mer size of the graph
    #[arg(short, long, default_value_t = 31)]
    pub kmer_size: usize,

    /// Maximum number of paths reported per start node
    #[arg(short, long, default_value_t = 2, help_heading = "Traversal Parameters")]
    pub max_paths: u32,

    /// Minimum number of not-yet-covered unitigs a path must contribute to be kept
    #[arg(long, default_value_t = 1, help_heading = "Traversal Parameters")]
    pub min_novel: usize,

    /// Drop contigs with dinucleotide entropy below this value; 0 disables the filter
    #[arg(long, default_value_t = 0.0, help_heading = "Output Parameters")]
    pub min_entropy: f64,

    /// Write a set cover summary CSV next to the contigs
    #[arg(long, default_value_t = false, help_heading = "Output Parameters")]
    pub setcover_csv: bool,

    /// Output directory for results
    #[arg(short, long, default_value = "output")]
    pub output_dir: String,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Cli {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
