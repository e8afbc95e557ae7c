use clap::Parser;

#[derive(Parser)]
#[command(
    name = "docgrep",
    about = "Semantic search over local plaintext files",
    version,
    after_help = "Examples:\n  docgrep -q \"error handling strategy\" -p notes/ -e md\n  docgrep -q \"retry with backoff\" -p 'src/**/*.rs' -k 5 --scores\n  echo \"database migrations\" | docgrep -p docs/\n  docgrep --print-config"
)]
pub struct Cli {
    /// Search query; read from stdin when omitted
    #[arg(short, long)]
    pub query: Option<String>,

    /// File, directory, or glob roots to search
    #[arg(short, long, num_args = 1.., default_value = ".")]
    pub paths: Vec<String>,

    /// Restrict to these file extensions (leading dot optional)
    #[arg(short, long, num_args = 1..)]
    pub ext: Vec<String>,

    /// Maximum number of results
    #[arg(short = 'k', long = "limit")]
    pub k: Option<usize>,

    /// Print the similarity score next to each path
    #[arg(long)]
    pub scores: bool,

    /// Output matches as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Override the configured embedding model
    #[arg(long)]
    pub model: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}
