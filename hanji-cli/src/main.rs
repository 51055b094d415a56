//! Hanji CLI - command-line access to package query/edit operations

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hanji_core::HanjiError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hanji")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a package from a recognized-blocks JSON file
    Build {
        /// Input blocks JSON path
        input: String,

        /// Output package path
        #[arg(short, long)]
        output: String,

        /// Vertical gap (points) below which blocks merge into one paragraph
        #[arg(long, default_value_t = 6.0)]
        merge_gap: f32,

        /// Document title
        #[arg(long, default_value = "Scanned document")]
        title: String,

        /// Document language code
        #[arg(long, default_value = "ko")]
        language: String,
    },

    /// Display information about a package
    Info {
        /// Input package path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print document text
    Text {
        /// Input package path
        input: String,

        /// Restrict to one section
        #[arg(short, long)]
        section: Option<usize>,

        /// Restrict to one paragraph (requires --section)
        #[arg(short, long, requires = "section")]
        paragraph: Option<usize>,
    },

    /// Search document text
    Search {
        /// Input package path
        input: String,

        /// Literal needle or regular expression
        query: String,

        /// Interpret the query as a regular expression
        #[arg(long)]
        regex: bool,

        /// Case-insensitive literal search
        #[arg(short = 'i', long)]
        ignore_case: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace text and write the edited package
    Replace {
        /// Input package path
        input: String,

        /// Output package path
        #[arg(short, long)]
        output: String,

        /// Literal needle or regular expression
        target: String,

        /// Replacement text
        replacement: String,

        /// Interpret the target as a regular expression
        #[arg(long)]
        regex: bool,

        /// Replace only the first match
        #[arg(long)]
        first: bool,
    },

    /// Validate a package
    Validate {
        /// Input package path
        input: String,

        /// Also check that the package re-encodes losslessly
        #[arg(long)]
        strict: bool,
    },

    /// Batch-build packages from a directory of blocks JSON files
    Batch {
        /// Input directory
        input_dir: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: String,

        /// Number of parallel jobs
        #[arg(short, long, default_value = "4")]
        jobs: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "hanji_cli=debug,hanji_core=debug"
    } else {
        "hanji_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = run(cli.command);
    if let Err(err) = result {
        eprintln!("error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Build {
            input,
            output,
            merge_gap,
            title,
            language,
        } => commands::build(&input, &output, merge_gap, &title, &language),

        Commands::Info { input, json } => commands::info(&input, json),

        Commands::Text {
            input,
            section,
            paragraph,
        } => commands::text(&input, section, paragraph),

        Commands::Search {
            input,
            query,
            regex,
            ignore_case,
            json,
        } => commands::search(&input, &query, regex, ignore_case, json),

        Commands::Replace {
            input,
            output,
            target,
            replacement,
            regex,
            first,
        } => commands::replace(&input, &output, &target, &replacement, regex, first),

        Commands::Validate { input, strict } => commands::validate(&input, strict),

        Commands::Batch {
            input_dir,
            output_dir,
            jobs,
        } => commands::batch(&input_dir, &output_dir, jobs),
    }
}

/// Map error kinds to distinct exit codes without altering their meaning
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<HanjiError>() {
        Some(HanjiError::Package(_)) => 2,
        Some(HanjiError::NotFound(_)) => 3,
        Some(HanjiError::Pattern(_)) => 4,
        Some(HanjiError::Invariant(_)) => 5,
        Some(HanjiError::Provider(_)) => 6,
        _ => 1,
    }
}
