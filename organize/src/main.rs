//! Organize CLI - plan a tag-driven music library layout
//!
//! # Main Commands
//!
//! ```bash
//! organize script ~/inbox -d ~/Music > migrate.sh   # Write the migration script
//! organize print ~/inbox                            # Dry run: show the planned layout
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! organize tags song.flac            # Raw and resolved tags as JSON
//! organize parse ':albumartist:'     # Parsed template as JSON
//! organize example-program           # Default template program
//! ```

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use organize::{
    plan_library, print_layout, FixedPrompt, LoftyTagSource, PlanOptions, Prompt, PromptContext,
    RawTagSource, TagResolver, TemplateProgram, TerminalPrompt, DEFAULT_DESTINATION,
};
use serde_json::json;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "organize")]
#[command(about = "Plan a music library layout from audio tags", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the plan and write a bash migration script
    Script {
        /// Directory to organize
        root: PathBuf,

        #[command(flatten)]
        plan: PlanArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the plan and print the destination layout
    Print {
        /// Directory to organize
        root: PathBuf,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Show raw and resolved tags of one file
    Tags {
        /// Audio file
        file: PathBuf,

        /// Answer every prompt with this value
        #[arg(long)]
        fill: Option<String>,
    },

    /// Parse a template and print its node tree
    Parse {
        /// Template string
        template: String,
    },

    /// Show the default template program
    ExampleProgram,
}

#[derive(Args)]
struct PlanArgs {
    /// Destination directory
    #[arg(short, long, env = "ORGANIZE_DESTINATION", default_value = DEFAULT_DESTINATION)]
    destination: PathBuf,

    /// Template segments separated by '/'
    #[arg(short, long, env = "ORGANIZE_FORMAT")]
    format: Option<String>,

    /// Template program JSON file (takes precedence over --format)
    #[arg(short, long)]
    program: Option<PathBuf>,

    /// Companion file extensions to copy (comma separated)
    #[arg(long, value_delimiter = ',')]
    keep: Option<Vec<String>>,

    /// Answer every prompt with this value instead of asking
    #[arg(long)]
    fill: Option<String>,

    /// Include dot-files and dot-directories
    #[arg(long)]
    include_hidden: bool,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Script { root, plan, output } => cmd_script(&root, &plan, output.as_deref()),
        Commands::Print { root, plan } => cmd_print(&root, &plan),
        Commands::Tags { file, fill } => cmd_tags(&file, fill),
        Commands::Parse { template } => cmd_parse(&template),
        Commands::ExampleProgram => cmd_example_program(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let mut builder = colog::default_builder();
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        let level = match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        builder.filter(None, level);
    }
    builder.init();
}

fn plan_options(args: &PlanArgs) -> Result<PlanOptions, Box<dyn std::error::Error>> {
    let mut program = match (&args.program, &args.format) {
        (Some(path), _) => TemplateProgram::from_file(path)?,
        (None, Some(format)) => TemplateProgram::from_format_string(format),
        (None, None) => TemplateProgram::default(),
    };
    if let Some(keep) = &args.keep {
        program = program.with_keep_formats(keep.iter().map(|ext| ext.trim_start_matches('.')));
    }

    let destination = std::path::absolute(&args.destination)?;

    Ok(PlanOptions {
        destination: destination.to_string_lossy().into_owned(),
        program,
        include_hidden: args.include_hidden,
    })
}

fn prompt_for(fill: Option<String>) -> Box<dyn Prompt> {
    match fill {
        Some(value) => Box::new(FixedPrompt::new(value)),
        None => Box::new(TerminalPrompt::stdio()),
    }
}

fn cmd_script(
    root: &Path,
    args: &PlanArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = plan_options(args)?;
    let root = std::path::absolute(root)?;
    let mut prompt = prompt_for(args.fill.clone());

    let plan = plan_library(&root, &options, prompt.as_mut())?;
    let writer = plan
        .script_writer()
        .with_command(std::env::args().collect::<Vec<_>>().join(" "));

    match output {
        Some(path) => {
            writer.write_to_file(&plan.tree, path)?;
            eprintln!("💾 Script written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            writer.write(&plan.tree, &mut stdout.lock())?;
        }
    }

    eprintln!(
        "✅ {} of {} files planned ({} duplicates, {} skipped, {} prompts)",
        plan.stats.leaves_created,
        plan.stats.files_seen,
        plan.stats.duplicates,
        plan.stats.skipped,
        plan.stats.prompts_issued
    );
    Ok(())
}

fn cmd_print(root: &Path, args: &PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = plan_options(args)?;
    let root = std::path::absolute(root)?;
    let mut prompt = prompt_for(args.fill.clone());

    let plan = plan_library(&root, &options, prompt.as_mut())?;
    let stdout = io::stdout();
    print_layout(&plan.tree, &mut BufWriter::new(stdout.lock()))?;
    Ok(())
}

fn cmd_tags(file: &Path, fill: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading tags: {}", file.display());

    let raw = LoftyTagSource::new().read_tags(file)?;
    let mut prompt = prompt_for(fill);
    let mut ctx = PromptContext::new(prompt.as_mut());
    let resolved = TagResolver::new().resolve(&raw, file, &mut ctx)?;

    let report = json!({
        "file": file.display().to_string(),
        "raw": raw,
        "resolved": resolved,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_parse(template: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = organize::parse(template)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn cmd_example_program() -> Result<(), Box<dyn std::error::Error>> {
    let program = TemplateProgram::default();
    let json = program.to_json()?;
    println!("{}", json);

    let mut stderr = io::stderr();
    writeln!(stderr, "\nSave this to a file and pass it with --program")?;
    Ok(())
}
