mod spinner;

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use gen_contracts::models::{Mode, ModelRegistry};
use gen_contracts::request::OutputFormat;
use gen_engine::credentials::{resolve_api_key, API_KEY_VAR};
use gen_engine::output::resolve_output_path;
use gen_engine::{plan_request, FalClient, GenError, GenerateOptions, RequestPlan};
use tracing_subscriber::EnvFilter;

use crate::spinner::Spinner;

const LONG_ABOUT: &str = "Generate and edit images using FAL AI models.

Requires FAL_KEY (checked in order: env var, ./.env, ~/.gen-cli/.env).
Images are saved to ~/.gen-cli/output/ by default.

If -i/--image flags are provided, automatically uses edit mode.
Otherwise, generates a new image from the prompt.

For FLUX models, reference multiple images using @image1, @image2, etc:
  - \"@image1 wearing the outfit from @image2\"
  - \"combine the style of @image1 with @image2\"

For flux2-flex, you can also use HEX color codes:
  - \"a wall painted in color #2ECC71\"
  - \"the car in color #1A1A1A with accents in #FFD700\"

Limits: flux2-pro supports up to 9 images (9MP total),
        flux2-flex supports up to 10 images (14MP total),
        nano-banana-pro supports up to 14 images.";

const EXAMPLES: &str = "Examples:
  gen \"a cat in space\"
  gen \"cyberpunk city\" -m flux2-pro -s 16:9
  gen \"add sunglasses\" -i photo.png
  gen \"@image1 in the style of @image2\" -i content.png -i style.png -m flux2-pro";

#[derive(Debug, Parser)]
#[command(
    name = "gen",
    version,
    about = "Image Generator CLI",
    long_about = LONG_ABOUT,
    after_help = EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    generate: GenerateArgs,

    /// Log request details to stderr (RUST_LOG overrides the filter)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available models
    #[command(visible_aliases = ["ls", "list"])]
    Models,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Text prompt describing the image or the edit
    prompt: Option<String>,

    /// Model to use
    #[arg(short, long, default_value = "z-turbo")]
    model: String,

    /// Input image(s) for editing
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Aspect ratio: 16:9, 4:3, 1:1, 3:4, 9:16 (default: 4:3 for gen, auto for edit)
    #[arg(short, long, default_value = "")]
    size: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Png)]
    format: FormatArg,

    /// Output file path or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for reproducibility (negative lets the API choose)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    seed: i64,

    /// Ask the API to run its safety checker
    #[arg(long)]
    safety_checker: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

impl GenerateArgs {
    fn into_options(self, prompt: String) -> GenerateOptions {
        GenerateOptions {
            prompt,
            model: self.model,
            images: self.images,
            size: Some(self.size).filter(|size| !size.is_empty()),
            format: self.format.into(),
            output: self.output.filter(|path| !path.as_os_str().is_empty()),
            seed: u64::try_from(self.seed).ok(),
            safety_checker: self.safety_checker,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprint!("{}", error_report(&err));
        std::process::exit(1);
    }
}

/// Top-level message only: `GenError` messages already carry their source.
fn error_report(err: &anyhow::Error) -> String {
    let mut report = format!("Error: {err}\n");
    if let Some(GenError::MissingCredential) = err.downcast_ref::<GenError>() {
        let _ = writeln!(
            report,
            "Set {API_KEY_VAR} environment variable or create ~/.gen-cli/.env"
        );
    }
    report
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(Command::Models) = cli.command {
        print!("{}", format_models(&ModelRegistry::default()));
        return Ok(());
    }

    let Some(prompt) = cli.generate.prompt.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };
    let options = cli.generate.into_options(prompt);
    run_generate(&options)
}

fn init_tracing(verbose: bool) {
    let from_env = EnvFilter::try_from_default_env().ok();
    if !verbose && from_env.is_none() {
        return;
    }
    let filter = from_env.unwrap_or_else(|| EnvFilter::new("gen_engine=debug,gen=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(options: &GenerateOptions) -> Result<()> {
    let api_key = resolve_api_key()?;
    let plan = plan_request(&ModelRegistry::default(), options)?;
    print_plan(&plan);

    let client = FalClient::new(api_key)?;
    let started = Instant::now();
    let spinner = Spinner::start("Processing...");
    let submitted = client.submit(&plan.endpoint, &plan.request);
    spinner.finish("Complete!");
    let elapsed = started.elapsed();
    let result = submitted?;

    // parse_response guarantees at least one image.
    let Some(image) = result.images.first() else {
        return Err(GenError::EmptyResult.into());
    };
    let out_path = resolve_output_path(options.output.as_deref(), options.format);

    println!("Downloading image...");
    client.download(&image.url, &out_path)?;

    println!("Image saved to: {}", out_path.display());
    if image.width > 0 {
        println!("Dimensions: {}x{}", image.width, image.height);
    }
    println!("Seed: {}", result.seed);
    println!("Time: {:.1}s", elapsed.as_secs_f64());
    Ok(())
}

fn print_plan(plan: &RequestPlan) {
    if let (Some((width, height)), Some(directive)) = (plan.size.detected, &plan.size.directive) {
        println!("Input image: {width}x{height} -> using {directive}");
    }
    if plan.mode == Mode::Edit {
        println!("Edit mode: {} input image(s)", plan.request.image_urls.len());
    }
    println!("Using model: {}", plan.endpoint);
    if let Some(directive) = &plan.size.directive {
        println!("Requested size: {directive}");
    }
}

fn format_models(registry: &ModelRegistry) -> String {
    let mut out = String::from("Available Models:\n\n");
    for model in registry.list() {
        let edit_support = if model.supports_edit() {
            "supports edit"
        } else {
            "no edit"
        };
        let aliases = registry.aliases_for(&model.name);
        let alias_note = if aliases.is_empty() {
            String::new()
        } else {
            format!(" (alias: {})", aliases.join(", "))
        };
        let _ = writeln!(out, "  {:<17}  {edit_support}{alias_note}", model.name);
    }
    out.push_str("\nUse -i flag to enable edit mode (e.g., gen \"prompt\" -i image.png)\n");
    out
}
