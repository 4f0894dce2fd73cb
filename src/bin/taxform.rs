//! Tax form assistant command line.
//!
//! The completion endpoint is configured with `OPENAI_API_KEY`,
//! `OPENAI_BASE_URL` and `OPENAI_MODEL` (a `.env` file is honoured).
//! Set `RUST_LOG=debug` for per-batch logging.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;
use taxform_oxide::config::PipelineConfig;
use taxform_oxide::extractors::{extract_form_fields, extract_text, read_field_values};
use taxform_oxide::filter::filter_fields;
use taxform_oxide::irs::{recommend_forms, suggest_deductions, FormSource, IrsFormSource};
use taxform_oxide::mapper::OpenAiClient;
use taxform_oxide::pipeline::Pipeline;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "taxform")]
#[command(about = "Extract, map and fill IRS form fields")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the text fields of a form and their labels
    Fields {
        /// Blank or filled form
        pdf: PathBuf,

        /// Skip the field filter
        #[arg(long)]
        all: bool,

        /// Print current field values instead of labels
        #[arg(long)]
        values: bool,
    },
    /// Print the text layer of a document
    Text {
        /// Document to read
        pdf: PathBuf,
    },
    /// Suggest deductions and income types found in a document
    Deductions {
        /// Tax document (PDF) or plain-text notes
        input: PathBuf,
    },
    /// Recommend IRS forms for a document
    Recommend {
        /// Tax document (PDF) or plain-text notes
        input: PathBuf,
    },
    /// Download a blank IRS form by code
    Download {
        /// Form code, e.g. f1040
        code: String,

        /// Where to save the PDF
        output: PathBuf,
    },
    /// Fill a form from taxpayer data
    Fill(FillArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("blank").required(true).args(["form", "code"])))]
struct FillArgs {
    /// Taxpayer data: a PDF document or a plain-text file
    data: PathBuf,

    /// Where to save the filled form
    output: PathBuf,

    /// Blank form to fill
    #[arg(long, value_name = "PDF")]
    form: Option<PathBuf>,

    /// Download the blank form by IRS code instead
    #[arg(long, value_name = "CODE")]
    code: Option<String>,

    /// Form name used in prompts (defaults to the file stem or code)
    #[arg(long)]
    form_name: Option<String>,

    /// Also write the semantic fields as a CSV worksheet
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Fields per completion request
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Fail when every mapping batch fails
    #[arg(long)]
    strict: bool,
}

/// Text of an uploaded document: the text layer of a PDF, or the file
/// itself for anything else.
fn read_document(path: &Path) -> CliResult<String> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Ok(extract_text(&fs::read(path)?)?)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn run_fields(pdf: &Path, all: bool, values: bool) -> CliResult<()> {
    let bytes = fs::read(pdf)?;
    if values {
        let current = read_field_values(&bytes)?;
        println!("{}", serde_json::to_string_pretty(&current)?);
        return Ok(());
    }

    let extracted = extract_form_fields(&bytes)?;
    let fields = if all { extracted } else { filter_fields(&extracted) };
    println!("{}", serde_json::to_string_pretty(&fields)?);
    eprintln!("{} fields", fields.len());
    Ok(())
}

fn completion_client() -> CliResult<OpenAiClient> {
    Ok(OpenAiClient::new(PipelineConfig::from_env().completion)?)
}

fn run_deductions(client: &OpenAiClient, input: &Path) -> CliResult<Vec<String>> {
    let text = read_document(input)?;
    Ok(suggest_deductions(client, &text)?)
}

fn run_recommend(input: &Path) -> CliResult<()> {
    let client = completion_client()?;
    let deductions = run_deductions(&client, input)?;
    for form in recommend_forms(&client, &deductions)? {
        println!("{}|{} - {}", form.form, form.code, form.description);
    }
    Ok(())
}

fn run_download(code: &str, output: &Path) -> CliResult<()> {
    let bytes = IrsFormSource::default()
        .fetch_form(code)
        .ok_or_else(|| format!("form '{}' could not be downloaded", code))?;
    fs::write(output, &bytes)?;
    println!("Saved {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn run_fill(args: FillArgs) -> CliResult<()> {
    let mut config = PipelineConfig::from_env().with_fail_on_empty_mapping(args.strict);
    if let Some(batch_size) = args.batch_size {
        config = config.with_batch_size(batch_size);
    }
    let client = OpenAiClient::new(config.completion.clone())?;
    let pipeline = Pipeline::new(config)?;
    let user_data = read_document(&args.data)?;

    let output = match (&args.form, &args.code) {
        (Some(path), _) => {
            let form_name = args.form_name.clone().unwrap_or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "tax".to_string())
            });
            pipeline.run(&client, &fs::read(path)?, &user_data, &form_name)?
        },
        (None, Some(code)) => {
            let form_name = args.form_name.clone().unwrap_or_else(|| code.clone());
            pipeline.run_for_code(&client, &IrsFormSource::default(), code, &user_data, &form_name)?
        },
        (None, None) => return Err("either --form or --code is required".into()),
    };

    fs::write(&args.output, &output.filled_pdf)?;
    println!(
        "Filled {} of {} fields ({} of {} batches succeeded)",
        output.mapping.form_fields.len(),
        output.fields.len(),
        output.report.succeeded(),
        output.report.batches
    );
    println!("Saved {}", args.output.display());

    if let Some(csv_path) = &args.csv {
        output
            .mapping
            .write_semantic_csv(BufWriter::new(File::create(csv_path)?))?;
        println!("Saved {}", csv_path.display());
    }
    Ok(())
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Fields { pdf, all, values } => run_fields(&pdf, all, values),
        Command::Text { pdf } => {
            println!("{}", extract_text(&fs::read(pdf)?)?);
            Ok(())
        },
        Command::Deductions { input } => {
            for deduction in run_deductions(&completion_client()?, &input)? {
                println!("{}", deduction);
            }
            Ok(())
        },
        Command::Recommend { input } => run_recommend(&input),
        Command::Download { code, output } => run_download(&code, &output),
        Command::Fill(args) => run_fill(args),
    }
}

fn main() {
    env_logger::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
