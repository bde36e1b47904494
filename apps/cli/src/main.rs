use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use konspekt_core::{ExportFormat, Provider, TargetLanguage, logging, transcribe::MODEL_NAME};

mod commands;
mod ui;

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Gemini => Provider::Gemini,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum CliTranscriber {
    /// whisper.cpp on this machine
    #[default]
    Local,
    /// OpenAI's hosted Whisper
    Hosted,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliExport {
    Txt,
    Docx,
    Pdf,
}

impl From<CliExport> for ExportFormat {
    fn from(cli: CliExport) -> Self {
        match cli {
            CliExport::Txt => ExportFormat::Text,
            CliExport::Docx => ExportFormat::Docx,
            CliExport::Pdf => ExportFormat::Pdf,
        }
    }
}

fn parse_language(value: &str) -> Result<TargetLanguage, String> {
    TargetLanguage::parse(value).ok_or_else(|| {
        let known: Vec<&str> = TargetLanguage::all().map(|l| l.name()).collect();
        format!("unknown language '{}' (expected one of: {})", value, known.join(", "))
    })
}

#[derive(Parser)]
#[command(name = "konspekt", version)]
#[command(about = "Summarize, explain and transcribe videos with hosted AI models")]
struct Cli {
    /// Print debug logs to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a task (summary, main points, ...) on a video link or a local file
    Process(ProcessArgs),
    /// Transcribe a local file with Whisper
    Transcribe(TranscribeArgs),
    /// Store an API key in the credentials file
    Login {
        provider: CliProvider,
        key: String,
    },
}

#[derive(Args)]
struct ProcessArgs {
    /// YouTube or Google Drive link
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    url: Option<String>,

    /// Local audio or video file instead of a link
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Summary, "Full transcription", "Main points" or "Brief explanation"
    #[arg(short, long, default_value = "Summary")]
    task: String,

    /// Translate the output into this language (name or ISO code)
    #[arg(short, long, value_parser = parse_language)]
    lang: Option<TargetLanguage>,

    /// AI provider
    #[arg(short, long, value_enum, default_value_t, env = "KONSPEKT_PROVIDER")]
    provider: CliProvider,

    /// Override the provider's default model
    #[arg(short, long, env = "KONSPEKT_MODEL")]
    model: Option<String>,

    /// API key for the provider (otherwise read from its env var or `konspekt login`)
    #[arg(long, hide_env_values = true)]
    api_key: Option<String>,

    /// Transcribe locally first even when the provider accepts media
    #[arg(long)]
    transcribe_first: bool,

    #[command(flatten)]
    transcription: TranscriptionArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct TranscribeArgs {
    /// Audio or video file
    #[arg(short, long)]
    file: PathBuf,

    /// Prefix each segment with its start time
    #[arg(long)]
    timestamps: bool,

    /// OpenAI API key for the hosted transcriber
    #[arg(long, hide_env_values = true)]
    api_key: Option<String>,

    #[command(flatten)]
    transcription: TranscriptionArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct TranscriptionArgs {
    /// Speech-recognition engine used when a transcript is needed
    #[arg(long, value_enum, default_value_t)]
    transcriber: CliTranscriber,

    /// whisper.cpp model file, downloaded into the cache on first use
    #[arg(long, default_value = MODEL_NAME)]
    whisper_model: String,
}

#[derive(Args)]
struct OutputArgs {
    /// Write the result in these formats (repeatable)
    #[arg(short, long = "export", value_enum)]
    exports: Vec<CliExport>,

    /// Directory for exported files
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// File name (without extension) for exported files
    #[arg(short, long)]
    name: Option<String>,
}

impl OutputArgs {
    fn formats(&self) -> Vec<ExportFormat> {
        let mut formats: Vec<ExportFormat> = Vec::new();
        for format in self.exports.iter().copied().map(ExportFormat::from) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }
}

extern "C" fn whisper_log_callback(
    _level: u32,
    _message: *const std::ffi::c_char,
    _user_data: *mut std::ffi::c_void,
) {
    // silent
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Process(args) => commands::process::run(args).await,
        Command::Transcribe(args) => commands::transcribe::run(args).await,
        Command::Login { provider, key } => commands::login::run(provider.into(), &key).await,
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if !cli.verbose {
        unsafe {
            whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
        }
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn process_accepts_a_url_with_options() {
        let cli = Cli::try_parse_from([
            "konspekt",
            "process",
            "https://youtu.be/dQw4w9WgXcQ",
            "--task",
            "Main points",
            "--lang",
            "fr",
            "--export",
            "pdf",
            "--export",
            "docx",
            "--export",
            "pdf",
        ])
        .unwrap();
        let Command::Process(args) = cli.command else {
            panic!("expected process");
        };
        assert_eq!(args.url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(args.lang, Some(TargetLanguage::French));
        assert_eq!(args.output.formats(), [ExportFormat::Pdf, ExportFormat::Docx]);
        assert!(args.transcription.transcriber == CliTranscriber::Local);
    }

    #[test]
    fn process_needs_exactly_one_source() {
        assert!(Cli::try_parse_from(["konspekt", "process"]).is_err());
        assert!(
            Cli::try_parse_from([
                "konspekt",
                "process",
                "https://youtu.be/dQw4w9WgXcQ",
                "--file",
                "talk.mp3",
            ])
            .is_err()
        );
        assert!(Cli::try_parse_from(["konspekt", "process", "--file", "talk.mp3"]).is_ok());
    }

    #[test]
    fn unknown_language_is_rejected() {
        let err = Cli::try_parse_from([
            "konspekt",
            "process",
            "https://youtu.be/dQw4w9WgXcQ",
            "--lang",
            "Klingon",
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("unknown language"));
    }

    #[test]
    fn login_takes_provider_and_key() {
        let cli = Cli::try_parse_from(["konspekt", "login", "grok", "xai-123"]).unwrap();
        match cli.command {
            Command::Login { provider, key } => {
                assert_eq!(Provider::from(provider), Provider::Grok);
                assert_eq!(key, "xai-123");
            }
            _ => panic!("expected login"),
        }
    }
}
