use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use qdox::{
    EquationConverter, ExportFormat, ExtractConfig, MtefCommandConverter, NullConverter, Package,
    export, extract_questions,
};

#[derive(Parser)]
#[command(
    name = "qdox",
    version,
    about = "Extract structured exam questions from .docx question banks"
)]
struct Cli {
    /// Path to the .docx question bank
    file: PathBuf,

    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    export: ExportFormat,

    /// Output path; JSON goes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file overriding the extraction defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// External MTEF-to-MathML converter program
    #[arg(long)]
    converter: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = ExtractConfig::load(cli.config.as_deref())?;

    let converter: Box<dyn EquationConverter> = match cli
        .converter
        .clone()
        .or_else(|| config.converter_program.clone())
    {
        Some(program) => Box::new(MtefCommandConverter::new(program)),
        None => Box::new(NullConverter),
    };

    let package = Package::open(&cli.file)?;
    let records = extract_questions(&package, &config, converter.as_ref());
    log::info!("extracted {} question(s)", records.len());

    match cli.export {
        ExportFormat::Json => match cli.output {
            Some(path) => export::write_json(&records, &path)?,
            None => println!("{}", export::to_json(&records)?),
        },
        ExportFormat::Bundle => {
            let path = cli
                .output
                .unwrap_or_else(|| PathBuf::from("questions.zip"));
            export::write_bundle(&records, &path)?;
            log::info!("wrote bundle to {}", path.display());
        }
    }

    Ok(())
}
