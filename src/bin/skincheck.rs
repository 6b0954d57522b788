//! Command-line runner: validate every skin file under a directory.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use walkdir::WalkDir;

use skincheck::ide::{AnalysisHost, HostConfig};
use skincheck::semantic::Severity;

#[derive(Parser)]
#[command(name = "skincheck", about = "Static analyzer for skin XML packs", version)]
struct Args {
    /// Directory (or single file) to check.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Space-separated patterns; any file whose path contains one is skipped.
    #[arg(short, long, value_name = "PATTERNS", default_value = "")]
    ignore: String,

    /// Override the "Skin Elements" class model path.
    #[arg(long, value_name = "FILE")]
    skin_elements: Option<PathBuf>,

    /// Override the "Visual Styles" class model path.
    #[arg(long, value_name = "FILE")]
    visual_styles: Option<PathBuf>,

    /// Override the skins locations from repo.json (repeatable).
    #[arg(long, value_name = "DIR")]
    skins_location: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let started = Instant::now();

    let patterns: Vec<&str> = args.ignore.split_whitespace().collect();
    let files = collect_files(&args.path, &patterns);
    if files.is_empty() {
        eprintln!("No skin files found under {}", args.path.display());
    }

    let overrides = HostConfig {
        skin_elements_path: args.skin_elements.clone(),
        visual_styles_path: args.visual_styles.clone(),
        skins_locations: if args.skins_location.is_empty() {
            None
        } else {
            Some(args.skins_location.clone())
        },
    };

    let mut host = AnalysisHost::new();
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for file in files {
        let uri = file.to_string_lossy().to_string();
        host.configure_for(&uri, &overrides);
        let mut budget = host.new_budget();
        let Some(diagnostics) = host.check_document(&uri, &mut budget) else {
            continue;
        };
        for diagnostic in diagnostics {
            let label = match diagnostic.severity {
                Severity::Error => {
                    errors += 1;
                    "Error"
                }
                Severity::Warning => {
                    warnings += 1;
                    "Warning"
                }
            };
            let start = diagnostic.range.start;
            let mut line = format!(
                "{label}: {} at {}:{}:{}",
                diagnostic.message,
                diagnostic.uri,
                start.line + 1,
                start.column + 1
            );
            for related in &diagnostic.related {
                line.push_str(&format!(
                    " ({} {}:{}:{})",
                    related.message,
                    related.location.uri,
                    related.location.range.start.line + 1,
                    related.location.range.start.column + 1
                ));
            }
            println!("{line}");
        }
    }

    println!("Total Errors: {errors}");
    println!("Total Warnings: {warnings}");
    println!("Finished in {:.2}s", started.elapsed().as_secs_f64());

    if errors > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Skin XML files under the path, skipping ignored patterns.
fn collect_files(path: &PathBuf, patterns: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if path.is_file() {
        files.push(path.clone());
        return files;
    }
    for entry in WalkDir::new(path).sort_by_file_name() {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map(|e| e != "xml").unwrap_or(true) {
            continue;
        }
        let absolute = entry.path().to_string_lossy();
        if patterns.iter().any(|p| absolute.contains(p)) {
            continue;
        }
        // Only documents with a <Skin> root are skin files.
        match std::fs::read_to_string(entry.path()) {
            Ok(text) if text.contains("<Skin") => files.push(entry.path().to_path_buf()),
            _ => {}
        }
    }
    files
}
