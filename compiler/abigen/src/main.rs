//! abigen CLI
//!
//! `abigen -manifest plugin.json -output out/ -lang cpp [-overwrite]`

use std::path::PathBuf;
use std::process::ExitCode;

use abigen::{run, Options};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("Usage: abigen -manifest <file> -output <dir> -lang <language> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -manifest <file>   Path to the plugin manifest JSON (required)");
    eprintln!("  -output <dir>      Output directory (required)");
    eprintln!("  -lang <language>   Target language: cpp, csharp, python (required)");
    eprintln!("  -overwrite         Overwrite existing files");
    eprintln!("  -verbose           Enable verbose output");
    eprintln!("  -version           Show version");
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();
    let mut show_version = false;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].trim_start_matches('-');
        match flag {
            "manifest" | "output" | "lang" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("error: -{flag} requires a value");
                    print_usage();
                    return ExitCode::FAILURE;
                };
                match flag {
                    "manifest" => options.manifest_path = PathBuf::from(value),
                    "output" => options.output_dir = PathBuf::from(value),
                    _ => options.language = value.clone(),
                }
                i += 2;
            }
            "overwrite" => {
                options.overwrite = true;
                i += 1;
            }
            "verbose" | "v" => {
                options.verbose = true;
                i += 1;
            }
            "version" => {
                show_version = true;
                i += 1;
            }
            "help" | "h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("error: unknown flag {}", args[i]);
                print_usage();
                return ExitCode::FAILURE;
            }
        }
    }

    if show_version {
        println!("abigen v{VERSION}");
        return ExitCode::SUCCESS;
    }

    if options.manifest_path.as_os_str().is_empty()
        || options.output_dir.as_os_str().is_empty()
        || options.language.is_empty()
    {
        eprintln!("error: -manifest, -output, and -lang are required");
        eprintln!();
        print_usage();
        return ExitCode::FAILURE;
    }

    if options.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    match run(&options) {
        Ok(summary) => {
            if options.verbose {
                println!(
                    "Loaded plugin: {} (version {}), {} methods",
                    summary.plugin_name, summary.plugin_version, summary.method_count
                );
                for path in &summary.written {
                    println!("Generated: {}", path.display());
                }
            }
            println!(
                "Generated {} {} binding file(s) in {}",
                summary.written.len(),
                options.language,
                options.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
