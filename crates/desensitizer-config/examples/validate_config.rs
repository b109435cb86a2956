use std::env;
use std::path::PathBuf;

use desensitizer_config::{ValidationReport, read_config_document, validate_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("missing config path")?;

    let document = read_config_document(&config_path)?;
    let validated = match validate_config(&document) {
        Ok(validated) => validated,
        Err(report) => {
            eprintln!("config validation failed");
            print_report(&report);
            std::process::exit(1);
        }
    };

    if validated.warnings.is_empty() {
        println!("config validated successfully");
    } else {
        eprintln!("config validated with warnings:");
        print_report(&ValidationReport {
            errors: Vec::new(),
            warnings: validated.warnings,
        });
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in report.errors.iter().chain(report.warnings.iter()) {
        eprintln!("{issue}");
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
}
