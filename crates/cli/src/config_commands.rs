use joingate_config::{JoingateConfig, Severity, ValidationResult};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print diagnostics for `config` and exit non-zero when any is an error.
pub fn check(config: &JoingateConfig) -> anyhow::Result<()> {
    let result = joingate_config::validate(config);
    print_report(&result);

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(result: &ValidationResult) {
    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if !result.diagnostics.is_empty() {
        eprintln!();
    }
    eprintln!("{}", summary(errors, warnings));
}

fn summary(errors: usize, warnings: usize) -> String {
    if errors == 0 && warnings == 0 {
        "No issues found.".into()
    } else {
        format!("{errors} error(s), {warnings} warning(s)")
    }
}
