// Terminal reporting for tyre commands
// Everything goes to stderr; stdout is kept for machine-readable results

/// Right-aligned cyan verb ahead of what the command is doing ("   Resolving run 3 ...")
pub fn status(action: &str, message: &str) {
    eprintln!("\x1b[1;36m{:>12}\x1b[0m {}", action, message);
}

/// Final line of a command that did its work
pub fn success(message: &str) {
    eprintln!("\x1b[1;32m  \u{2713}\x1b[0m {}", message);
}

/// Final line of a failed resolution or generation
pub fn failure(message: &str) {
    eprintln!("\x1b[1;31m  \u{2717}\x1b[0m {}", message);
}

/// A file or input that was found
pub fn check(message: &str) {
    eprintln!("\x1b[32m  \u{2713}\x1b[0m {}", message);
}

/// Skipped jobs and cycle notices
pub fn warning(message: &str) {
    eprintln!("\x1b[33m  !\x1b[0m {}", message);
}

pub fn info(message: &str) {
    eprintln!("\x1b[36m  i\x1b[0m {}", message);
}

/// Job tree lines and absent files
pub fn dim(message: &str) {
    eprintln!("\x1b[2m{}\x1b[0m", message);
}

/// Solver run that exited cleanly
pub fn dim_success(message: &str) {
    eprintln!("\x1b[32m{}\x1b[0m", message);
}

/// Solver run that exited with an error
pub fn dim_failure(message: &str) {
    eprintln!("\x1b[31m{}\x1b[0m", message);
}

/// One line of captured solver stdout, shown under a failed job
pub fn solver_output(line: &str) {
    eprintln!("\x1b[31m        | {}\x1b[0m", line);
}

/// Title for a job's status report
pub fn header(message: &str) {
    eprintln!("\x1b[1m==> {}\x1b[0m", message);
}
