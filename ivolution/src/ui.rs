use colored::*;

pub fn success(msg: &str) {
    tracing::info!("{} {}", "✓".green(), msg.green());
}

pub fn info(msg: &str) {
    tracing::info!("{}", msg);
}

pub fn warning(msg: &str) {
    tracing::warn!("{}", msg.yellow());
}

pub fn tip(msg: &str) {
    tracing::info!("{} {}", "Tip:".dimmed(), msg.dimmed());
}

/// Reports why a command failed: the outermost context first, then each
/// underlying cause on its own line.
pub fn failure(err: &anyhow::Error) {
    let mut lines = error_lines(err).into_iter();
    if let Some(headline) = lines.next() {
        tracing::error!("{}", headline.red());
    }
    for cause in lines {
        tracing::error!("  {} {}", "caused by:".dimmed(), cause);
    }
}

fn error_lines(err: &anyhow::Error) -> Vec<String> {
    err.chain().map(ToString::to_string).collect()
}
