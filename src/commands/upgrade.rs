use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Format};

/// Rewrite stored snippets in the current schema. `dry_run` only reports.
pub fn run(config: &Config, dry_run: bool, format: Format) -> Result<()> {
    let mut registry = super::open_registry(config)?;
    let report = registry.upgrade_all(dry_run)?;
    output::print_upgrade_report(&report, format)
}
