use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Format};

pub fn run(config: &Config, key: &str, format: Format) -> Result<()> {
    let registry = super::open_registry(config)?;
    let cfg = registry.get(key)?;
    let issues = registry.validate_task_markers(cfg.id())?;
    output::print_marker_issues(cfg, &issues, format)
}
