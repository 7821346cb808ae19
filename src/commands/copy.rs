use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Format};

pub fn run(config: &Config, key: &str, format: Format) -> Result<()> {
    let mut registry = super::open_registry(config)?;
    let (copy, notice) = registry.copy(key)?;
    eprintln!("{notice}");
    output::print_snippet(&copy, format)
}
