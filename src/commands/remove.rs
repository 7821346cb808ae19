use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Format};

pub fn run(config: &Config, key: &str, format: Format) -> Result<()> {
    let mut registry = super::open_registry(config)?;
    let notice = registry.remove(key)?;
    output::print_notice(&notice, format)
}
