use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Format};

/// Print one snippet, or with `css` the stylesheet it would generate.
pub fn run(config: &Config, key: &str, css: bool, format: Format) -> Result<()> {
    let registry = super::open_registry(config)?;
    if css {
        print!("{}", registry.render(key)?);
        return Ok(());
    }
    output::print_snippet(registry.get(key)?, format)
}
