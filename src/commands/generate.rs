use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Format};
use crate::registry::Notice;

/// Write stylesheets for the given snippets, or for every snippet with `all`.
pub fn run(config: &Config, keys: &[String], all: bool, format: Format) -> Result<()> {
    let mut registry = super::open_registry(config)?;
    let ids: Vec<String> = if all {
        registry.all().iter().map(|cfg| cfg.id().to_string()).collect()
    } else {
        keys.to_vec()
    };

    let mut notices: Vec<Notice> = Vec::with_capacity(ids.len());
    for id in &ids {
        notices.push(registry.generate_css(id)?);
    }

    match format {
        Format::Json => println!("{}", serde_json::to_string(&notices)?),
        _ => {
            for notice in &notices {
                output::print_notice(notice, format)?;
            }
        }
    }
    Ok(())
}
