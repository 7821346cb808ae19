use crate::config::Config;
use crate::error::Result;
use crate::model::SnippetKind;
use crate::output::{self, Format};

pub fn run(config: &Config, kind: SnippetKind, name: Option<&str>, format: Format) -> Result<()> {
    let mut registry = super::open_registry(config)?;
    let cfg = registry.create(kind, name)?;
    output::print_snippet(&cfg, format)
}
