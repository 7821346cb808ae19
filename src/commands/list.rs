use crate::config::Config;
use crate::error::Result;
use crate::model::SnippetKind;
use crate::output::{self, Format};

pub fn run(config: &Config, kind: Option<SnippetKind>, format: Format) -> Result<()> {
    let registry = super::open_registry(config)?;
    let snippets: Vec<_> = registry
        .all()
        .into_iter()
        .filter(|cfg| kind.is_none_or(|k| cfg.kind() == k))
        .collect();
    output::print_snippets(&snippets, format)
}
