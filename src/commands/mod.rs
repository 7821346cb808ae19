pub mod check;
pub mod copy;
pub mod generate;
pub mod init;
pub mod list;
pub mod migrate;
pub mod new;
pub mod remove;
pub mod rename;
pub mod show;
pub mod upgrade;

use crate::config::Config;
use crate::error::Result;
use crate::identity::{IdentitySource, OsIdentity};
use crate::migrate::Upgrader;
use crate::registry::Snippetor;
use crate::store::{JsonFileStore, SnippetFiles};

/// Open the registry for the configured vault.
pub fn open_registry(config: &Config) -> Result<Snippetor> {
    let identity: Box<dyn IdentitySource> = Box::new(OsIdentity::new());
    Snippetor::open(
        Box::new(JsonFileStore::new(config.settings_path())),
        Box::new(SnippetFiles::new(config.snippets_dir())),
        Upgrader::with_identity(config.upgrade_options(), identity),
    )
}
