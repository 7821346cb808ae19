use std::hash::{BuildHasher, Hasher, RandomState};

use thiserror::Error;

use crate::model::SnippetCommon;
use crate::version::SchemaVersion;

const ADJECTIVES: &[&str] = &[
    "amber", "ancient", "autumn", "bold", "brave", "breezy", "bright", "calm", "cheerful",
    "clever", "cosmic", "crimson", "curious", "dapper", "dazzling", "eager", "electric",
    "fancy", "fluffy", "fresh", "gentle", "glad", "golden", "graceful", "happy", "hidden",
    "humble", "icy", "jolly", "kind", "lively", "lucky", "mellow", "merry", "misty", "modern",
    "nimble", "noble", "odd", "patient", "plucky", "polite", "proud", "quiet", "quick",
    "rapid", "rustic", "shiny", "silent", "silver", "sleepy", "smooth", "snowy", "spicy",
    "spry", "sunny", "swift", "tidy", "tiny", "velvet", "vivid", "wandering", "witty", "zesty",
];

const NOUNS: &[&str] = &[
    "apple", "badger", "beacon", "bison", "breeze", "brook", "canyon", "cedar", "cloud",
    "comet", "coral", "crane", "daisy", "dolphin", "dune", "ember", "falcon", "fern", "finch",
    "forest", "fox", "galaxy", "garden", "glacier", "harbor", "heron", "island", "jaguar",
    "kettle", "lagoon", "lantern", "lemur", "lotus", "maple", "meadow", "moon", "moose",
    "nebula", "oak", "ocean", "otter", "owl", "panda", "pebble", "pine", "planet", "puffin",
    "quartz", "raven", "reef", "river", "robin", "sparrow", "spruce", "star", "stone",
    "thistle", "tiger", "tulip", "valley", "walrus", "willow", "yak", "zebra",
];

#[derive(Debug, Error)]
#[error("entropy source failed: {0}")]
pub struct EntropyError(pub String);

/// Source of human-readable names and color tokens for new snippets.
pub trait IdentitySource {
    /// Hyphen-joined slug of `words` words, e.g. `brave-otter`.
    fn slug(&mut self, words: usize) -> String;

    /// Random color as `#rrggbb`.
    fn color(&mut self) -> String;
}

impl<T: IdentitySource + ?Sized> IdentitySource for Box<T> {
    fn slug(&mut self, words: usize) -> String {
        (**self).slug(words)
    }

    fn color(&mut self) -> String {
        (**self).color()
    }
}

/// Identity source backed by a byte-filling entropy function.
pub struct RandomIdentity<F> {
    fill: F,
}

pub type OsIdentity = RandomIdentity<fn(&mut [u8]) -> Result<(), EntropyError>>;

impl OsIdentity {
    pub fn new() -> Self {
        Self::with_entropy(os_fill as fn(&mut [u8]) -> Result<(), EntropyError>)
    }
}

impl Default for OsIdentity {
    fn default() -> Self {
        Self::new()
    }
}

fn os_fill(bytes: &mut [u8]) -> Result<(), EntropyError> {
    getrandom::fill(bytes).map_err(|err| EntropyError(err.to_string()))
}

impl<F> RandomIdentity<F>
where
    F: FnMut(&mut [u8]) -> Result<(), EntropyError>,
{
    /// Test hook: inject deterministic bytes.
    pub fn with_entropy(fill: F) -> Self {
        Self { fill }
    }

    fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut buf = [0_u8; N];
        if let Err(err) = (self.fill)(&mut buf) {
            tracing::warn!(%err, "falling back to hasher entropy");
            fallback_fill(&mut buf);
        }
        buf
    }

    fn pick<'a>(&mut self, words: &[&'a str]) -> &'a str {
        let index = u16::from_be_bytes(self.bytes::<2>()) as usize % words.len();
        words[index]
    }
}

/// Per-process keyed hasher output; only used when the OS source fails.
fn fallback_fill(bytes: &mut [u8]) {
    let state = RandomState::new();
    for (i, chunk) in bytes.chunks_mut(8).enumerate() {
        let mut hasher = state.build_hasher();
        hasher.write_usize(i);
        let word = hasher.finish().to_be_bytes();
        chunk.copy_from_slice(&word[..chunk.len()]);
    }
}

impl<F> IdentitySource for RandomIdentity<F>
where
    F: FnMut(&mut [u8]) -> Result<(), EntropyError>,
{
    fn slug(&mut self, words: usize) -> String {
        let words = words.max(1);
        let mut parts = Vec::with_capacity(words);
        for _ in 1..words {
            parts.push(self.pick(ADJECTIVES));
        }
        parts.push(self.pick(NOUNS));
        parts.join("-")
    }

    fn color(&mut self) -> String {
        let [r, g, b] = self.bytes::<3>();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Fresh document id: a slug joined with a color token. Uniqueness is
/// probabilistic.
pub fn generate_id(source: &mut dyn IdentitySource) -> String {
    let slug = source.slug(2);
    let color = source.color();
    format!("{slug}-{}", color.trim_start_matches('#'))
}

/// Assign `id` and `name` when missing, then stamp the schema version.
///
/// This is the last step of every upgrade path. The stamp never lowers a
/// version written by a newer release.
pub fn ensure_identity(
    common: &mut SnippetCommon,
    current: SchemaVersion,
    source: &mut dyn IdentitySource,
) {
    if common.id.trim().is_empty() {
        common.id = generate_id(source);
        tracing::debug!(id = %common.id, "assigned snippet id");
    }
    if common.name.trim().is_empty() {
        common.name = source.slug(2);
        tracing::debug!(name = %common.name, "assigned snippet name");
    }

    match common.version {
        Some(stored) if stored > current => {
            tracing::warn!(
                %stored,
                %current,
                "snippet was written by a newer release; keeping its version"
            );
        }
        _ => common.version = Some(current),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::SnippetKind;

    /// Deterministic identity source: fills with an incrementing counter.
    pub(crate) fn counting_identity()
    -> RandomIdentity<impl FnMut(&mut [u8]) -> Result<(), EntropyError>> {
        let mut next = 0_u8;
        RandomIdentity::with_entropy(move |bytes: &mut [u8]| {
            for b in bytes.iter_mut() {
                *b = next;
                next = next.wrapping_add(1);
            }
            Ok(())
        })
    }

    #[test]
    fn slug_has_requested_word_count() {
        let mut source = counting_identity();
        let slug = source.slug(3);
        assert_eq!(slug.split('-').count(), 3);
        assert!(NOUNS.contains(&slug.rsplit('-').next().unwrap()));
    }

    #[test]
    fn color_is_hex_triplet() {
        let mut source = RandomIdentity::with_entropy(|bytes: &mut [u8]| {
            bytes.copy_from_slice(&[0x9b, 0x11, 0xc1]);
            Ok(())
        });
        assert_eq!(source.color(), "#9b11c1");
    }

    #[test]
    fn failing_entropy_falls_back() {
        let mut source = RandomIdentity::with_entropy(|_: &mut [u8]| {
            Err(EntropyError("unavailable".into()))
        });
        let color = source.color();
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
    }

    #[test]
    fn os_identity_generates_ids() {
        let mut source = OsIdentity::new();
        let id = generate_id(&mut source);
        assert_eq!(id.split('-').count(), 3);
    }

    #[test]
    fn assigns_missing_identity_and_stamps_version() {
        let mut common = SnippetCommon::blank(SnippetKind::Task);
        let current = SchemaVersion::new(0, 1, 7);
        ensure_identity(&mut common, current, &mut counting_identity());

        assert!(!common.id.is_empty());
        assert!(!common.name.is_empty());
        assert_eq!(common.version, Some(current));
    }

    #[test]
    fn existing_identity_is_never_replaced() {
        let mut common = SnippetCommon::blank(SnippetKind::Folder);
        common.id = "keep-me".into();
        common.name = "mine".into();
        let current = SchemaVersion::new(0, 1, 7);

        let mut source = counting_identity();
        ensure_identity(&mut common, current, &mut source);
        ensure_identity(&mut common, current, &mut source);

        assert_eq!(common.id, "keep-me");
        assert_eq!(common.name, "mine");
    }

    #[test]
    fn blank_name_is_regenerated() {
        let mut common = SnippetCommon::blank(SnippetKind::Task);
        common.name = "   ".into();
        ensure_identity(&mut common, SchemaVersion::new(0, 1, 7), &mut counting_identity());
        assert!(!common.name.trim().is_empty());
    }

    #[test]
    fn newer_stored_version_is_not_lowered() {
        let mut common = SnippetCommon::blank(SnippetKind::Task);
        common.version = Some(SchemaVersion::new(0, 3, 0));
        ensure_identity(&mut common, SchemaVersion::new(0, 1, 7), &mut counting_identity());
        assert_eq!(common.version, Some(SchemaVersion::new(0, 3, 0)));
    }
}
