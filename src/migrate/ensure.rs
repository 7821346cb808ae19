use serde_json::{Map, Value};

/// Walk `keys` from `root`, inserting `{}` wherever a key is absent.
///
/// Existing values are never replaced, including `false`, `0` and `""`.
/// A non-object value on the path ends the walk, since nothing can be
/// created beneath it. Returns `true` if anything was inserted.
pub fn ensure_path(root: &mut Value, keys: &[&str]) -> bool {
    let mut inserted = false;
    let mut current = root;

    for key in keys {
        let Some(object) = current.as_object_mut() else {
            break;
        };
        if !object.contains_key(*key) {
            object.insert((*key).to_string(), Value::Object(Map::new()));
            inserted = true;
        }
        let Some(next) = object.get_mut(*key) else {
            break;
        };
        current = next;
    }

    inserted
}

/// Nested objects every task entry must carry after normalization.
pub const TASK_ENTRY_PATHS: &[&[&str]] = &[
    &["checkbox", "lightMode"],
    &["checkbox", "darkMode"],
    &["li", "lightMode"],
    &["li", "darkMode"],
];

/// Nested objects every folder entry must carry after normalization.
pub const FOLDER_ENTRY_PATHS: &[&[&str]] = &[&["lightMode"], &["darkMode"]];

pub fn ensure_paths(root: &mut Value, paths: &[&[&str]]) -> bool {
    paths
        .iter()
        .fold(false, |inserted, path| ensure_path(root, path) | inserted)
}
