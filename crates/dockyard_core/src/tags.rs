use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::Result;
use crate::layout::TAG_PREFIX;

/// Tag name to image id mapping of a single repository, encoded as a flat JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the image id previously stored under `tag`, if any.
    pub fn insert(&mut self, tag: impl Into<String>, id: impl Into<String>) -> Option<String> {
        self.0.insert(tag.into(), id.into())
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Derives the tag name from a tag file path, `.../tag_latest` becomes `latest`. File names that
/// are not valid UTF-8 are converted lossily, the same way tag contents are.
pub fn tag_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    file_name.strip_prefix(TAG_PREFIX).map(str::to_owned)
}

/// Reads every tag file with `read` and gathers the results.
///
/// The first failing read aborts the whole aggregation. When two files map to the same tag name
/// the one read last wins.
pub fn collect<I, F>(files: I, mut read: F) -> Result<Tags>
where
    I: IntoIterator<Item = PathBuf>,
    F: FnMut(&Path) -> Result<String>,
{
    let mut tags = Tags::new();
    for path in files {
        let Some(tag) = tag_name(&path) else {
            tracing::debug!("skipping {}: not a tag file", path.display());
            continue;
        };
        let id = read(&path)?;
        if let Some(previous) = tags.insert(tag.clone(), id) {
            tracing::debug!("tag {tag} defined more than once, dropping {previous}");
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod test {
    use std::io;

    use rstest::*;

    use super::*;
    use crate::errors::Error;

    #[rstest]
    #[case::latest("/data/repositories/library/ubuntu/tag_latest", Some("latest"))]
    #[case::dotted("/data/repositories/library/ubuntu/tag_1.0.2", Some("1.0.2"))]
    #[case::empty("/data/repositories/library/ubuntu/tag_", Some(""))]
    #[case::untagged("/data/repositories/library/ubuntu/_index_images", None)]
    #[case::nested_prefix("/data/tag_dir/latest", None)]
    fn names(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(tag_name(Path::new(path)).as_deref(), expected);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/r").join(OsStr::from_bytes(b"tag_caf\xe9"));
        assert_eq!(tag_name(&path).as_deref(), Some("caf\u{fffd}"));

        let tags = collect(vec![path], |_| Ok(String::from("abc123"))).unwrap();
        assert_eq!(tags.get("caf\u{fffd}"), Some("abc123"));
    }

    #[test]
    fn encodes_flat_object() {
        let mut tags = Tags::new();
        tags.insert("v1", "def456");
        tags.insert("latest", "abc123");
        assert_eq!(
            tags.to_json().unwrap(),
            br#"{"latest":"abc123","v1":"def456"}"#
        );
    }

    #[test]
    fn last_duplicate_wins() {
        let files = vec![
            PathBuf::from("/a/tag_latest"),
            PathBuf::from("/b/tag_latest"),
        ];
        let tags = collect(files, |path| Ok(path.display().to_string())).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("latest"), Some("/b/tag_latest"));
    }

    #[test]
    fn failed_read_discards_everything() {
        let files = vec![
            PathBuf::from("/r/tag_a"),
            PathBuf::from("/r/tag_b"),
            PathBuf::from("/r/tag_c"),
        ];
        let result = collect(files, |path| {
            if path.ends_with("tag_b") {
                Err(Error::io(
                    path,
                    io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                ))
            } else {
                Ok(String::from("id"))
            }
        });
        let err = result.unwrap_err();
        assert!(!err.is_not_found());
    }
}
