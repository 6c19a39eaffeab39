use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};
use crate::tags::{self, Tags};

/// File name prefix marking a tag file inside a repository directory.
pub const TAG_PREFIX: &str = "tag_";

/// Pre-rendered image list of a repository, only ever served by the static file handler.
pub const INDEX_IMAGES: &str = "_index_images";

/// A `<user>/<name>` pair identifying a repository. Both parts are taken verbatim from the
/// request and are only used to build a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryName {
    pub user: String,
    pub name: String,
}

impl RepositoryName {
    pub fn new(user: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
        }
    }
}

/// The JSON descriptor of an image along with the size of its layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageJson {
    /// Raw bytes of `images/<id>/json`.
    pub body: Vec<u8>,
    /// Byte length of `images/<id>/layer`.
    pub size: u64,
}

/// Maps registry identifiers onto the data directory and reads from it.
#[derive(Clone, Debug)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repository_dir(&self, repository: &RepositoryName) -> PathBuf {
        self.root
            .join("repositories")
            .join(&repository.user)
            .join(&repository.name)
    }

    pub fn image_dir(&self, id: &str) -> PathBuf {
        self.root.join("images").join(id)
    }

    pub fn image_json_path(&self, id: &str) -> PathBuf {
        self.image_dir(id).join("json")
    }

    pub fn image_layer_path(&self, id: &str) -> PathBuf {
        self.image_dir(id).join("layer")
    }

    /// Lists the `tag_*` files of a repository.
    ///
    /// A repository directory that does not exist is reported as a not-found [`Error::Io`]; an
    /// existing directory without any tag files yields an empty list.
    pub fn tag_files(&self, repository: &RepositoryName) -> Result<Vec<PathBuf>> {
        resolvable(&repository.user)?;
        resolvable(&repository.name)?;
        let dir = self.repository_dir(repository);
        let metadata = fs::metadata(&dir).map_err(|e| Error::io(&dir, e))?;
        if !metadata.is_dir() {
            return Err(Error::io(
                &dir,
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        // repository names come from the request, only the suffix is a pattern
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());
        let pattern = Path::new(&escaped).join(format!("{TAG_PREFIX}*"));

        let files = glob::glob(&pattern.to_string_lossy())?
            .collect::<std::result::Result<Vec<PathBuf>, glob::GlobError>>()?;
        tracing::trace!("{} tag files under {}", files.len(), dir.display());
        Ok(files)
    }

    /// Reads the image id stored in a tag file. The content is returned as-is, whitespace
    /// included.
    pub fn read_tag(&self, path: &Path) -> Result<String> {
        let data = fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Builds the tag name to image id mapping of a repository.
    pub fn tags(&self, repository: &RepositoryName) -> Result<Tags> {
        let files = self.tag_files(repository)?;
        tags::collect(files, |path| self.read_tag(path))
    }

    /// Reads the JSON descriptor of an image and stats its layer. Both files must exist.
    pub fn image_json(&self, id: &str) -> Result<ImageJson> {
        resolvable(id)?;
        let json_path = self.image_json_path(id);
        let body = fs::read(&json_path).map_err(|e| Error::io(&json_path, e))?;

        let layer_path = self.image_layer_path(id);
        let size = fs::metadata(&layer_path)
            .map_err(|e| Error::io(&layer_path, e))?
            .len();

        Ok(ImageJson { body, size })
    }
}

/// Identifiers name exactly one directory below their collection. Anything that would resolve
/// elsewhere is reported like an identifier that does not exist.
fn resolvable(segment: &str) -> Result<()> {
    let escapes = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if escapes {
        return Err(Error::io(
            segment,
            io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }
    Ok(())
}
