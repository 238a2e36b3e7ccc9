//! Serving files from the configured directory.
//!
//! Every outcome becomes a response: a missing file is a 404, an I/O
//! failure after the file was opened is a 500.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::http::mime;
use crate::http::response::{ContentType, Response, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file name {0:?} escapes the served directory")]
    InvalidName(String),
    #[error("cannot open {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot allocate {size} bytes for {path}")]
    Alloc { path: PathBuf, size: u64 },
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: read {actual} of {expected} bytes")]
    ShortRead {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

impl FileError {
    pub fn status(&self) -> StatusCode {
        match self {
            FileError::InvalidName(_) | FileError::NotFound { .. } | FileError::NotAFile(_) => {
                StatusCode::NotFound
            }
            _ => StatusCode::InternalServerError,
        }
    }

    fn body(&self) -> &'static str {
        match self {
            FileError::InvalidName(_) | FileError::NotFound { .. } | FileError::NotAFile(_) => {
                "<html> File Not Found </html>"
            }
            FileError::Stat { .. } => "<html>Could not stat file</html>",
            FileError::Alloc { .. } => "<html>Memory error</html>",
            FileError::Read { .. } | FileError::ShortRead { .. } => {
                "<html>Could not read file</html>"
            }
        }
    }

    pub fn into_response(self) -> Response {
        Response::html(self.status(), self.body())
    }
}

/// A file read fully into memory.
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub mime: &'static str,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FileResponder {
    root: PathBuf,
}

impl FileResponder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Joins `name` onto the served directory.
    ///
    /// Only plain components are accepted: `..`, `.`, absolute paths and
    /// drive prefixes yield `None`.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let mut components = relative.components().peekable();
        components.peek()?;
        if components.all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(relative))
        } else {
            None
        }
    }

    pub async fn load(&self, name: &str) -> Result<LoadedFile, FileError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| FileError::InvalidName(name.to_string()))?;

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(source) => return Err(FileError::NotFound { path, source }),
        };

        let metadata = match file.metadata().await {
            Ok(metadata) => metadata,
            Err(source) => return Err(FileError::Stat { path, source }),
        };
        if !metadata.is_file() {
            return Err(FileError::NotAFile(path));
        }
        let size = metadata.len();

        let mut contents = Vec::new();
        let reserved = usize::try_from(size)
            .ok()
            .and_then(|n| contents.try_reserve_exact(n).ok());
        if reserved.is_none() {
            return Err(FileError::Alloc { path, size });
        }

        // read_to_end loops until EOF; the cap pins the body to the stat size.
        let read = file.take(size).read_to_end(&mut contents).await;
        let actual = match read {
            Ok(n) => n as u64,
            Err(source) => return Err(FileError::Read { path, source }),
        };
        if actual != size {
            return Err(FileError::ShortRead {
                path,
                expected: size,
                actual,
            });
        }

        Ok(LoadedFile {
            mime: mime::guess(&path),
            path,
            contents,
        })
    }

    /// Produces the response for `/file/{name}`.
    pub async fn serve(&self, name: &str) -> Response {
        match self.load(name).await {
            Ok(file) => {
                tracing::debug!(
                    path = %file.path.display(),
                    size = file.contents.len(),
                    mime = file.mime,
                    "Serving file"
                );
                Response::build(StatusCode::Ok, ContentType::Mime(file.mime), file.contents)
            }
            Err(e) => {
                match e.status() {
                    StatusCode::NotFound => tracing::debug!(error = %e, "File not served"),
                    _ => tracing::error!(error = %e, "Failed to serve file"),
                }
                e.into_response()
            }
        }
    }
}
