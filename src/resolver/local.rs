//! Local asset lookup across legacy on-disk layouts.
//!
//! # Responsibilities
//! - Generate candidate paths, one strategy per layout
//! - Pick the first candidate that is an existing regular file
//! - Open it, surfacing real I/O faults
//!
//! # Design Decisions
//! - Strategies are ordered; order is precedence
//! - "Does not exist" and "parent is not a directory" are misses, every other
//!   I/O error is a fault

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;

use crate::resolver::content_type::{content_type_for, MimeTable};
use crate::resolver::error::ResolveError;
use crate::resolver::path::RelativePath;

/// Produces one candidate location for a request path.
pub trait CandidateStrategy: Send + Sync + fmt::Debug {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Candidate path under `root`, or `None` if the strategy does not apply.
    fn candidate(&self, root: &Path, path: &RelativePath) -> Option<PathBuf>;
}

/// `root/<request path>`, preserving the full relative structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl CandidateStrategy for Direct {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn candidate(&self, root: &Path, path: &RelativePath) -> Option<PathBuf> {
        Some(path.segments().fold(root.to_path_buf(), |acc, s| acc.join(s)))
    }
}

/// `root/tickets/<id>/<file>` for paths shaped `tickets/<digits>/<file>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketScoped;

impl CandidateStrategy for TicketScoped {
    fn name(&self) -> &'static str {
        "ticket"
    }

    fn candidate(&self, root: &Path, path: &RelativePath) -> Option<PathBuf> {
        let (id, file) = path.ticket_parts()?;
        let base = root.join("tickets").join(id);
        Some(
            file.split('/')
                .filter(|s| !s.is_empty())
                .fold(base, |acc, s| acc.join(s)),
        )
    }
}

/// `root/<dir>/<base filename>`, ignoring any directories in the request.
#[derive(Debug, Clone)]
pub struct FlatLegacy {
    dir: &'static str,
    name: &'static str,
}

impl FlatLegacy {
    pub fn contracts() -> Self {
        Self {
            dir: "Contracts",
            name: "contracts",
        }
    }

    pub fn images() -> Self {
        Self {
            dir: "Images",
            name: "images",
        }
    }
}

impl CandidateStrategy for FlatLegacy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn candidate(&self, root: &Path, path: &RelativePath) -> Option<PathBuf> {
        Some(root.join(self.dir).join(path.file_name()?))
    }
}

/// `<dir>/<request path>` in a directory outside the search root.
#[derive(Debug, Clone)]
pub struct Relocated {
    dir: PathBuf,
}

impl Relocated {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CandidateStrategy for Relocated {
    fn name(&self) -> &'static str {
        "relocated"
    }

    fn candidate(&self, _root: &Path, path: &RelativePath) -> Option<PathBuf> {
        Direct.candidate(&self.dir, path)
    }
}

/// An opened local file ready to stream.
#[derive(Debug)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Strategy that found it.
    pub strategy: &'static str,
    pub content_type: Option<&'static str>,
    pub len: u64,
    pub file: File,
}

/// Searches a root directory with an ordered list of strategies.
#[derive(Debug)]
pub struct LocalResolver {
    root: PathBuf,
    strategies: Vec<Box<dyn CandidateStrategy>>,
    mime_table: MimeTable,
}

impl LocalResolver {
    /// Asset layout: direct > ticket-scoped > Contracts > Images.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_strategies(
            root,
            vec![
                Box::new(Direct),
                Box::new(TicketScoped),
                Box::new(FlatLegacy::contracts()),
                Box::new(FlatLegacy::images()),
            ],
        )
    }

    /// Flat uploads layout: the root, then the pre-migration directory.
    pub fn legacy_uploads(root: impl Into<PathBuf>, old_dir: Option<PathBuf>) -> Self {
        let mut strategies: Vec<Box<dyn CandidateStrategy>> = vec![Box::new(Direct)];
        if let Some(dir) = old_dir {
            strategies.push(Box::new(Relocated::new(dir)));
        }
        let mut resolver = Self::with_strategies(root, strategies);
        resolver.mime_table = MimeTable::LegacyUploads;
        resolver
    }

    pub fn with_strategies(
        root: impl Into<PathBuf>,
        strategies: Vec<Box<dyn CandidateStrategy>>,
    ) -> Self {
        Self {
            root: root.into(),
            strategies,
            mime_table: MimeTable::Assets,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find and open the first matching file.
    pub async fn find(&self, path: &RelativePath) -> Result<Option<LocalFile>, ResolveError> {
        let candidates = self
            .strategies
            .iter()
            .filter_map(|s| s.candidate(&self.root, path).map(|c| (s.name(), c)))
            .collect::<Vec<_>>();

        let Some((strategy, found)) = first_existing(candidates).await? else {
            return Ok(None);
        };

        let file = File::open(&found).await.map_err(|source| ResolveError::Io {
            path: found.clone(),
            source,
        })?;
        let len = file
            .metadata()
            .await
            .map_err(|source| ResolveError::Io {
                path: found.clone(),
                source,
            })?
            .len();

        tracing::debug!(path = %found.display(), strategy, "Local asset found");

        Ok(Some(LocalFile {
            content_type: content_type_for(&found, self.mime_table),
            path: found,
            strategy,
            len,
            file,
        }))
    }
}

/// Return the first candidate that is an existing regular file.
pub async fn first_existing<I>(candidates: I) -> Result<Option<(&'static str, PathBuf)>, ResolveError>
where
    I: IntoIterator<Item = (&'static str, PathBuf)>,
{
    for (name, candidate) in candidates {
        if is_regular_file(&candidate).await? {
            return Ok(Some((name, candidate)));
        }
    }
    Ok(None)
}

async fn is_regular_file(path: &Path) -> Result<bool, ResolveError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if is_miss(&e) => Ok(false),
        Err(source) => Err(ResolveError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn is_miss(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
