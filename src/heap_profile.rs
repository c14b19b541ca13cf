//! Heap profiling session backed by `dhat`.
//!
//! The binary that uses this must install `dhat::Alloc` as its global
//! allocator, otherwise the profile is empty. Only one session may be live
//! per process.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::MemorySettings;
use crate::error::ProfileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapSnapshot {
    pub total_blocks: u64,
    pub total_bytes: u64,
    pub curr_blocks: usize,
    pub curr_bytes: usize,
    pub max_blocks: usize,
    pub max_bytes: usize,
}

impl From<dhat::HeapStats> for HeapSnapshot {
    fn from(stats: dhat::HeapStats) -> Self {
        HeapSnapshot {
            total_blocks: stats.total_blocks,
            total_bytes: stats.total_bytes,
            curr_blocks: stats.curr_blocks,
            curr_bytes: stats.curr_bytes,
            max_blocks: stats.max_blocks,
            max_bytes: stats.max_bytes,
        }
    }
}

pub struct HeapProfile {
    profiler: dhat::Profiler,
    path: PathBuf,
}

impl HeapProfile {
    /// Starts profiling; the artifact is written to
    /// `<profile_dir>/<profile_file>` when the session ends.
    pub fn start(settings: &MemorySettings) -> Result<Self, ProfileError> {
        fs::create_dir_all(&settings.profile_dir).map_err(|source| ProfileError::CreateDir {
            path: settings.profile_dir.clone(),
            source,
        })?;

        let path = settings.profile_path();
        let profiler = dhat::Profiler::builder().file_name(&path).build();
        info!(path = %path.display(), "memory profiling enabled");

        Ok(HeapProfile { profiler, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> HeapSnapshot {
        dhat::HeapStats::get().into()
    }

    /// Stops profiling and writes the artifact.
    pub fn finish(self) -> PathBuf {
        let HeapProfile { profiler, path } = self;
        drop(profiler);
        info!(path = %path.display(), "memory profiling disabled");
        path
    }
}
