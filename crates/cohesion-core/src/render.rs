//! Seam to an external chart renderer.
//!
//! The engine only produces export tables. Turning a table into an image is
//! delegated to whatever implements [`ChartRenderer`].

use std::io;
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to launch renderer `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("renderer `{program}` exited with status {status} while drawing {}", image.display())]
    Failed {
        program: String,
        status: i32,
        image: PathBuf,
    },
}

impl RenderError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::RenderFailed
    }
}

/// Given an export table on disk and an output path, produce a chart image.
pub trait ChartRenderer {
    /// Render the CSV table at `table` into an image at `image`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the renderer cannot run or fails.
    fn render(&self, table: &Path, image: &Path) -> Result<(), RenderError>;
}

/// Renderer that draws nothing; used when no chart script is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl ChartRenderer for NoopRenderer {
    fn render(&self, _table: &Path, _image: &Path) -> Result<(), RenderError> {
        Ok(())
    }
}
