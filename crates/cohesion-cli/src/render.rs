//! Chart rendering through an external interpreter.

use std::path::{Path, PathBuf};
use std::process::Command;

use cohesion_core::config::RenderConfig;
use cohesion_core::render::{ChartRenderer, NoopRenderer, RenderError};
use tracing::{debug, info};

/// Runs `<program> <script> <table> <image>`.
#[derive(Debug, Clone)]
pub struct ScriptRenderer {
    program: String,
    script: PathBuf,
}

impl ScriptRenderer {
    pub fn new(program: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
        }
    }
}

impl ChartRenderer for ScriptRenderer {
    fn render(&self, table: &Path, image: &Path) -> Result<(), RenderError> {
        debug!(
            program = %self.program,
            script = %self.script.display(),
            table = %table.display(),
            "launching chart renderer"
        );
        let status = Command::new(&self.program)
            .arg(&self.script)
            .arg(table)
            .arg(image)
            .status()
            .map_err(|source| RenderError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(RenderError::Failed {
                program: self.program.clone(),
                status: status.code().unwrap_or(-1),
                image: image.to_path_buf(),
            });
        }
        info!(image = %image.display(), "chart rendered");
        Ok(())
    }
}

/// Renderer for the resolved config: a script renderer when a script is set,
/// otherwise nothing is drawn.
pub fn from_config(config: &RenderConfig) -> Box<dyn ChartRenderer> {
    match &config.script {
        Some(script) => Box::new(ScriptRenderer::new(config.program.clone(), script.clone())),
        None => Box::new(NoopRenderer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_launch_error() {
        let r = ScriptRenderer::new("coh-no-such-interpreter", "plot.R");
        let err = r
            .render(Path::new("t.csv"), Path::new("t.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Launch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_failure() {
        let r = ScriptRenderer::new("false", "plot.R");
        let err = r
            .render(Path::new("t.csv"), Path::new("t.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Failed { status: 1, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_succeeds() {
        let r = ScriptRenderer::new("true", "plot.R");
        assert!(r.render(Path::new("t.csv"), Path::new("t.png")).is_ok());
    }
}
