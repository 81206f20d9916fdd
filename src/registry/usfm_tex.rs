//! usfmTex component — renders scripture text by invoking a TeX engine.
//!
//! The engine is an external black box: it gets the composed document
//! source path as its argument and reports through its exit code. Runs are
//! timeout-bounded and the child is killed if the timeout elapses.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use super::{Category, Handler, HandlerFactory, RenderResult};
use crate::constants::{
    DEFAULT_TEX_ENGINE, KEY_PROJECT_PATH, KEY_TEX_ENGINE, KEY_TEX_TIMEOUT,
    TEX_DEFAULT_TIMEOUT_SECS,
};
use crate::scope::Scope;
use crate::settings::ScopedSettings;

/// Factory for the `usfmTex` component type.
pub struct UsfmTexFactory;

impl HandlerFactory for UsfmTexFactory {
    fn category(&self) -> Category {
        Category::Component
    }

    fn type_name(&self) -> &str {
        "usfmTex"
    }

    fn create(&self, settings: ScopedSettings) -> Box<dyn Handler> {
        Box::new(UsfmTexHandler { settings })
    }
}

/// One render attempt for one scripture component.
pub struct UsfmTexHandler {
    settings: ScopedSettings,
}

#[async_trait::async_trait]
impl Handler for UsfmTexHandler {
    async fn render(self: Box<Self>, scope: &Scope) -> Result<RenderResult> {
        let group = scope.require_group()?;
        let component = scope.require_component()?;

        let engine = self
            .settings
            .get(KEY_TEX_ENGINE)
            .unwrap_or(DEFAULT_TEX_ENGINE)
            .to_string();
        let timeout_secs = self
            .settings
            .u64(KEY_TEX_TIMEOUT)?
            .unwrap_or(TEX_DEFAULT_TIMEOUT_SECS);
        let project_dir = PathBuf::from(self.settings.require(KEY_PROJECT_PATH)?);

        // Composed document source, relative to the project directory.
        let source = PathBuf::from(group).join(format!("{}.tex", component));

        let mut cmd = tokio::process::Command::new(&engine);
        cmd.arg(&source);
        cmd.current_dir(&project_dir);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        // On timeout the child future is dropped; make sure the engine dies
        // with it instead of running unattended.
        cmd.kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                return Ok(RenderResult::ExternalToolFailure {
                    code: None,
                    stderr: format!("failed to start '{}': {}", engine, e),
                });
            }
        };

        let result = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            child.wait_with_output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    Ok(RenderResult::Success)
                } else {
                    Ok(RenderResult::ExternalToolFailure {
                        code: output.status.code(),
                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    })
                }
            }
            Ok(Err(e)) => Ok(RenderResult::ExternalToolFailure {
                code: None,
                stderr: format!("failed to run '{}': {}", engine, e),
            }),
            Err(_) => Ok(RenderResult::ExternalToolFailure {
                code: None,
                stderr: format!("'{}' timed out after {}s", engine, timeout_secs),
            }),
        }
    }
}
