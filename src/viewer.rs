use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use color_eyre::eyre::{eyre, Result};

/// Opens a screenshot referenced by a fixture.
pub trait ImageViewer {
    fn show(&self, path: &Path) -> Result<()>;
}

/// Spawns a user-supplied command, or the platform opener when none is configured.
#[derive(Debug, Clone, Default)]
pub struct SystemImageViewer {
    /// Program plus leading arguments, split on whitespace. The path is appended.
    pub command: Option<String>,
    /// Relative screenshot paths resolve against this directory.
    pub base_dir: Option<PathBuf>,
}

impl SystemImageViewer {
    pub fn new(command: Option<String>, base_dir: Option<PathBuf>) -> Self {
        Self { command, base_dir }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageViewer for SystemImageViewer {
    fn show(&self, path: &Path) -> Result<()> {
        let path = self.resolve(path);
        if !path.exists() {
            return Err(eyre!("Screenshot not found: {}", path.display()));
        }

        if let Some(command) = &self.command {
            let mut parts = command.split_whitespace();
            let program = parts
                .next()
                .ok_or_else(|| eyre!("Viewer command is empty"))?;
            tracing::info!(program, path = %path.display(), "launching image viewer");
            return spawn_detached(Command::new(program).args(parts).arg(&path))
                .map_err(|e| eyre!("Failed to launch {program}: {e}"));
        }

        open_with_platform(&path)
    }
}

fn spawn_detached(cmd: &mut Command) -> std::io::Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

/// Compile-time detection for Windows/macOS, runtime detection for WSL.
fn open_with_platform(path: &Path) -> Result<()> {
    if cfg!(target_os = "windows") {
        // Empty "" title keeps the path from being read as a window title
        return spawn_detached(Command::new("cmd").args(["/C", "start", ""]).arg(path))
            .map_err(|e| eyre!("Failed to open image: {e}"));
    }

    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if std::env::var_os("WSL_DISTRO_NAME").is_some() {
        "wslview"
    } else {
        "xdg-open"
    };

    tracing::info!(opener, path = %path.display(), "opening screenshot");
    match spawn_detached(Command::new(opener).arg(path)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(eyre!(
            "No image opener found. Pass --viewer, or install xdg-utils (wslu on WSL)."
        )),
        Err(e) => Err(eyre!("Failed to open image with {opener}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_base() {
        let viewer = SystemImageViewer::new(None, Some(PathBuf::from("/reports/run1")));
        assert_eq!(
            viewer.resolve(Path::new("shots/a.png")),
            PathBuf::from("/reports/run1/shots/a.png")
        );
        assert_eq!(
            viewer.resolve(Path::new("/abs/b.png")),
            PathBuf::from("/abs/b.png")
        );
    }

    #[test]
    fn no_base_keeps_path() {
        let viewer = SystemImageViewer::default();
        assert_eq!(viewer.resolve(Path::new("a.png")), PathBuf::from("a.png"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let viewer = SystemImageViewer::new(Some("true".into()), None);
        let err = viewer
            .show(Path::new("/definitely/not/here.png"))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn empty_command_is_an_error() {
        let dir = std::env::temp_dir();
        let viewer = SystemImageViewer::new(Some("   ".into()), None);
        let err = viewer.show(&dir).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
