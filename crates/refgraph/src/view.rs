//! Diagram output: write DOT source, run Graphviz, open the result

use crate::dot::GRAPH_NAME;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("graphviz exited with {status}: {stderr}")]
    Graphviz { status: ExitStatus, stderr: String },
}

pub type Result<T> = std::result::Result<T, ViewError>;

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub output_dir: PathBuf,
    /// Graphviz `-T` format
    pub format: String,
    /// Program that opens the rendered file; platform opener when unset
    pub viewer: Option<String>,
    /// Graphviz `dot` executable
    pub dot: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: "pdf".to_string(),
            viewer: None,
            dot: "dot".to_string(),
        }
    }
}

impl ViewConfig {
    /// Load from `HEAPGRAPH_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("HEAPGRAPH_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }

        if let Some(v) = var("HEAPGRAPH_FORMAT") {
            config.format = v.trim().to_lowercase();
        }

        if let Some(v) = var("HEAPGRAPH_VIEWER") {
            config.viewer = Some(v);
        }

        if let Some(v) = var("HEAPGRAPH_DOT") {
            config.dot = v;
        }

        config
    }
}

fn default_output_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("heapgraph")
}

/// File stem for a given input document, stable across runs
pub fn artifact_stem(document: &[u8]) -> String {
    let digest = Sha256::digest(document);
    let hash: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", GRAPH_NAME, hash)
}

/// Write DOT source to `<output_dir>/<stem>.gv`
pub fn write_source(config: &ViewConfig, stem: &str, source: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.output_dir).map_err(|source| ViewError::Io {
        path: config.output_dir.clone(),
        source,
    })?;

    let path = config.output_dir.join(format!("{}.gv", stem));
    std::fs::write(&path, source).map_err(|source| ViewError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Run Graphviz on a `.gv` file, returning the rendered file's path
pub fn render_file(config: &ViewConfig, source: &Path) -> Result<PathBuf> {
    let output = source.with_extension(&config.format);

    let result = Command::new(&config.dot)
        .arg(format!("-T{}", config.format))
        .arg("-o")
        .arg(&output)
        .arg(source)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ViewError::Launch {
            program: config.dot.clone(),
            source,
        })?;

    if !result.status.success() {
        return Err(ViewError::Graphviz {
            status: result.status,
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// Hand the file to a viewer without waiting for it
pub fn open(config: &ViewConfig, path: &Path) -> Result<()> {
    let mut command = match &config.viewer {
        Some(viewer) => Command::new(viewer),
        None => platform_opener(),
    };
    let program = format!("{:?}", command.get_program());

    command
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| ViewError::Launch { program, source })?;

    Ok(())
}

fn platform_opener() -> Command {
    if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    }
}

/// Write, render and open in one go
pub fn view(config: &ViewConfig, document: &[u8], source: &str) -> Result<PathBuf> {
    let stem = artifact_stem(document);
    let gv = write_source(config, &stem, source)?;
    let rendered = render_file(config, &gv)?;
    open(config, &rendered)?;
    Ok(rendered)
}
