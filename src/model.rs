use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};

/// A known embedding model and where to fetch it from
#[derive(Debug)]
pub struct ModelSpec {
    pub id: &'static str,
    pub dimension: usize,
    files: &'static [(&'static str, &'static str)],
}

pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

const MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "all-MiniLM-L6-v2",
        dimension: 384,
        files: &[
            (
                "model.onnx",
                "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx",
            ),
            (
                "tokenizer.json",
                "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json",
            ),
            (
                "config.json",
                "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/config.json",
            ),
        ],
    },
    ModelSpec {
        id: "all-MiniLM-L12-v2",
        dimension: 384,
        files: &[
            (
                "model.onnx",
                "https://huggingface.co/sentence-transformers/all-MiniLM-L12-v2/resolve/main/onnx/model.onnx",
            ),
            (
                "tokenizer.json",
                "https://huggingface.co/sentence-transformers/all-MiniLM-L12-v2/resolve/main/tokenizer.json",
            ),
            (
                "config.json",
                "https://huggingface.co/sentence-transformers/all-MiniLM-L12-v2/resolve/main/config.json",
            ),
        ],
    },
];

/// Resolves a model identifier against the known-model table
pub fn lookup(id: &str) -> Result<&'static ModelSpec> {
    MODELS.iter().find(|m| m.id == id).ok_or_else(|| {
        let known: Vec<&str> = MODELS.iter().map(|m| m.id).collect();
        Error::Embedder(format!(
            "unknown model {:?} (known models: {})",
            id,
            known.join(", ")
        ))
    })
}

/// Directory holding one model's files, partitioned by model id
pub fn model_dir(base_dir: &Path, spec: &ModelSpec) -> PathBuf {
    base_dir.join("models").join(spec.id)
}

/// Checks whether every file of the model is present on disk
pub fn is_model_downloaded(base_dir: &Path, spec: &ModelSpec) -> bool {
    let dir = model_dir(base_dir, spec);
    spec.files.iter().all(|(filename, _)| dir.join(filename).exists())
}

/// Downloads the model files if not already present and returns the
/// model directory. Download failure is fatal for the run.
pub fn ensure_model(base_dir: &Path, spec: &ModelSpec) -> Result<PathBuf> {
    let dir = model_dir(base_dir, spec);

    if is_model_downloaded(base_dir, spec) {
        log::debug!("Model {} already downloaded at {:?}", spec.id, dir);
        return Ok(dir);
    }

    eprintln!("Downloading embedding model ({})...", spec.id);
    eprintln!("This is a one-time download.\n");

    fs::create_dir_all(&dir)
        .map_err(|e| Error::Embedder(format!("cannot create model directory: {}", e)))?;

    for (filename, url) in spec.files {
        let dest = dir.join(filename);
        if dest.exists() {
            log::debug!("{} already exists, skipping", filename);
            continue;
        }

        if let Err(e) = download_file(url, &dest, filename) {
            // Don't leave a truncated file behind to be mistaken for a
            // complete download on the next run
            let _ = fs::remove_file(&dest);
            return Err(e);
        }
    }

    eprintln!("\nModel downloaded successfully.\n");
    Ok(dir)
}

/// Downloads a single file with a progress bar
fn download_file(url: &str, dest: &Path, display_name: &str) -> Result<()> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| Error::Embedder(format!("failed to download {}: {}", url, e)))?;

    let total_size = response
        .header("content-length")
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let pb = if total_size > 0 {
        let pb = ProgressBar::new(total_size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "  {{spinner:.green}} {} [{{bar:30.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{eta}})",
                    display_name
                ))
                .expect("Invalid progress bar template")
                .progress_chars("=> "),
        );
        Some(pb)
    } else {
        eprintln!("  Downloading {}...", display_name);
        None
    };

    let mut file = fs::File::create(dest)
        .map_err(|e| Error::Embedder(format!("cannot create file {:?}: {}", dest, e)))?;

    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| Error::Embedder(format!("failed to read response body: {}", e)))?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::Embedder(format!("failed to write {:?}: {}", dest, e)))?;
        if let Some(ref pb) = pb {
            pb.inc(bytes_read as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish();
    }

    Ok(())
}
