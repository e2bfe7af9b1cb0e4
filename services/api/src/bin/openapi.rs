//! services/api/src/bin/openapi.rs
//!
//! Writes the MirrorAI OpenAPI document to disk so clients can be generated
//! without starting the server. Usage: `openapi [OUTPUT_PATH]` (default `openapi.json`).

use api_lib::web::ApiDoc;
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

fn write_document(doc: &utoipa::openapi::OpenApi, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = doc
        .to_pretty_json()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}

fn main() -> std::io::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let doc = ApiDoc::openapi();
    write_document(&doc, &path)?;
    println!(
        "Wrote {} routes for {} v{} to {}",
        doc.paths.paths.len(),
        doc.info.title,
        doc.info.version,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_document_into_nested_directory() {
        let dir = std::env::temp_dir().join(format!("mirror-openapi-{}", std::process::id()));
        let path = dir.join("docs").join("openapi.json");

        write_document(&ApiDoc::openapi(), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written["paths"]["/dashboard/refresh"]["post"].is_object());
        std::fs::remove_dir_all(dir).ok();
    }
}
