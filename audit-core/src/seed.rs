use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::models::Snapshot;

/// Seed file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Yaml,
    Json,
}

impl SeedFormat {
    /// Infers the format from the file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SeedFormat::Json,
            _ => SeedFormat::Yaml,
        }
    }
}

/// Loads a seed snapshot from a YAML or JSON file
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let file = File::open(path).with_context(|| format!("Failed to open seed file: {:?}", path))?;
    let reader = BufReader::new(file);

    let snapshot: Snapshot = match SeedFormat::from_path(path) {
        SeedFormat::Yaml => serde_yaml::from_reader(reader)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?,
        SeedFormat::Json => serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?,
    };

    log::info!(
        "Loaded seed {} ({} projects, {} requests, {} evidence)",
        path.display(),
        snapshot.audit_projects.len(),
        snapshot.requests.len(),
        snapshot.evidence.len()
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SEED: &str = r#"
auditProjects:
  - id: PROJ-01
    name: Audit BPK Semester I
requests:
  - id: PRM-003
    tanggal: 2025-01-10
    unit: Keuangan
    deskripsi: Rekening koran
    tenggat: 2025-01-20
    auditProjectId: PROJ-01
    buktiTerkait: [BKT-001]
    status: Fulfilled
    pemenuhan: 2025-01-15
evidence:
  - id: BKT-001
    kategori: Dokumen
    deskripsi: Rekening koran Januari
    link: https://example.org/rk.pdf
    unit: Keuangan
    tglDiterima: 2025-01-15
    validitas: Valid
    prmTerkait: PRM-003
"#;

    #[test]
    fn test_format_inference() {
        assert_eq!(SeedFormat::from_path(Path::new("seed.json")), SeedFormat::Json);
        assert_eq!(SeedFormat::from_path(Path::new("seed.yml")), SeedFormat::Yaml);
        assert_eq!(SeedFormat::from_path(Path::new("seed")), SeedFormat::Yaml);
    }

    #[test]
    fn test_load_yaml_seed() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("seed.yaml");
        fs::write(&path, SEED)?;

        let snapshot = load_snapshot(&path)?;

        assert_eq!(snapshot.audit_projects.len(), 1);
        assert_eq!(snapshot.requests[0].bukti_terkait, vec!["BKT-001".to_string()]);
        assert_eq!(snapshot.evidence[0].prm_terkait.as_deref(), Some("PRM-003"));
        Ok(())
    }

    #[test]
    fn test_load_json_seed() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("seed.json");
        let yaml: Snapshot = serde_yaml::from_str(SEED)?;
        fs::write(&path, serde_json::to_string(&yaml)?)?;

        assert_eq!(load_snapshot(&path)?, yaml);
        Ok(())
    }

    #[test]
    fn test_missing_seed_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_snapshot(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to open seed file"));
    }
}
