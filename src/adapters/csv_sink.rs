use crate::domain::model::NormalizedTable;
use crate::domain::ports::TableSink;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Local CSV destination used for dry runs. The export stamp lands in a
/// sibling `<stem>.meta.csv`.
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    path: PathBuf,
    meta_label: String,
}

impl CsvTableSink {
    pub fn new(path: impl Into<PathBuf>, meta_label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            meta_label: meta_label.into(),
        }
    }

    pub fn meta_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export".to_string());
        self.path.with_file_name(format!("{}.meta.csv", stem))
    }

    fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Row width varies for the meta file.
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl TableSink for CsvTableSink {
    async fn write_table(&self, table: &NormalizedTable) -> Result<String> {
        Self::write_rows(&self.path, &table.to_string_grid())?;
        tracing::info!(
            "✅ {} rows x {} columns written to {}",
            table.height(),
            table.width(),
            self.path.display()
        );
        Ok(self.path.display().to_string())
    }

    async fn write_export_stamp(&self, exported_at: &str) -> Result<()> {
        let meta_path = self.meta_path();
        Self::write_rows(
            &meta_path,
            &[vec![self.meta_label.clone()], vec![exported_at.to_string()]],
        )?;
        tracing::info!("🕒 Export recorded in {}: {}", meta_path.display(), exported_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FlatRecord;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_header_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("biens.csv");
        let sink = CsvTableSink::new(&path, "Dernière date d'export");

        let row: FlatRecord = [("id", json!(1)), ("Rooms", json!("Salon (18 m²)"))]
            .into_iter()
            .collect();
        let table = NormalizedTable {
            columns: vec!["id".to_string(), "Rooms".to_string(), "price".to_string()],
            rows: vec![row.reindex(&["id".to_string(), "Rooms".to_string(), "price".to_string()])],
        };

        let destination = sink.write_table(&table).await.unwrap();
        sink.write_export_stamp("2024-05-01 12:00:00").await.unwrap();

        assert_eq!(destination, path.display().to_string());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,Rooms,price\n1,Salon (18 m²),\n");

        let meta = std::fs::read_to_string(temp_dir.path().join("out").join("biens.meta.csv")).unwrap();
        assert_eq!(meta, "Dernière date d'export\n2024-05-01 12:00:00\n");
    }
}
