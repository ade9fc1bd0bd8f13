//! Repositorio de registros de campo
//!
//! Log append-only en CSV (UTF-8 con BOM para que Excel muestre bien el
//! chino). La cabecera se escribe una sola vez, al crear el archivo.
//!
//! Las escrituras dentro del proceso se serializan con un mutex: si una
//! escritura falla, el archivo se trunca a la longitud previa, y sin el lock
//! ese truncado podría borrar una fila añadida por otra sesión entretanto.
//! Otro proceso escribiendo el mismo archivo sigue sin estar protegido.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::models::record::Record;
use crate::utils::errors::{AppError, AppResult};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Almacén de registros de prueba
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Añadir una fila; crea el archivo con cabecera si no existe.
    /// Devuelve el número de filas del log tras la escritura.
    async fn append(&self, record: &Record) -> AppResult<usize>;

    /// Todas las filas en orden de inserción
    async fn read_all(&self) -> AppResult<Vec<Record>>;

    /// Bytes del archivo completo para descarga
    async fn export(&self) -> AppResult<Vec<u8>>;

    /// Nombre de archivo ofrecido en la descarga
    fn file_name(&self) -> String;
}

/// Destino de una fila que sabe volver a una longitud anterior
#[async_trait]
pub(crate) trait RowSink: AsyncWrite + Unpin + Send {
    async fn sync(&mut self) -> std::io::Result<()>;
    async fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

#[async_trait]
impl RowSink for File {
    async fn sync(&mut self) -> std::io::Result<()> {
        self.sync_data().await
    }

    async fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len).await
    }
}

/// Escribir la fila completa o dejar el destino en `restore_len` bytes
pub(crate) async fn write_or_rollback<S: RowSink>(
    sink: &mut S,
    row: &[u8],
    restore_len: u64,
    path: &Path,
) -> AppResult<()> {
    let written = async {
        sink.write_all(row).await?;
        sink.flush().await?;
        sink.sync().await
    }
    .await;

    if let Err(e) = written {
        // no dejar una fila a medias
        if let Err(truncate_error) = sink.truncate(restore_len).await {
            tracing::error!(
                "❌ No se pudo restaurar {} a {} bytes: {}",
                path.display(),
                restore_len,
                truncate_error
            );
        }
        return Err(AppError::Storage(format!("cannot write to {}: {}", path.display(), e)));
    }
    Ok(())
}

/// Estado del log antes de escribir
struct LogSnapshot {
    len: u64,
    rows: usize,
}

pub struct CsvRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializar la fila completa en memoria antes de tocar el disco
    fn encode_row(record: &Record, with_header: bool) -> AppResult<Vec<u8>> {
        let mut buffer = Vec::new();
        if with_header {
            buffer.extend_from_slice(UTF8_BOM);
        }
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(with_header)
                .from_writer(&mut buffer);
            writer.serialize(record)?;
            writer.flush()?;
        }
        Ok(buffer)
    }

    /// Filas de datos sin deserializarlas: una fila editada a mano o con
    /// otro número de columnas cuenta igual
    fn count_rows(content: &[u8]) -> AppResult<usize> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(content);
        let mut rows = 0;
        for row in reader.byte_records() {
            row?;
            rows += 1;
        }
        Ok(rows)
    }

    /// Longitud y filas actuales, `None` si el archivo todavía no existe
    async fn snapshot(&self) -> AppResult<Option<LogSnapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(LogSnapshot {
                len: bytes.len() as u64,
                rows: Self::count_rows(&bytes)?,
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "cannot inspect {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    async fn append(&self, record: &Record) -> AppResult<usize> {
        let _guard = self.write_lock.lock().await;

        let snapshot = self.snapshot().await?;
        let (existing_len, existing_rows) = snapshot
            .map(|s| (s.len, s.rows))
            .unwrap_or((0, 0));
        // un archivo vacío también necesita cabecera
        let with_header = existing_len == 0;
        let row = Self::encode_row(record, with_header)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::Storage(format!("cannot create {}: {}", parent.display(), e)))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| AppError::Storage(format!("cannot open {}: {}", self.path.display(), e)))?;

        write_or_rollback(&mut file, &row, existing_len, &self.path).await?;

        tracing::info!(
            "💾 Registro guardado en {} (estación '{}', cabecera: {})",
            self.path.display(),
            record.station,
            with_header
        );
        Ok(existing_rows + 1)
    }

    async fn read_all(&self) -> AppResult<Vec<Record>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        let mut reader = csv::Reader::from_reader(content);
        let records = reader
            .deserialize()
            .collect::<Result<Vec<Record>, csv::Error>>()?;

        log::debug!("📄 {} registros leídos de {}", records.len(), self.path.display());
        Ok(records)
    }

    async fn export(&self) -> AppResult<Vec<u8>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(format!(
                "{} has no records yet",
                self.file_name()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mission_test_records.csv".to_string())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::record::*;
    use chrono::NaiveDate;

    pub fn record(station: &str) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
            station: station.to_string(),
            use_case: UseCase::Ac1,
            status: TestStatus::Normal,
            cpo_name: "特来电".to_string(),
            manufacturer: "TELD".to_string(),
            model: "TCDZ-DC120".to_string(),
            voltage: "750".to_string(),
            current: "250".to_string(),
            power: "120".to_string(),
            start_method: StartMethod::QrCode,
            start_method_other: String::new(),
            start_time: "2025-08-18 09:30:00".to_string(),
            start_soc: "20".to_string(),
            end_time: "2025-08-18 10:05:12".to_string(),
            end_soc: "80".to_string(),
            end_method: EndMethod::TargetSoc,
            end_method_other: String::new(),
            end_reason: EndReason::TargetReached,
            end_reason_other: String::new(),
            test_result: TestResult::Pass,
            error_category: ErrorCategory::Other,
            error_category_other: "無".to_string(),
            remark: "正常, 含逗號與\"引號\"".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvRecordStore::new(dir.path().join("mission_test_records.csv"));

        for station in ["站點 1", "站點 2", "站點 3"] {
            store.append(&record(station)).await.unwrap();
        }

        let raw = tokio::fs::read(store.path()).await.unwrap();
        assert!(raw.starts_with(UTF8_BOM));
        let text = String::from_utf8(raw[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.matches("日期").count(), 1);
        assert_eq!(text.lines().next().unwrap(), Record::COLUMNS.join(","));

        let records = store.read_all().await.unwrap();
        let stations: Vec<&str> = records.iter().map(|r| r.station.as_str()).collect();
        assert_eq!(stations, vec!["站點 1", "站點 2", "站點 3"]);
    }

    #[tokio::test]
    async fn test_read_all_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvRecordStore::new(dir.path().join("records.csv"));
        let original = record("Station X");

        store.append(&original).await.unwrap();
        let records = store.read_all().await.unwrap();

        assert_eq!(records, vec![original]);
    }

    #[tokio::test]
    async fn test_empty_existing_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        tokio::fs::write(&path, b"").await.unwrap();

        let store = CsvRecordStore::new(&path);
        store.append(&record("Station X")).await.unwrap();

        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvRecordStore::new(dir.path().join("nothing.csv"));

        assert!(store.read_all().await.unwrap().is_empty());
        assert!(matches!(store.export().await, Err(AppError::NotFound(_))));
        assert_eq!(store.file_name(), "nothing.csv");
    }

    #[tokio::test]
    async fn test_unwritable_location_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // el "directorio" padre es un archivo normal
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, b"x").await.unwrap();
        let store = CsvRecordStore::new(blocker.join("records.csv"));

        let result = store.append(&record("Station X")).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_malformed_earlier_rows_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        // log antiguo con una fila editada a mano
        let seeded = format!("{}\nbroken,row\n", Record::COLUMNS.join(","));
        tokio::fs::write(&path, seeded).await.unwrap();

        let store = CsvRecordStore::new(&path);
        assert_eq!(store.append(&record("Station X")).await.unwrap(), 2);
        assert_eq!(store.append(&record("Station Y")).await.unwrap(), 3);
    }

    /// Escribe como mucho `budget` bytes en el archivo y después falla
    struct FailingSink {
        file: File,
        budget: usize,
    }

    impl AsyncWrite for FailingSink {
        fn poll_write(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            let this = self.get_mut();
            if this.budget == 0 {
                return Poll::Ready(Err(std::io::Error::new(ErrorKind::Other, "disk full")));
            }
            let take = buf.len().min(this.budget);
            match Pin::new(&mut this.file).poll_write(cx, &buf[..take]) {
                Poll::Ready(Ok(n)) => {
                    this.budget -= n;
                    Poll::Ready(Ok(n))
                }
                other => other,
            }
        }

        fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Pin::new(&mut self.get_mut().file).poll_flush(cx)
        }

        fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Pin::new(&mut self.get_mut().file).poll_shutdown(cx)
        }
    }

    #[async_trait]
    impl RowSink for FailingSink {
        async fn sync(&mut self) -> std::io::Result<()> {
            self.file.sync_data().await
        }

        async fn truncate(&mut self, len: u64) -> std::io::Result<()> {
            self.file.set_len(len).await
        }
    }

    #[tokio::test]
    async fn test_write_failure_mid_row_restores_length() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvRecordStore::new(dir.path().join("records.csv"));
        store.append(&record("Station X")).await.unwrap();
        let before = tokio::fs::metadata(store.path()).await.unwrap().len();

        let file = OpenOptions::new().append(true).open(store.path()).await.unwrap();
        let mut sink = FailingSink { file, budget: 10 };
        let row = CsvRecordStore::encode_row(&record("Station Y"), false).unwrap();
        assert!(row.len() > 10);

        let result = write_or_rollback(&mut sink, &row, before, store.path()).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        drop(sink);

        let after = tokio::fs::metadata(store.path()).await.unwrap().len();
        assert_eq!(after, before);
        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].station, "Station X");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvRecordStore::new(dir.path().join("records.csv")));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.append(&record(&format!("站點 {}", i))).await })
            })
            .collect();
        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap().unwrap());
        }

        counts.sort_unstable();
        assert_eq!(counts, (1..=16).collect::<Vec<usize>>());
        assert_eq!(store.read_all().await.unwrap().len(), 16);
    }
}
