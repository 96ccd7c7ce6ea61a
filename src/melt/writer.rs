use crate::error::{MeltError, Result};
use crate::melt::context::{MeltContext, TableBatch};
use crate::melt::types::{MeltConfig, Table};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Appends batches to one delimited file per table, skipping lines that were
/// already written during this run.
pub struct TableWriter {
    output_dir: PathBuf,
    extension: String,
}

impl TableWriter {
    /// Create a writer for the configured output directory
    pub fn new(config: &MeltConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.output_dir).map_err(|source| MeltError::Io {
            path: config.output_dir.clone(),
            source,
        })?;

        Ok(TableWriter {
            output_dir: config.output_dir.clone(),
            extension: config.extension.clone(),
        })
    }

    /// Path of the file backing `table`
    pub fn table_path(&self, table: Table) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", table.file_stem(), self.extension))
    }

    /// Write every table of a batch. Returns the number of new lines written.
    pub fn write_batch(&self, ctx: &mut MeltContext, batch: &TableBatch) -> Result<usize> {
        let mut total = 0;
        for table in Table::ALL {
            total += self.write_table(ctx, table, batch)?;
        }
        Ok(total)
    }

    /// Append the novel lines of one table. The file is closed on return.
    pub fn write_table(
        &self,
        ctx: &mut MeltContext,
        table: Table,
        batch: &TableBatch,
    ) -> Result<usize> {
        let path = self.table_path(table);
        let io_err = |source| MeltError::Io {
            path: path.clone(),
            source,
        };

        let mut writer = BufWriter::new(open_append(&path).map_err(io_err)?);
        let mut written = 0;
        let mut skipped = 0;

        for line in batch.lines(table).iter() {
            if !ctx.record(table, line) {
                skipped += 1;
                continue;
            }
            writeln!(writer, "{}", line).map_err(io_err)?;
            written += 1;
        }
        writer.flush().map_err(io_err)?;

        debug!(%table, written, skipped, "table appended");
        Ok(written)
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
