use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use plait_error::{ContextExt, PlaitError, PlaitResult, plait_err};
use plait_expr::FilterRegistry;
use plait_file::{PlaitFileWriter, PlaitOpenOptions, PlaitWriteOptions};
use plait_scalar::Record;
use plait_scan::ScanMetrics;
use plait_schema::Schema;
use serde::Deserialize;
use tempfile::NamedTempFile;

/// The settings of one task of a map-only job, already resolved by whoever submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// The schema of the records the task writes.
    pub output_schema: Schema,
    /// Only materialize the fields of this schema when reading.
    #[serde(default)]
    pub requested_projection: Option<Schema>,
    /// The identifier of a filter in the task's [`FilterRegistry`].
    #[serde(default)]
    pub unbound_filter: Option<String>,
    /// The file a read task scans. Write tasks take their records from the caller.
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    pub output_path: PathBuf,
}

impl JobConfig {
    pub fn new<P: Into<PathBuf>>(output_schema: Schema, output_path: P) -> Self {
        Self {
            output_schema,
            requested_projection: None,
            unbound_filter: None,
            input_path: None,
            output_path: output_path.into(),
        }
    }

    pub fn from_json(json: &str) -> PlaitResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_input_path<P: Into<PathBuf>>(mut self, input_path: P) -> Self {
        self.input_path = Some(input_path.into());
        self
    }

    pub fn with_requested_projection(mut self, requested: Schema) -> Self {
        self.requested_projection = Some(requested);
        self
    }

    pub fn with_unbound_filter<S: Into<String>>(mut self, id: S) -> Self {
        self.unbound_filter = Some(id.into());
        self
    }
}

/// Receives the records of a read task in file order.
///
/// `None` stands for a record the filter rejected.
pub trait RecordSink {
    fn write(&mut self, record: Option<Record>) -> PlaitResult<()>;
}

impl RecordSink for Vec<Option<Record>> {
    fn write(&mut self, record: Option<Record>) -> PlaitResult<()> {
        self.push(record);
        Ok(())
    }
}

/// Rejected records are dropped.
impl<W: Write> RecordSink for PlaitFileWriter<W> {
    fn write(&mut self, record: Option<Record>) -> PlaitResult<()> {
        match record {
            Some(record) => self.write_record(&record),
            None => Ok(()),
        }
    }
}

/// What a task did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub records_read: u64,
    pub records_matched: u64,
    pub records_written: u64,
}

/// Write every record of `input` to the task's output file. Keys are ignored.
pub fn run_write_task<K, I>(config: &JobConfig, input: I) -> PlaitResult<TaskSummary>
where
    I: IntoIterator<Item = (K, Record)>,
{
    let mut output = create_output(config)?;
    for (_, record) in input {
        output.write_record(&record)?;
    }
    let written = output.num_records();
    finish_output(output, &config.output_path)?;
    Ok(TaskSummary {
        records_read: written,
        records_matched: written,
        records_written: written,
    })
}

/// Scan the task's input file with its projection and filter, handing every record to `sink`.
pub fn run_read_task<S: RecordSink>(
    config: &JobConfig,
    filters: &FilterRegistry,
    sink: &mut S,
) -> PlaitResult<TaskSummary> {
    let input = config
        .input_path
        .as_deref()
        .ok_or_else(|| plait_err!("a read task needs an input path"))?;
    let filter = config
        .unbound_filter
        .as_deref()
        .map(|id| filters.predicate(id))
        .transpose()?;

    let read = File::open(input)
        .map_err(PlaitError::from)
        .with_context(|| format!("opening {}", input.display()))?;
    let file = PlaitOpenOptions::new(read).open()?;
    let metrics = ScanMetrics::default();
    let mut builder = file
        .scan_builder()
        .with_some_filter(filter)
        .with_metrics(metrics.clone());
    if let Some(requested) = &config.requested_projection {
        builder = builder.with_requested_schema(requested.clone());
    }

    let mut delivered = 0;
    for record in file.scan(builder)? {
        let record = record?;
        delivered += u64::from(record.is_some());
        sink.write(record)?;
    }
    log::debug!(
        "Read task over {} delivered {delivered} of {} records",
        input.display(),
        metrics.records_read()
    );
    Ok(TaskSummary {
        records_read: u64::try_from(metrics.records_read())?,
        records_matched: u64::try_from(metrics.records_matched())?,
        records_written: delivered,
    })
}

/// Run a read task whose records pass through `mapper` into the task's output file.
///
/// The mapper sees `None` for every record the filter rejected and may emit any number of
/// records per input.
pub fn run_map_task<F>(
    config: &JobConfig,
    filters: &FilterRegistry,
    mapper: F,
) -> PlaitResult<TaskSummary>
where
    F: FnMut(Option<Record>) -> PlaitResult<Vec<Record>>,
{
    let mut sink = MapSink {
        mapper,
        output: create_output(config)?,
    };
    let summary = run_read_task(config, filters, &mut sink)?;
    let written = sink.output.num_records();
    finish_output(sink.output, &config.output_path)?;
    Ok(TaskSummary {
        records_written: written,
        ..summary
    })
}

struct MapSink<F> {
    mapper: F,
    output: Output,
}

impl<F> RecordSink for MapSink<F>
where
    F: FnMut(Option<Record>) -> PlaitResult<Vec<Record>>,
{
    fn write(&mut self, record: Option<Record>) -> PlaitResult<()> {
        for mapped in (self.mapper)(record)? {
            self.output.write_record(&mapped)?;
        }
        Ok(())
    }
}

type Output = PlaitFileWriter<BufWriter<NamedTempFile>>;

/// Records are written to a temporary file next to the output path. It is deleted if the task
/// fails and only takes the output's name in [`finish_output`].
fn create_output(config: &JobConfig) -> PlaitResult<Output> {
    let path = &config.output_path;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file = NamedTempFile::new_in(dir)
        .map_err(PlaitError::from)
        .with_context(|| format!("creating a temporary file for {}", path.display()))?;
    Ok(PlaitWriteOptions::new(config.output_schema.clone()).open(BufWriter::new(file)))
}

fn finish_output(output: Output, path: &Path) -> PlaitResult<()> {
    let written = output.num_records();
    let file = output
        .finish()
        .and_then(|buffered| {
            buffered
                .into_inner()
                .map_err(|e| PlaitError::from(e.into_error()))
        })
        .with_context(|| format!("writing {}", path.display()))?;
    file.persist(path)
        .map_err(|e| PlaitError::from(e.error))
        .with_context(|| format!("moving the output to {}", path.display()))?;
    log::debug!("Wrote {written} records to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use plait_expr::{FilterRef, column, eq};
    use plait_schema::{PType, SchemaNode};
    use serde_json::json;

    use super::*;

    fn schema() -> Schema {
        Schema::try_new(
            "Car",
            [
                SchemaNode::required("make", PType::Utf8),
                SchemaNode::optional("year", PType::I32),
            ],
        )
        .unwrap()
    }

    #[test]
    fn config_from_json() {
        let requested = Schema::try_new("Car", [SchemaNode::required("make", PType::Utf8)]).unwrap();
        let text = json!({
            "output_schema": schema(),
            "requested_projection": requested,
            "unbound_filter": "electric",
            "input_path": "in.plait",
            "output_path": "out.plait",
        })
        .to_string();
        let config = JobConfig::from_json(&text).unwrap();
        assert_eq!(
            config,
            JobConfig::new(schema(), "out.plait")
                .with_input_path("in.plait")
                .with_requested_projection(requested)
                .with_unbound_filter("electric")
        );

        let minimal = json!({ "output_schema": schema(), "output_path": "out.plait" }).to_string();
        assert_eq!(
            JobConfig::from_json(&minimal).unwrap(),
            JobConfig::new(schema(), "out.plait")
        );
    }

    #[test]
    fn config_rejects_unknown_keys() {
        let text = json!({ "output_schema": schema(), "output_path": "o", "reducers": 2 }).to_string();
        assert!(matches!(
            JobConfig::from_json(&text).unwrap_err(),
            PlaitError::JsonError(..)
        ));
    }

    #[test]
    fn sinks() {
        let mut positions: Vec<Option<Record>> = Vec::new();
        positions.write(None).unwrap();
        positions
            .write(Some(Record::new().with("make", "Tesla")))
            .unwrap();
        assert_eq!(positions.len(), 2);

        let mut writer = PlaitWriteOptions::new(schema()).open(Vec::new());
        writer.write(None).unwrap();
        writer
            .write(Some(Record::new().with("make", "Fiat")))
            .unwrap();
        assert_eq!(writer.num_records(), 1);
    }

    #[test]
    fn read_task_needs_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig::new(schema(), dir.path().join("out.plait"));
        let err = run_read_task(&config, &FilterRegistry::new(), &mut Vec::<Option<Record>>::new()).unwrap_err();
        assert!(matches!(err, PlaitError::InvalidArgument(..)));
    }

    #[test]
    fn unknown_filter_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig::new(schema(), dir.path().join("out.plait"))
            .with_input_path(dir.path().join("missing.plait"))
            .with_unbound_filter("electric");
        let filters =
            FilterRegistry::new().with("tesla", || Arc::new(column("make", eq("Tesla"))) as FilterRef);
        let err = run_read_task(&config, &filters, &mut Vec::<Option<Record>>::new()).unwrap_err();
        assert!(matches!(err, PlaitError::InvalidArgument(..)));
        assert!(err.to_string().contains("tesla"));
    }

    #[test]
    fn failed_map_task_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig::new(schema(), dir.path().join("out.plait"))
            .with_input_path(dir.path().join("missing.plait"));
        assert!(run_map_task(&config, &FilterRegistry::new(), |r| Ok(r.into_iter().collect())).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_task_replaces_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.plait");
        std::fs::write(&path, b"stale").unwrap();
        let config = JobConfig::new(schema(), &path);
        let records = [Record::new().with("make", "Tesla").with("year", 2012)];
        run_write_task(&config, records.iter().cloned().enumerate()).unwrap();

        let file = PlaitOpenOptions::new(File::open(&path).unwrap()).open().unwrap();
        assert_eq!(file.read_all().unwrap(), records);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig::new(schema(), dir.path().join("out.plait"))
            .with_input_path(dir.path().join("missing.plait"));
        let err = run_read_task(&config, &FilterRegistry::new(), &mut Vec::<Option<Record>>::new()).unwrap_err();
        assert!(matches!(err, PlaitError::Context(..)));
        assert!(err.to_string().contains("missing.plait"));
    }
}
