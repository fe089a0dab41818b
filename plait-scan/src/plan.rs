use itertools::Itertools;
use plait_error::{PlaitResult, plait_err};
use plait_expr::Predicate;
use plait_layout::{BufferedColumnReader, ChunkReader, ColumnChunk, ColumnReader, RecordAssembler};
use plait_schema::{ColumnDescriptor, FieldPath, Schema, column_summary};

use crate::{BoundFilter, RecordScan, ScanMetrics};

#[derive(Debug, Clone, Default)]
enum ScanProjection {
    #[default]
    All,
    Paths(Vec<FieldPath>),
    Schema(Schema),
}

/// Configures a scan over records written with `schema`.
#[derive(Debug, Clone)]
pub struct ScanBuilder {
    schema: Schema,
    projection: ScanProjection,
    filter: Option<Predicate>,
    metrics: ScanMetrics,
}

impl ScanBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            projection: ScanProjection::All,
            filter: None,
            metrics: ScanMetrics::default(),
        }
    }

    /// Only materialize the given fields, see [`Schema::project`].
    pub fn with_projection<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.projection = ScanProjection::Paths(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Only materialize the fields of `requested`, see [`Schema::project_to`].
    pub fn with_requested_schema(mut self, requested: Schema) -> Self {
        self.projection = ScanProjection::Schema(requested);
        self
    }

    /// Only return records matching `filter`.
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_some_filter(mut self, filter: Option<Predicate>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_metrics(mut self, metrics: ScanMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resolve the projection and the filter against the schema.
    pub fn plan(&self) -> PlaitResult<ScanPlan> {
        let projected = match &self.projection {
            ScanProjection::All => self.schema.clone(),
            ScanProjection::Paths(paths) => self.schema.project(paths)?,
            ScanProjection::Schema(requested) => self.schema.project_to(requested)?,
        };

        let file_columns = self.schema.leaves();
        let mut columns = projected.leaves();
        let materialize = columns.len();
        if let Some(filter) = &self.filter {
            for path in filter.references() {
                if columns.iter().any(|c| c.path() == path) {
                    continue;
                }
                // Unknown paths are reported when the filter is bound.
                if let Some(column) = file_columns.iter().find(|c| c.path() == path) {
                    columns.push(column.clone());
                }
            }
        }

        let sources = columns
            .iter()
            .map(|column| {
                file_columns
                    .iter()
                    .position(|c| c == column)
                    .ok_or_else(|| plait_err!(Schema: "column {column} is not in the file schema"))
            })
            .collect::<PlaitResult<Vec<_>>>()?;
        let filter = self
            .filter
            .as_ref()
            .map(|f| BoundFilter::bind(f, &columns))
            .transpose()?;

        log::debug!(
            "Planned scan of {}: materialize [{}], filter only [{}]",
            self.schema.name(),
            column_summary(&projected),
            columns[materialize..].iter().map(ColumnDescriptor::path).join(", ")
        );
        Ok(ScanPlan {
            projected,
            columns,
            materialize,
            sources,
            filter,
        })
    }

    /// Build the scan, opening a reader for each planned column.
    ///
    /// `open` receives the position of the column among the leaves of the full schema.
    pub fn build<R, F>(self, mut open: F) -> PlaitResult<RecordScan<R>>
    where
        R: ColumnReader,
        F: FnMut(usize, &ColumnDescriptor) -> PlaitResult<R>,
    {
        let plan = self.plan()?;
        let readers = plan
            .sources
            .iter()
            .zip(plan.columns.iter())
            .map(|(&source, column)| open(source, column).map(BufferedColumnReader::new))
            .collect::<PlaitResult<Vec<_>>>()?;
        Ok(RecordScan::new(plan, readers, self.metrics))
    }

    /// Build a scan over in-memory column chunks, one per leaf of the full schema.
    pub fn build_from_chunks(self, chunks: &[ColumnChunk]) -> PlaitResult<RecordScan<ChunkReader>> {
        self.build(|source, column| {
            let chunk = chunks.get(source).ok_or_else(|| {
                plait_err!("no column chunk for {column} at position {source}")
            })?;
            if chunk.column() != column {
                return Err(plait_err!(
                    Schema: "chunk at position {source} holds {}, expected {column}",
                    chunk.column()
                ));
            }
            Ok(chunk.reader())
        })
    }
}

/// The resolved shape of a scan.
///
/// The first [`ScanPlan::materialize_columns`] feed the assembler; the remaining
/// [`ScanPlan::filter_only_columns`] are read only to evaluate the filter. A column the filter
/// tests that is also projected is read once.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    projected: Schema,
    columns: Vec<ColumnDescriptor>,
    materialize: usize,
    sources: Vec<usize>,
    filter: Option<BoundFilter>,
}

impl ScanPlan {
    /// The schema of the records the scan returns.
    pub fn projected_schema(&self) -> &Schema {
        &self.projected
    }

    /// Every column the scan reads, in reader order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn materialize_columns(&self) -> &[ColumnDescriptor] {
        &self.columns[..self.materialize]
    }

    pub fn filter_only_columns(&self) -> &[ColumnDescriptor] {
        &self.columns[self.materialize..]
    }

    /// For each read column, its position among the leaves of the full schema.
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    pub fn filter(&self) -> Option<&BoundFilter> {
        self.filter.as_ref()
    }

    pub(crate) fn into_parts(self) -> (RecordAssembler, usize, Option<BoundFilter>) {
        (
            RecordAssembler::new(self.projected),
            self.materialize,
            self.filter,
        )
    }
}

#[cfg(test)]
mod tests {
    use plait_error::PlaitError;
    use plait_expr::{and, column, eq};
    use plait_schema::{PType, Repetition, SchemaNode};

    use super::*;

    fn schema() -> Schema {
        Schema::try_new(
            "Car",
            [
                SchemaNode::required("make", PType::Utf8),
                SchemaNode::required("year", PType::I32),
                SchemaNode::group(
                    "engine",
                    Repetition::Required,
                    [
                        SchemaNode::required("type", PType::Utf8),
                        SchemaNode::required("capacity", PType::F32),
                    ],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    fn paths(columns: &[ColumnDescriptor]) -> Vec<String> {
        columns.iter().map(|c| c.path().to_string()).collect()
    }

    #[test]
    fn filter_only_columns_follow_projection() {
        let plan = ScanBuilder::new(schema())
            .with_projection(["make", "engine.capacity"])
            .with_filter(and(column("engine.type", eq("ELECTRIC")), column("make", eq("Tesla"))))
            .plan()
            .unwrap();
        assert_eq!(paths(plan.materialize_columns()), vec!["make", "engine.capacity"]);
        assert_eq!(paths(plan.filter_only_columns()), vec!["engine.type"]);
        assert_eq!(plan.sources(), &[0, 3, 2]);
        assert_eq!(plan.filter().map(BoundFilter::references), Some(&[2, 0][..]));
    }

    #[test]
    fn no_projection_reads_everything_once() {
        let plan = ScanBuilder::new(schema())
            .with_filter(column("year", eq(2014)))
            .plan()
            .unwrap();
        assert_eq!(plan.columns().len(), 4);
        assert!(plan.filter_only_columns().is_empty());
        assert_eq!(plan.projected_schema(), &schema());
    }

    #[test]
    fn unknown_filter_column() {
        let err = ScanBuilder::new(schema())
            .with_filter(column("engine", eq("x")))
            .plan()
            .unwrap_err();
        assert!(matches!(err, PlaitError::UnknownColumn(..)));
    }

    #[test]
    fn requested_schema() {
        let requested = Schema::try_new("Car", [SchemaNode::required("year", PType::I32)]).unwrap();
        let plan = ScanBuilder::new(schema())
            .with_requested_schema(requested.clone())
            .plan()
            .unwrap();
        assert_eq!(plan.projected_schema(), &requested);
        assert_eq!(plan.sources(), &[1]);
    }
}
