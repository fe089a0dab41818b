use plait_error::{PlaitResult, plait_err};
use plait_layout::{BufferedColumnReader, ColumnReader, RecordAssembler, at_record_start};
use plait_scalar::Record;
use plait_schema::Schema;

use crate::{BoundFilter, ScanMetrics, ScanPlan};

/// Iterates the records of a scan in storage order.
///
/// Each item is `Ok(Some(record))` for a record that passed the filter and `Ok(None)` for one
/// that was rejected, so the position of every record stays observable. Use
/// [`RecordScan::matching`] to only see passing records. The scan stops after the first error.
pub struct RecordScan<R> {
    assembler: RecordAssembler,
    filter: Option<BoundFilter>,
    columns: Vec<BufferedColumnReader<R>>,
    materialize: usize,
    next_record: u64,
    metrics: ScanMetrics,
    done: bool,
}

impl<R: ColumnReader> RecordScan<R> {
    pub(crate) fn new(
        plan: ScanPlan,
        columns: Vec<BufferedColumnReader<R>>,
        metrics: ScanMetrics,
    ) -> Self {
        let (assembler, materialize, filter) = plan.into_parts();
        Self {
            assembler,
            filter,
            columns,
            materialize,
            next_record: 0,
            metrics,
            done: false,
        }
    }

    /// The schema of the returned records.
    pub fn schema(&self) -> &Schema {
        self.assembler.schema()
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// The number of records visited so far.
    pub fn position(&self) -> u64 {
        self.next_record
    }

    /// Only the records that pass the filter.
    pub fn matching(self) -> impl Iterator<Item = PlaitResult<Record>> {
        self.filter_map(Result::transpose)
    }

    fn read_next(&mut self) -> PlaitResult<Option<Option<Record>>> {
        if !at_record_start(&mut self.columns)? {
            log::debug!(
                "Scan finished after {} records, {} matched",
                self.next_record,
                self.metrics.records_matched()
            );
            return Ok(None);
        }
        let index = self.next_record;
        self.next_record += 1;
        self.metrics.record_read();

        let accepted = match &mut self.filter {
            Some(filter) => filter.accept(&mut self.columns, index)?,
            None => true,
        };
        if !accepted {
            let mut skipped = 0;
            for column in self.columns.iter_mut() {
                skipped += column.skip_record()?;
            }
            log::trace!("Record {index} rejected, skipped {skipped} values");
            self.metrics.record_skipped(skipped);
            return Ok(Some(None));
        }

        let (materialize, filter_only) = self.columns.split_at_mut(self.materialize);
        let record = self
            .assembler
            .assemble(materialize)?
            .ok_or_else(|| plait_err!(ColumnDesync: "record {index} ended before it started"))?;
        for column in filter_only {
            column.skip_record()?;
        }
        log::trace!("Record {index} accepted");
        self.metrics.record_matched();
        Ok(Some(Some(record)))
    }
}

impl<R: ColumnReader> Iterator for RecordScan<R> {
    type Item = PlaitResult<Option<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.read_next().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use plait_error::PlaitError;
    use plait_expr::{column, eq, gt, or};
    use plait_layout::{ColumnChunk, ColumnWriter, RecordShredder};
    use plait_scalar::Value;
    use plait_schema::{FieldPath, PType, Repetition, SchemaNode};
    use rstest::rstest;

    use super::*;
    use crate::ScanBuilder;

    fn schema() -> Schema {
        Schema::try_new(
            "Car",
            [
                SchemaNode::required("make", PType::Utf8),
                SchemaNode::required("year", PType::I32),
                SchemaNode::group(
                    "service",
                    Repetition::Repeated,
                    [
                        SchemaNode::required("date", PType::I64),
                        SchemaNode::optional("mechanic", PType::Utf8),
                    ],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    fn records() -> Vec<Record> {
        (0..8)
            .map(|i: i32| {
                let services = (0..i % 3)
                    .map(|s| {
                        Record::new()
                            .with("date", i64::from(i * 10 + s))
                            .with("mechanic", (s == 1).then_some("Mr Phil"))
                    })
                    .collect::<Vec<_>>();
                Record::new()
                    .with("make", if i % 2 == 0 { "Tesla" } else { "Fiat" })
                    .with("year", 2010 + i)
                    .with("service", services)
            })
            .collect()
    }

    fn chunks() -> Vec<ColumnChunk> {
        let shredder = RecordShredder::new(schema());
        let mut writers = shredder.writers();
        for record in records() {
            shredder.shred(&record, &mut writers).unwrap();
        }
        writers.into_iter().map(ColumnWriter::finish).collect()
    }

    #[test]
    fn no_filter_returns_everything() {
        let scan = ScanBuilder::new(schema()).build_from_chunks(&chunks()).unwrap();
        let got = scan.matching().collect::<PlaitResult<Vec<_>>>().unwrap();
        assert_eq!(got, records());
    }

    #[test]
    fn rejected_records_are_positions() {
        let metrics = ScanMetrics::default();
        let scan = ScanBuilder::new(schema())
            .with_filter(column("make", eq("Tesla")))
            .with_metrics(metrics.clone())
            .build_from_chunks(&chunks())
            .unwrap();
        let items = scan.collect::<PlaitResult<Vec<_>>>().unwrap();
        assert_eq!(items.len(), 8);
        assert!(items.iter().step_by(2).all(Option::is_some));
        assert!(items.iter().skip(1).step_by(2).all(Option::is_none));
        assert_eq!(metrics.records_read(), 8);
        assert_eq!(metrics.records_matched(), 4);
        assert_eq!(metrics.records_skipped(), 4);
        assert!(metrics.values_skipped() > 0);
    }

    #[rstest]
    #[case::projected_column(column("make", eq("Fiat")))]
    #[case::filter_only_column(column("year", gt(2013)))]
    #[case::repeated_any(column("service.date", eq(51i64)))]
    #[case::repeated_null(column("service.mechanic", eq("Mr Phil")))]
    #[case::disjunction(or(column("year", eq(2010)), column("service.date", gt(50i64))))]
    fn pushdown_matches_record_evaluation(#[case] predicate: plait_expr::Predicate) {
        let projection = [FieldPath::from("make"), FieldPath::from("service.date")];
        let expected: Vec<Record> = records()
            .into_iter()
            .filter(|r| predicate.evaluate(r))
            .map(|r| {
                let services = r
                    .get("service")
                    .and_then(Value::as_list)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Value::as_record)
                    .map(|s| s.clone().without("mechanic"))
                    .collect::<Vec<_>>();
                Record::new()
                    .with("make", r.get("make").cloned().unwrap_or_default())
                    .with("service", services)
            })
            .collect();
        assert!(!expected.is_empty());

        let got = ScanBuilder::new(schema())
            .with_projection(projection)
            .with_filter(predicate)
            .build_from_chunks(&chunks())
            .unwrap()
            .matching()
            .collect::<PlaitResult<Vec<_>>>()
            .unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn desync_stops_the_scan() {
        let mut chunks = chunks();
        let mut short = ColumnWriter::new(chunks[1].column().clone());
        short.push(&plait_layout::Triple::new(0, 0, 2010.into())).unwrap();
        chunks[1] = short.finish();

        let mut scan = ScanBuilder::new(schema()).build_from_chunks(&chunks).unwrap();
        assert!(matches!(scan.next(), Some(Ok(Some(_)))));
        assert!(matches!(scan.next(), Some(Err(PlaitError::ColumnDesync(..)))));
        assert!(scan.next().is_none());
    }
}
