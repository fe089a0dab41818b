use std::sync::Arc;

use plait::error::{PlaitError, PlaitResult};
use plait::expr::{ColumnPredicate, FilterRef, FilterRegistry, Predicate, UnboundFilter, column, eq};
use plait::file::{PlaitOpenOptions, PlaitWriteOptions};
use plait::schema::{PType, Repetition, Schema, SchemaNode};
use plait::{JobConfig, Record, TaskSummary, Value, run_map_task, run_read_task, run_write_task};
use rstest::rstest;

fn engine() -> SchemaNode {
    SchemaNode::group(
        "engine",
        Repetition::Required,
        [
            SchemaNode::required("type", PType::Utf8),
            SchemaNode::required("capacity", PType::F32),
            SchemaNode::required("hasTurboCharger", PType::Bool),
        ],
    )
    .unwrap()
}

fn service_history() -> SchemaNode {
    SchemaNode::group(
        "serviceHistory",
        Repetition::Optional,
        [SchemaNode::group(
            "service",
            Repetition::Repeated,
            [
                SchemaNode::required("date", PType::I64),
                SchemaNode::required("mechanic", PType::Utf8),
            ],
        )
        .unwrap()],
    )
    .unwrap()
}

fn car_schema(with_extras: bool) -> Schema {
    let mut fields = vec![
        SchemaNode::required("doors", PType::I32),
        SchemaNode::required("make", PType::Utf8),
        SchemaNode::required("model", PType::Utf8),
        SchemaNode::required("year", PType::I32),
        SchemaNode::required("registration", PType::Utf8),
    ];
    if with_extras {
        fields.push(
            SchemaNode::group(
                "optionalExtra",
                Repetition::Optional,
                [SchemaNode::required("colour", PType::Utf8)],
            )
            .unwrap(),
        );
    }
    fields.push(engine());
    fields.push(service_history());
    Schema::try_new("Car", fields).unwrap()
}

fn car(i: usize) -> Record {
    let engine = Record::new()
        .with("type", if i % 2 == 0 { "ELECTRIC" } else { "PETROL" })
        .with("capacity", 85.0f32)
        .with("hasTurboCharger", false);
    let history = (i % 4 == 0).then(|| {
        Record::new().with(
            "service",
            vec![
                Record::new()
                    .with("date", 1374084640i64)
                    .with("mechanic", "Elon Musk"),
            ],
        )
    });
    Record::new()
        .with("doors", 2)
        .with("make", "Tesla")
        .with("model", "Model X")
        .with("year", 2014)
        .with("registration", "Calfornia")
        .with("optionalExtra", Record::new().with("colour", "black"))
        .with("engine", engine)
        .with("serviceHistory", history)
}

#[derive(Debug)]
struct ElectricCarFilter;

impl UnboundFilter for ElectricCarFilter {
    fn predicate(&self) -> Predicate {
        column("engine.type", eq("ELECTRIC"))
    }
}

fn filters() -> FilterRegistry {
    FilterRegistry::new().with("electric", || Arc::new(ElectricCarFilter) as FilterRef)
}

struct Job {
    dir: tempfile::TempDir,
    config: JobConfig,
}

/// Writes ten cars and configures a read of them that keeps electric cars without extras.
fn job() -> Job {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("cars.plait");
    let summary = run_write_task(
        &JobConfig::new(car_schema(true), &staged),
        (0..10).map(|i| (i, car(i))),
    )
    .unwrap();
    assert_eq!(summary.records_written, 10);

    let config = JobConfig::new(car_schema(true), dir.path().join("out.plait"))
        .with_input_path(staged)
        .with_requested_projection(car_schema(false))
        .with_unbound_filter("electric");
    Job { dir, config }
}

#[test]
fn read_task_skips_petrol_cars() {
    let job = job();
    let mut sink: Vec<Option<Record>> = Vec::new();
    let summary = run_read_task(&job.config, &filters(), &mut sink).unwrap();
    assert_eq!(
        summary,
        TaskSummary {
            records_read: 10,
            records_matched: 5,
            records_written: 5,
        }
    );

    assert_eq!(sink.len(), 10);
    for (i, record) in sink.into_iter().enumerate() {
        match record {
            Some(record) => {
                assert_eq!(i % 2, 0, "petrol car {i} passed the filter");
                assert!(!record.contains("optionalExtra"));
                assert_eq!(record, car(i).without("optionalExtra"));
            }
            None => assert_eq!(i % 2, 1, "electric car {i} was filtered"),
        }
    }
}

#[test]
fn map_task_writes_electric_cars() {
    let job = job();
    let summary = run_map_task(&job.config, &filters(), |car| Ok(car.into_iter().collect())).unwrap();
    assert_eq!(summary.records_written, 5);

    let output = std::fs::File::open(&job.config.output_path).unwrap();
    let cars = PlaitOpenOptions::new(output).open().unwrap().read_all().unwrap();
    assert_eq!(cars.len(), 5);
    for (line, car_read) in cars.iter().enumerate() {
        assert_eq!(
            car_read.get_path(&"engine.type".into()),
            Some(&Value::from("ELECTRIC"))
        );
        // Projection removed the extras, so the output holds them as absent.
        let expected = car(line * 2).with("optionalExtra", Value::Null);
        assert_eq!(car_read, &expected, "line {line}");
        assert_eq!(
            car_read.get("serviceHistory").is_some_and(|h| !h.is_null()),
            line * 2 % 4 == 0
        );
    }
}

#[test]
fn mapper_errors_fail_the_task() {
    let job = job();
    let err = run_map_task(&job.config, &filters(), |car| match car {
        Some(_) => Err(plait::error::plait_err!("mapper gave up")),
        None => Ok(vec![]),
    })
    .unwrap_err();
    assert!(err.to_string().contains("mapper gave up"));
    assert!(!job.config.output_path.exists());
    let files: Vec<_> = std::fs::read_dir(job.dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec![std::ffi::OsString::from("cars.plait")]);
}

#[rstest]
#[case::mechanic(column("serviceHistory.service.mechanic", eq("Elon Musk")), vec![0, 4, 8])]
#[case::no_history(column("serviceHistory.service.date", ColumnPredicate::IsNull), vec![1, 2, 3, 5, 6, 7, 9])]
#[case::user_defined(
    column(
        "engine.capacity",
        ColumnPredicate::user_defined("big_battery", |v: &Value| v.as_f64().is_some_and(|c| c > 80.0))
    ),
    (0..10).collect()
)]
fn pushdown_on_file(#[case] predicate: Predicate, #[case] expected: Vec<usize>) {
    let job = job();
    let file = PlaitOpenOptions::new(std::fs::File::open(job.config.input_path.unwrap()).unwrap())
        .open()
        .unwrap();
    let positions = file
        .scan(file.scan_builder().with_projection(["make"]).with_filter(predicate))
        .unwrap()
        .enumerate()
        .filter_map(|(i, r)| r.unwrap().map(|_| i))
        .collect::<Vec<_>>();
    assert_eq!(positions, expected);
}

#[test]
fn mismatched_columns_desync() -> PlaitResult<()> {
    let long = PlaitWriteOptions::new(car_schema(true)).write(Vec::new(), (0..10).map(car))?;
    let short = PlaitWriteOptions::new(car_schema(true)).write(Vec::new(), (0..9).map(car))?;
    let long = PlaitOpenOptions::new(bytes::Bytes::from(long)).open()?;
    let short = PlaitOpenOptions::new(bytes::Bytes::from(short)).open()?;

    let scan = long.scan_builder().build(|source, _| {
        let file = if source == 1 { &short } else { &long };
        file.column_chunk(source).map(|chunk| chunk.reader())
    })?;
    let items = scan.collect::<Vec<_>>();
    assert_eq!(items.len(), 10);
    assert!(items[..9].iter().all(|item| matches!(item, Ok(Some(_)))));
    assert!(matches!(items[9], Err(PlaitError::ColumnDesync(..))));
    Ok(())
}
