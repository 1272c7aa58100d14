use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use faraday_phase::config::{Calibration, Config};
use faraday_phase::data::boundary::{extract_boundary, BoundaryPolicy};
use faraday_phase::data::catalog::{Catalog, Sweep};
use faraday_phase::data::loader::load_table;
use faraday_phase::data::model::RawValue;
use faraday_phase::data::store::{convert_directory, load_datasets, read_dataset};
use faraday_phase::error::IngestError;
use faraday_phase::images::convert_tiff_tree;
use faraday_phase::view::PhaseView;

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_single_row_end_to_end() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(
        raw.path(),
        "water_up.csv",
        "drive_frequency,Frequency,gamma_lower,gamma_upper,picture_id\n,6.5,200,-,-\n",
    );

    let written = convert_directory(raw.path(), out.path(), &Calibration::default()).unwrap();
    assert_eq!(written, vec![out.path().join("water-up.json")]);

    let ds = read_dataset(&written[0]).unwrap();
    assert_eq!(ds.id, "water-up");
    assert_eq!(ds.source, "water_up.csv");
    assert_eq!(ds.regions.len(), 1);

    let r = &ds.regions[0];
    assert_eq!(r.index, 0);
    assert_eq!(r.gamma_lower, Some(0.8));
    assert_eq!(r.gamma_upper, None);
    assert_eq!(r.frequency_min, Some(6.0));
    assert_eq!(r.frequency_max, Some(7.0));
    assert_eq!(r.picture_id, None);
    assert_eq!(r.drive_frequency, None);

    assert!(extract_boundary(&ds.regions, &BoundaryPolicy::default()).is_empty());

    // The document keeps the dash literally.
    let text = std::fs::read_to_string(&written[0]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["regions"][0]["picture_id"], "-");
    assert!(json["regions"][0]["gamma_upper"].is_null());
    assert_eq!(json["meta"]["sensitivity_mv_per_g"], 250.0);
}

#[test]
fn test_document_round_trip_is_lossless() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(
        raw.path(),
        "oil_down.csv",
        "drive frequency,Frequency,gamma_lower,gamma_upper,picture_id\n\
         14,7,150,260,IMG_1\n\
         14,7,x,,-\n\
         16,8,125,-,IMG_2\n",
    );
    let written = convert_directory(raw.path(), out.path(), &Calibration::default()).unwrap();
    let ds = read_dataset(&written[0]).unwrap();

    let rows = load_table(&raw.path().join("oil_down.csv")).unwrap();
    let rebuilt = faraday_phase::build_dataset("oil_down.csv", &rows, &Calibration::default());
    assert_eq!(ds, rebuilt);
    assert_eq!(ds.regions[1].gamma_lower, None);
    assert_eq!(ds.regions[0].drive_frequency, Some(14.0));
}

#[test]
fn test_missing_input_directory_fails_before_writing() {
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("datasets");
    let err = convert_directory(Path::new("/no/such/dir"), &target, &Calibration::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<IngestError>(),
        Some(IngestError::MissingSource { .. })
    ));
    assert!(!target.exists());
}

#[test]
fn test_colliding_dataset_ids_are_rejected() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let header = "drive_frequency,Frequency,gamma_lower,gamma_upper,picture_id\n";
    write(raw.path(), "water_up.csv", &format!("{header}12,6,150,-,a\n"));
    write(
        raw.path(),
        "Water-Up.csv",
        &format!("{header}12,6,150,-,a\n14,7,200,-,b\n"),
    );

    let target = out.path().join("datasets");
    let err = convert_directory(raw.path(), &target, &Calibration::default()).unwrap_err();
    match err.downcast_ref::<IngestError>() {
        Some(IngestError::DuplicateDataset { id, first, second }) => {
            assert_eq!(id, "water-up");
            assert_eq!(first, &raw.path().join("Water-Up.csv"));
            assert_eq!(second, &raw.path().join("water_up.csv"));
        }
        other => panic!("expected DuplicateDataset, got {other:?}"),
    }
    // Nothing is written when any two tables collide.
    assert!(!target.exists());
}

#[test]
fn test_invalid_calibration_is_rejected() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let calibration = Calibration {
        sensitivity_mv_per_g: 0.0,
        df: 1.0,
    };
    assert!(convert_directory(raw.path(), out.path(), &calibration).is_err());
}

#[test]
fn test_parquet_cells_are_typed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glycerol_up.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("drive_frequency", DataType::Int64, true),
        Field::new("Frequency", DataType::Float64, true),
        Field::new("gamma_lower", DataType::Float64, true),
        Field::new("gamma_upper", DataType::Utf8, true),
        Field::new("picture_id", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![Some(13), None])),
            Arc::new(Float64Array::from(vec![Some(6.5), Some(7.5)])),
            Arc::new(Float64Array::from(vec![Some(200.0), None])),
            Arc::new(StringArray::from(vec![Some("-"), Some("300")])),
            Arc::new(StringArray::from(vec![Some("p1"), None])),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let rows = load_table(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].drive_frequency, RawValue::Number(13.0));
    assert_eq!(rows[0].frequency, RawValue::Number(6.5));
    assert_eq!(rows[0].gamma_upper, RawValue::from("-"));
    assert_eq!(rows[1].drive_frequency, RawValue::Missing);
    assert_eq!(rows[1].picture_id, RawValue::Missing);

    let ds = faraday_phase::build_dataset("glycerol_up.parquet", &rows, &Calibration::default());
    assert_eq!(ds.regions[0].gamma_lower, Some(0.8));
    assert_eq!(ds.regions[1].gamma_upper, Some(1.2));
    assert!(ds.regions[1].picture_id.is_none());
}

#[test]
fn test_parquet_rows_span_every_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glycerol_down.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("Frequency", DataType::Float64, true),
        Field::new("gamma_lower", DataType::Float64, true),
        Field::new("picture_id", DataType::Utf8, true),
    ]));
    let batch = |freqs: Vec<f64>, ids: Vec<&str>| {
        RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(freqs.clone())),
                Arc::new(Float64Array::from(vec![100.0; freqs.len()])),
                Arc::new(StringArray::from(ids)),
            ],
        )
        .unwrap()
    };
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema.clone(), None).unwrap();
    writer.write(&batch(vec![6.0, 7.0], vec!["a", "b"])).unwrap();
    writer.flush().unwrap();
    writer.write(&batch(vec![8.0], vec!["c"])).unwrap();
    writer.close().unwrap();

    let rows = load_table(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].frequency, RawValue::Number(8.0));
    assert_eq!(rows[2].picture_id, RawValue::from("c"));
    // absent columns stay missing in every batch
    assert!(rows.iter().all(|r| r.gamma_upper == RawValue::Missing));
}

#[cfg(unix)]
#[test]
fn test_pattern_tree_with_cycle_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("patterns");
    let output = dir.path().join("patterns_png");
    std::fs::create_dir_all(input.join("water/run1")).unwrap();
    image::RgbImage::from_pixel(3, 3, image::Rgb([0, 120, 255]))
        .save_with_format(input.join("water/run1/IMG_1.tif"), image::ImageFormat::Tiff)
        .unwrap();
    // a link from deep in the tree back to its root
    std::os::unix::fs::symlink(&input, input.join("water/run1/back")).unwrap();

    let report = convert_tiff_tree(&input, &output, false).unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.converted, 1);
    assert_eq!(report.failed, 0);
    assert!(output.join("water/run1/IMG_1.png").is_file());
}

#[test]
fn test_catalog_and_view_from_documents() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let header = "drive_frequency,Frequency,gamma_lower,gamma_upper,picture_id\n";
    write(
        raw.path(),
        "water_up.csv",
        &format!("{header}12,6,150,250,u1\n12,6,125,-,u2\n14,7,200,-,-\n14,7,225,300,u3\n"),
    );
    write(
        raw.path(),
        "water_down.csv",
        &format!("{header}12,6,100,-,d1\n14,7,175,250,d2\n16,8,0,-,d3\n"),
    );
    write(raw.path(), "notes.txt", "ignored");

    convert_directory(raw.path(), out.path(), &Calibration::default()).unwrap();
    let catalog = Catalog::from_datasets(load_datasets(out.path()).unwrap());
    assert_eq!(catalog.fluids(), vec!["water"]);

    let pair = catalog.pair("water");
    let up = extract_boundary(&pair.up.unwrap().regions, &BoundaryPolicy::default());
    let down = extract_boundary(&pair.down.unwrap().regions, &BoundaryPolicy::default());
    assert_eq!(up.len(), 2);
    assert_eq!(up[0].threshold, 0.5);
    assert_eq!(up[1].threshold, 0.9);
    // the zero reading at 8 Hz is not a threshold
    assert_eq!(down.len(), 2);
    assert_eq!(down[0].threshold, 0.4);

    let view = PhaseView::build("water", pair, &Config::default());
    assert_eq!(view.layer(Sweep::Up).unwrap().boundary, up);
    assert_eq!(view.layer(Sweep::Down).unwrap().boundary_px.len(), 2);
    assert_eq!(view.hysteresis.len(), 2);
    assert!(view.hysteresis.iter().all(|h| h.gap().unwrap() > 0.0));

    // Same documents, same view.
    let again = PhaseView::build("water", catalog.pair("water"), &Config::default());
    assert_eq!(view, again);
}
