//! End-to-end pipeline runs with in-memory sources and scripted models.

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;

use chrono::{Offset, Utc};

use reflectance_classifier::config::ModelEntry;
use reflectance_classifier::data::model::{Label, SpectralRow};
use reflectance_classifier::inference::{Classifier, ModelError, ModelFormat, ModelLoader};
use reflectance_classifier::pipeline::{run_with, PipelineError, RunOptions, TextReport};
use reflectance_classifier::source::{FetchError, FileSource, RowSource};

struct StaticSource(SpectralRow);

impl RowSource for StaticSource {
    fn fetch(&self) -> Result<SpectralRow, FetchError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

struct FailingSource;

impl RowSource for FailingSource {
    fn fetch(&self) -> Result<SpectralRow, FetchError> {
        Err(FetchError::Status {
            url: "http://instrument/bgdata".to_string(),
            status: 500,
        })
    }

    fn describe(&self) -> String {
        "http://instrument/bgdata".to_string()
    }
}

/// Scores the mean of the reflectance row, times a factor.
struct MeanModel {
    factor: f64,
    format: ModelFormat,
}

impl Classifier for MeanModel {
    fn format(&self) -> ModelFormat {
        self.format
    }

    fn predict(&mut self, row: &SpectralRow) -> Result<f64, ModelError> {
        let features = row.features();
        Ok(self.factor * features.iter().sum::<f64>() / features.len() as f64)
    }
}

/// Loader keyed on the model label; records every load.
#[derive(Default)]
struct ScriptedLoader {
    loaded: RefCell<Vec<String>>,
}

impl ModelLoader for ScriptedLoader {
    fn load(&self, entry: &ModelEntry) -> Result<Box<dyn Classifier>, ModelError> {
        self.loaded.borrow_mut().push(entry.label.clone());
        match entry.label.as_str() {
            "low" => Ok(Box::new(MeanModel {
                factor: 1.0,
                format: ModelFormat::FullGraph,
            })),
            "high" => Ok(Box::new(MeanModel {
                factor: 4.0,
                format: ModelFormat::Quantized,
            })),
            _ => Err(ModelError::NotFound(entry.path.clone())),
        }
    }
}

fn entry(label: &str) -> ModelEntry {
    ModelEntry {
        label: label.to_string(),
        path: PathBuf::from(format!("models/{label}.onnx")),
    }
}

fn options(strict_keys: bool) -> RunOptions {
    RunOptions {
        strict_keys,
        offset: Utc.fix(),
    }
}

fn rows() -> (SpectralRow, SpectralRow) {
    let background = [("400", Some(2.0)), ("500", Some(4.0))].into_iter().collect();
    let sample = [("400", Some(1.0)), ("500", Some(2.0))].into_iter().collect();
    (background, sample)
}

#[test]
fn test_full_run_classifies_each_model() {
    let (background, sample) = rows();
    let loader = ScriptedLoader::default();
    let models = vec![entry("low"), entry("broken"), entry("high")];

    let report = run_with(
        &StaticSource(background),
        &StaticSource(sample),
        &models,
        &loader,
        &options(false),
    )
    .unwrap();

    assert_eq!(report.reflectance.get("400"), Some(Some(0.25)));
    assert_eq!(report.reflectance.get("500"), Some(Some(0.25)));

    assert_eq!(report.outcomes.len(), 3);
    let low = report.outcomes[0].result.as_ref().unwrap();
    assert_eq!(low.score, 0.25);
    assert_eq!(low.label, Some(Label::Regular));

    assert!(matches!(
        report.outcomes[1].result,
        Err(ModelError::NotFound(_))
    ));

    let high = report.outcomes[2].result.as_ref().unwrap();
    assert_eq!(high.score, 1.0);
    assert_eq!(high.label, Some(Label::Optizorb));

    let formats: Vec<_> = report.outcomes.iter().map(|o| o.format).collect();
    assert_eq!(
        formats,
        vec![Some(ModelFormat::FullGraph), None, Some(ModelFormat::Quantized)]
    );

    assert_eq!(report.predictions().count(), 2);
    assert_eq!(*loader.loaded.borrow(), vec!["low", "broken", "high"]);
}

#[test]
fn test_fetch_failure_aborts_before_models() {
    let (_, sample) = rows();
    let loader = ScriptedLoader::default();

    let err = run_with(
        &FailingSource,
        &StaticSource(sample),
        &[entry("low")],
        &loader,
        &options(false),
    )
    .unwrap_err();

    match err {
        PipelineError::Fetch { role, source, .. } => {
            assert_eq!(role, "background");
            assert!(matches!(source, FetchError::Status { status: 500, .. }));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
    assert!(loader.loaded.borrow().is_empty());
}

#[test]
fn test_strict_keys_rejects_mismatch() {
    let background: SpectralRow = [("400", Some(2.0))].into_iter().collect();
    let sample: SpectralRow = [("400", Some(1.0)), ("500", Some(1.0))].into_iter().collect();
    let loader = ScriptedLoader::default();

    let permissive = run_with(
        &StaticSource(background.clone()),
        &StaticSource(sample.clone()),
        &[],
        &loader,
        &options(false),
    )
    .unwrap();
    assert_eq!(permissive.reflectance.get("500"), Some(None));
    assert_eq!(permissive.reflectance.mismatched, vec!["500"]);

    let strict = run_with(
        &StaticSource(background),
        &StaticSource(sample),
        &[],
        &loader,
        &options(true),
    );
    assert!(matches!(strict, Err(PipelineError::Reflectance(_))));
}

#[test]
fn test_file_sources_and_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let bg_path = dir.path().join("background.json");
    let sample_path = dir.path().join("sample.csv");

    std::fs::write(&bg_path, r#"[{"400": 2.0, "500": 0.0}]"#).unwrap();
    let mut csv = std::fs::File::create(&sample_path).unwrap();
    writeln!(csv, "400,500").unwrap();
    writeln!(csv, "1.0,3.0").unwrap();
    drop(csv);

    let loader = ScriptedLoader::default();
    let report = run_with(
        &FileSource::new(&bg_path),
        &FileSource::new(&sample_path),
        &[entry("low")],
        &loader,
        &options(false),
    )
    .unwrap();

    assert_eq!(report.reflectance.get("400"), Some(Some(0.25)));
    assert_eq!(report.reflectance.get("500"), Some(Some(f64::INFINITY)));

    let text = TextReport {
        report: &report,
        analyte: "Paracetamol",
    }
    .to_string();
    assert!(text.starts_with("Time: "));
    assert!(text.contains("Reflectance:"));
    assert!(text.contains("0.250000"));
    assert!(text.contains("Paracetamol type (low, full-graph): Optizorb"));
}
