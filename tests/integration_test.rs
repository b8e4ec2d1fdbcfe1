//! Integration test: record → train → persist → authenticate, plus stream properties.

use pulse_auth::{
    auth::{run_session, Decision, StreamAuthenticator},
    config::{AppConfig, WindowConfig},
    features::{extract_features, FeatureVector, WindowBuffer, FEATURE_DIM},
    model::{BaselineModel, Trainer, STD_FLOOR},
    source::{parse_record, LineSource, SampleRecord},
    storage::{read_samples, ModelStore, SampleRecorder, LABEL_SELF},
    Error,
};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Periodic pulse-like waveform, 20 samples per period.
fn pulse(i: usize, amplitude: f32) -> f32 {
    let phase = (i % 20) as f32 / 20.0;
    500.0 + (amplitude * (2.0 * std::f32::consts::PI * phase).sin()).round()
}

fn protocol_lines(samples: impl Iterator<Item = f32>) -> String {
    samples
        .enumerate()
        .map(|(i, adc)| format!("S,{},{}\n", i * 10, adc))
        .collect()
}

#[test]
fn config_load_default() {
    let c = AppConfig::load(Path::new("nonexistent.json")).unwrap();
    assert_eq!(c.window.win_n(), 800);
    assert_eq!(c.window.step_n(), 200);
    assert_eq!(c.auth.threshold, 6.0);
}

#[test]
fn constant_stream_emits_two_zero_windows() {
    // fs=100, win_s=1.0, step_s=1.0 → win_n = step_n = 100
    let mut buf = WindowBuffer::from_config(&WindowConfig::new(100, 1.0, 1.0)).unwrap();
    let windows: Vec<Vec<f32>> = (0..250).filter_map(|_| buf.ingest(5.0)).collect();
    assert_eq!(windows.len(), 2);
    for w in &windows {
        assert_eq!(w.len(), 100);
        assert_eq!(extract_features(w), FeatureVector([0.0; FEATURE_DIM]));
    }
}

#[test]
fn malformed_record_does_not_enqueue() {
    let model = BaselineModel {
        window: WindowConfig::new(100, 1.0, 1.0),
        mean: FeatureVector([0.0; FEATURE_DIM]),
        std: FeatureVector([1.0; FEATURE_DIM]),
    };
    let mut auth = StreamAuthenticator::new(model, 6.0).unwrap();

    assert!(parse_record("S,100").is_err());
    assert!(auth.on_record("S,100").is_none());
    assert_eq!(auth.buffered(), 0);

    assert_eq!(
        parse_record("S,100,512").unwrap(),
        SampleRecord { ms: Some(100), adc: 512.0 }
    );
    auth.on_record("S,100,512");
    assert_eq!(auth.buffered(), 1);

    // only the ADC field gates a record
    auth.on_record("S,n/a,513");
    assert_eq!(auth.buffered(), 2);
}

#[test]
fn short_recording_fails_training() {
    let trainer = Trainer::new(WindowConfig::new(100, 1.0, 1.0)).unwrap();
    let samples = vec![512.0f32; 99];
    assert!(matches!(trainer.fit(&samples), Err(Error::Configuration(_))));
}

#[test]
fn emission_count_formula() {
    for w in 1..8 {
        for s in 1..=w {
            for l in 0..40 {
                let mut buf = WindowBuffer::new(w, s).unwrap();
                let n = (0..l).filter_map(|i| buf.ingest(i as f32)).count();
                let expected = if l >= w { (l - w) / s + 1 } else { 0 };
                assert_eq!(n, expected, "w={w} s={s} l={l}");
            }
        }
    }
}

#[test]
fn repeated_features_fit_to_floor() {
    let window: Vec<f32> = (0..64).map(|i| pulse(i, 80.0)).collect();
    let fv = extract_features(&window);
    let model = BaselineModel::fit(&vec![fv; 4], WindowConfig::new(64, 1.0, 1.0)).unwrap();
    assert_eq!(model.mean, fv);
    assert!(model.std.as_slice().iter().all(|&s| s == STD_FLOOR as f32));
    assert_eq!(model.score(&fv), 0.0);
}

#[test]
fn record_train_and_authenticate() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("me.csv");
    let model_path = dir.path().join("model.json");

    // enrolled user's recording, plus someone else's rows in the same file
    let mut me = SampleRecorder::open(&csv, LABEL_SELF).unwrap();
    for i in 0..400 {
        let rec = SampleRecord {
            ms: Some(i as u64 * 50),
            adc: pulse(i, 100.0),
        };
        me.record_at(1_700_000_000.0 + i as f64 * 0.05, &rec).unwrap();
    }
    me.flush().unwrap();
    drop(me);
    let mut other = SampleRecorder::open(&csv, 0).unwrap();
    for i in 0..50 {
        let rec = SampleRecord { ms: Some(i), adc: 10.0 };
        other.record_at(1_700_000_100.0, &rec).unwrap();
    }
    other.flush().unwrap();
    drop(other);

    let samples = read_samples(&csv, Some(LABEL_SELF)).unwrap();
    assert_eq!(samples.len(), 400);

    // step equals the waveform period, so every training window is identical
    let trainer = Trainer::new(WindowConfig::new(20, 5.0, 1.0)).unwrap();
    let report = trainer.fit(&samples).unwrap();
    assert_eq!(report.windows, 16);
    ModelStore::new(&model_path).save(&report.model).unwrap();

    let model = ModelStore::new(&model_path).load().unwrap();
    assert_eq!(model, report.model);

    let stop = AtomicBool::new(false);

    let mut auth = StreamAuthenticator::new(model.clone(), 6.0).unwrap();
    let mut genuine: Vec<Decision> = Vec::new();
    let input = protocol_lines((0..200).map(|i| pulse(i, 100.0)));
    let stats = run_session(&mut LineSource::new(Cursor::new(input)), &mut auth, &mut genuine, &stop)
        .unwrap();
    assert_eq!(stats.decisions, 6);
    assert_eq!(stats.accepted, 6);
    assert!(genuine.iter().all(|d| d.accept && d.distance == 0.0));
    assert_eq!(genuine.iter().map(|d| d.window).collect::<Vec<_>>(), (0..6).collect::<Vec<u64>>());

    let mut auth = StreamAuthenticator::new(model, 6.0).unwrap();
    let mut impostor: Vec<Decision> = Vec::new();
    let input = protocol_lines((0..200).map(|i| pulse(i, 40.0)));
    let stats = run_session(&mut LineSource::new(Cursor::new(input)), &mut auth, &mut impostor, &stop)
        .unwrap();
    assert_eq!(stats.decisions, 6);
    assert_eq!(stats.accepted, 0);
    assert!(impostor.iter().all(|d| !d.accept && d.distance > 6.0));
}

#[test]
fn model_with_wrong_dimension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let mean = vec![0.0f32; 64];
    let std = vec![1.0f32; 64];
    let json = serde_json::json!({"fs": 100, "win_s": 8.0, "step_s": 2.0, "mean": mean, "std": std});
    std::fs::write(&path, json.to_string()).unwrap();
    assert!(matches!(
        ModelStore::new(&path).load(),
        Err(Error::ModelIncompatibility(_))
    ));
}
