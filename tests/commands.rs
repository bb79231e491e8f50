use std::fs;

use what_topic::commands::{self, BreakdownOptions, SimilarOptions};
use what_topic::{AnalysisConfig, Corpus, Scale, TopicModel};

const MODEL: &str = r#"{
    "terms": ["nasa", "orbit", "god", "church", "game", "team"],
    "topic_terms": [
        [0.9, 0.8, 0.0, 0.1, 0.0, 0.0],
        [0.0, 0.0, 0.7, 0.9, 0.1, 0.0],
        [0.0, 0.1, 0.0, 0.0, 0.6, 0.8]
    ],
    "doc_topics": [
        [0.7, 0.25, 0.05],
        [0.0, 0.0, 0.0],
        [0.1, 0.1, 0.8]
    ],
    "topic_labels": ["space", "religion", "sports"]
}"#;

fn config_file(dir: &std::path::Path, json: &str) -> AnalysisConfig {
    let path = dir.join("config.json");
    fs::write(&path, json).unwrap();
    AnalysisConfig::load(Some(&path)).unwrap()
}

#[test]
fn breakdown_csv_per_document_uses_config_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), r#"{"major_threshold_percent": 30, "top_terms": 2}"#);
    let model_path = dir.path().join("model.json");
    fs::write(&model_path, MODEL).unwrap();
    let model = TopicModel::from_file(&model_path).unwrap();

    let out = dir.path().join("charts");
    fs::create_dir(&out).unwrap();
    let options = BreakdownOptions::resolve(&config, None, false);
    let breakdowns = commands::document_breakdowns(&model, &[0, 2], &options, Some(&out)).unwrap();

    assert_eq!(breakdowns.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(breakdowns[&0].minor_labels, vec!["religion", "sports"]);
    assert_eq!(
        fs::read_to_string(out.join("doc0_data.csv")).unwrap(),
        "name,value,words\nspace,0.7,nasa / orbit\nothers,0.3,\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("doc2_data.csv")).unwrap(),
        "name,value,words\nsports,0.8,team / game\nothers,0.2,\n"
    );
    assert!(!out.join("doc1_data.csv").exists());
}

#[test]
fn breakdown_flags_override_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), r#"{"major_threshold_percent": 30, "scale": "percent"}"#);
    let model: TopicModel = serde_json::from_str(MODEL).unwrap();

    let options = BreakdownOptions::resolve(&config, Some(4.0), true);
    assert_eq!(options.scale, Scale::Fraction);
    let breakdowns = commands::document_breakdowns(&model, &[0], &options, None).unwrap();

    let b = &breakdowns[&0];
    assert_eq!(b.scale, Scale::Fraction);
    assert_eq!(b.major.len(), 3);
    assert!((b.major[0].percentage - 0.7).abs() < 1e-9);
    assert_eq!(b.others, 0.0);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn breakdown_rejects_unknown_document() {
    let model: TopicModel = serde_json::from_str(MODEL).unwrap();
    let options = BreakdownOptions::resolve(&AnalysisConfig::default(), None, false);
    assert!(commands::document_breakdowns(&model, &[3], &options, None).is_err());
}

#[test]
fn neighbour_tally_csv_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), r#"{"neighbors": 2}"#);
    let corpus: Corpus = serde_json::from_str(
        r#"{
            "similarity": [
                [1.0, 0.9, 0.1, 0.3],
                [0.9, 1.0, 0.2, 0.8],
                [0.1, 0.2, 1.0, 0.4],
                [0.3, 0.8, 0.4, 1.0]
            ],
            "labels": ["sci.space", "sci.med", "alt.atheism", "sci.crypt"]
        }"#,
    )
    .unwrap();
    corpus.validate().unwrap();

    let by_group = SimilarOptions::resolve(&config, None, false);
    assert_eq!(by_group.neighbors, 2);
    let tallies = commands::neighbour_tallies(&corpus, &[1], &by_group, Some(dir.path())).unwrap();
    assert_eq!(tallies[&1].total(), 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("document_1_data.csv")).unwrap(),
        "journal,count\nsci.space,1\nsci.crypt,1\n"
    );

    let general = SimilarOptions::resolve(&config, None, true);
    commands::neighbour_tallies(&corpus, &[1], &general, Some(dir.path())).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("document_1_data.csv")).unwrap(),
        "journal,count\nScience,2\n"
    );
}
