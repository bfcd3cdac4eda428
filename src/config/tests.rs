use super::*;

fn valid_config() -> Config {
    Config {
        embedding: EmbeddingConfig {
            api_key: "jina-test-key".to_string(),
            ..Config::default().embedding
        },
        llm: LlmConfig {
            api_key: "sk-test-key".to_string(),
            ..Config::default().llm
        },
        ..Config::default()
    }
}

#[test]
fn default_values_match_original_settings() {
    let config = Config::default();

    assert_eq!(config.splitter.chunk_size, 1000);
    assert_eq!(config.splitter.chunk_overlap, 200);
    assert_eq!(config.search_k, 3);
    assert_eq!(config.llm.model, "deepseek-chat");
    assert_eq!(config.llm.temperature, 0.0);
    assert_eq!(config.embedding.model, "jina-embeddings-v4");
    assert!(!config.embedding.late_chunking);
    assert_eq!(config.store.metric, DistanceMetric::InnerProduct);
    assert_eq!(config.store.consistency, ConsistencyLevel::Bounded);
}

#[test]
fn validate_accepts_complete_config() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn validate_rejects_missing_api_keys() {
    let mut config = valid_config();
    config.embedding.api_key = String::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingCredential("JINAAI_API_KEY"))
    ));

    let mut config = valid_config();
    config.llm.api_key = "   ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingCredential("DEEPSEEK_API_KEY"))
    ));
}

#[test]
fn validate_rejects_overlap_not_smaller_than_chunk_size() {
    let mut config = valid_config();
    config.splitter.chunk_size = 100;
    config.splitter.chunk_overlap = 100;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OverlapTooLarge(100, 100))
    ));
}

#[test]
fn validate_rejects_bad_urls_and_ranges() {
    let mut config = valid_config();
    config.llm.base_url = "not a url".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

    let mut config = valid_config();
    config.llm.temperature = 2.5;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTemperature(_))
    ));

    let mut config = valid_config();
    config.search_k = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidSearchK(0))
    ));

    let mut config = valid_config();
    config.splitter.chunk_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidChunkSize(0))
    ));
}

#[test]
fn distance_metric_parsing() {
    assert_eq!(
        "ip".parse::<DistanceMetric>().expect("should parse"),
        DistanceMetric::InnerProduct
    );
    assert_eq!(
        "L2".parse::<DistanceMetric>().expect("should parse"),
        DistanceMetric::Euclidean
    );
    assert!("cosine".parse::<DistanceMetric>().is_err());
}

#[test]
fn consistency_level_parsing() {
    assert_eq!(
        "Strong".parse::<ConsistencyLevel>().expect("should parse"),
        ConsistencyLevel::Strong
    );
    assert_eq!(
        "eventually".parse::<ConsistencyLevel>().expect("should parse"),
        ConsistencyLevel::Eventual
    );
    assert!("session".parse::<ConsistencyLevel>().is_err());
}

#[test]
fn pattern_list_parsing() {
    assert_eq!(
        parse_patterns("docs/en/faq/*.md, docs/en/embeddings/*.md"),
        vec![
            "docs/en/faq/*.md".to_string(),
            "docs/en/embeddings/*.md".to_string()
        ]
    );
    assert_eq!(parse_patterns(" , "), Vec::<String>::new());
}
