//! Configuration integration tests

#[cfg(test)]
mod tests {
    use blest_batch::{BlestError, ClientConfig};
    use blest_batch::config::{DEFAULT_BUFFER_DELAY_MS, DEFAULT_MAX_BATCH_SIZE};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "url: https://api.example.com/blest\nmaxBatchSize: 5\nbufferDelay: 20\nhttpHeaders:\n  Authorization: Bearer t"
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).await.unwrap();
        assert_eq!(config.url, "https://api.example.com/blest");
        assert_eq!(config.max_batch_size, 5);
        assert_eq!(config.buffer_delay, Duration::from_millis(20));
        assert_eq!(config.headers["Authorization"], "Bearer t");
    }

    #[tokio::test]
    async fn test_invalid_numbers_fall_back_to_defaults() {
        let config = ClientConfig::from_yaml_str(
            "url: http://localhost:8080\nmax_batch_size: -3\nbuffer_delay: 2.5\n",
        )
        .unwrap();
        assert_eq!(config.max_batch_size, DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(
            config.buffer_delay,
            Duration::from_millis(DEFAULT_BUFFER_DELAY_MS)
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_a_config_error() {
        let err = ClientConfig::from_file("/nonexistent/blest.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, BlestError::Io(_)));
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let err = ClientConfig::from_yaml_str("max_batch_size: 5\n").unwrap_err();
        assert!(matches!(err, BlestError::Yaml(_)));
        assert!(err.is_config_error());
    }
}
