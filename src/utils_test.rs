#[cfg(test)]
mod tests {
    use crate::utils::*;
    use std::time::Duration;

    #[test]
    fn test_increment_resource_version() {
        assert_eq!(increment_resource_version("").unwrap(), "1");
        assert_eq!(increment_resource_version("1").unwrap(), "2");
        assert_eq!(increment_resource_version("999").unwrap(), "1000");
        assert_eq!(increment_resource_version("42").unwrap(), "43");
        assert!(increment_resource_version("abc").is_err());
    }

    #[test]
    fn test_increment_resource_version_overflow() {
        let err = increment_resource_version(&u64::MAX.to_string()).unwrap_err();
        assert!(matches!(err, crate::Error::Internal(_)));
    }

    #[test]
    fn test_format_duration_matches_go() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(8 * 3600)), "8h0m0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_nanos(1200)), "1.2µs");
        assert_eq!(format_duration(Duration::from_nanos(7)), "7ns");
    }

    #[test]
    fn test_ensure_metadata_defaults() {
        let mut meta = k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta::default();
        ensure_metadata(&mut meta, "hive");
        assert_eq!(meta.namespace.as_deref(), Some("hive"));
        assert!(meta.uid.is_some());
        assert!(meta.creation_timestamp.is_some());
    }
}
