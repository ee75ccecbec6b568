//! Integration tests for guard crate

#[cfg(test)]
mod tests {
    use filever_guard::*;
    use filever_hash::{hash_bytes, HashAlgorithm};
    use filever_types::IndexedFileItem;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_verify_free_function() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("movie.mkv");
        tokio::fs::write(&path, b"frames").await.unwrap();

        let items = vec![IndexedFileItem {
            ok: true,
            path: path.display().to_string(),
            length: 6,
            hash: hash_bytes(HashAlgorithm::Sha384, b"frames"),
            error: None,
        }];
        let stats = Arc::new(VerificationStats::new(1, 6));

        let result = verify("sha-384", items, 0, &stats).await.unwrap();

        assert!(result.mismatches.is_empty());
        assert!(!result.operation_id.is_empty());
        let snap = stats.snapshot();
        assert_eq!(snap.ok, 1);
        assert_eq!(snap.processed, 1);
        assert_eq!(snap.bytes_hashed, 6);
    }

    #[tokio::test]
    async fn test_compare_splits_free_function() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.bin");
        let b = temp.path().join("b.bin");
        tokio::fs::write(&a, vec![1u8; 100]).await.unwrap();
        tokio::fs::write(&b, vec![1u8; 100]).await.unwrap();

        let result = compare_splits(&[a, b], 7, "SHA512").await.unwrap();

        assert!(result.is_identical());
        assert_eq!(result.windows, split_windows(100, 7));
        assert_eq!(result.split_hashes.len(), 7);
        assert!(result.split_hashes.iter().all(|row| row[0] == row[1]));
    }
}
