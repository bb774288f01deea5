//! Tests for workspace module.

#[cfg(test)]
mod tests {
    use crate::workspace::{
        read_manifest, search_files, ExampleCorpusScanner, FileSystem, WorkspaceFs,
    };
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_file(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = File::create(&path).unwrap();
        write!(f, "{}", content).unwrap();
    }

    #[tokio::test]
    async fn test_list_files_matches_pattern_and_skips_excluded() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "src/sum.test.ts", "test sum");
        write_file(temp_dir.path(), "src/sum.ts", "export const sum = 1;");
        write_file(temp_dir.path(), "node_modules/lib/lib.test.js", "vendored");

        let fs = WorkspaceFs::new(temp_dir.path());
        let found = fs
            .list_files("*.{test,spec}.*", &["node_modules"], 10)
            .await
            .unwrap();

        assert_eq!(found, vec![PathBuf::from("src/sum.test.ts")]);
    }

    #[tokio::test]
    async fn test_list_files_respects_limit() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.test.ts", "b.test.ts", "c.test.ts"] {
            write_file(temp_dir.path(), name, name);
        }

        let fs = WorkspaceFs::new(temp_dir.path());
        let found = fs.list_files("*.test.*", &[], 2).await.unwrap();
        assert_eq!(found.len(), 2);

        let none = fs.list_files("*.test.*", &[], 0).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_files_rejects_bad_glob() {
        let temp_dir = TempDir::new().unwrap();
        let fs = WorkspaceFs::new(temp_dir.path());
        let err = fs.list_files("src/[", &[], 10).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_read_text_relative_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "notes/readme.md", "hello");

        let fs = WorkspaceFs::new(temp_dir.path());
        assert_eq!(
            fs.read_text(Path::new("notes/readme.md")).await.unwrap(),
            "hello"
        );
        assert!(fs.read_text(Path::new("missing.md")).await.is_err());
    }

    #[tokio::test]
    async fn test_read_text_stays_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "project/src/lib.ts", "export {}");
        write_file(temp_dir.path(), "secret.env", "OPENAI_API_KEY=sk-live");

        let fs = WorkspaceFs::new(temp_dir.path().join("project"));

        let err = fs.read_text(Path::new("../secret.env")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);

        let err = fs
            .read_text(Path::new("src/../../secret.env"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);

        let absolute = temp_dir.path().join("secret.env");
        let err = fs.read_text(&absolute).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        assert_eq!(
            fs.read_text(Path::new("src/../src/lib.ts")).await.unwrap(),
            "export {}"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_text_rejects_symlink_out_of_root() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "project/keep.txt", "");
        write_file(temp_dir.path(), "secret.env", "OPENAI_API_KEY=sk-live");
        std::os::unix::fs::symlink(
            temp_dir.path().join("secret.env"),
            temp_dir.path().join("project/link.env"),
        )
        .unwrap();

        let fs = WorkspaceFs::new(temp_dir.path().join("project"));
        let err = fs.read_text(Path::new("link.env")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_scan_is_sorted_and_capped_at_two() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "tests/c.spec.js", "c");
        write_file(temp_dir.path(), "tests/a.test.js", "a");
        write_file(temp_dir.path(), "tests/b.test.js", "b");

        let fs = WorkspaceFs::new(temp_dir.path());
        let examples = ExampleCorpusScanner::new(&fs).scan().await;

        let paths: Vec<_> = examples.iter().map(|t| t.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("tests/a.test.js"),
                PathBuf::from("tests/b.test.js")
            ]
        );
        let contents: Vec<_> = examples.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_scan_with_no_tests_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "src/index.ts", "export {}");

        let fs = WorkspaceFs::new(temp_dir.path());
        let examples = ExampleCorpusScanner::new(&fs).scan().await;
        assert!(examples.is_empty());
    }

    #[tokio::test]
    async fn test_scan_skips_unreadable_candidates() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "b.test.ts", "readable");
        write_file(temp_dir.path(), "c.test.ts", "also readable");
        // Not valid UTF-8, so read_text fails.
        fs::write(temp_dir.path().join("a.test.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let fs = WorkspaceFs::new(temp_dir.path());
        let examples = ExampleCorpusScanner::new(&fs).scan().await;

        let paths: Vec<_> = examples.iter().map(|t| t.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("b.test.ts"), PathBuf::from("c.test.ts")]
        );
    }

    #[tokio::test]
    async fn test_scan_reaches_past_many_unreadable_candidates() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..40 {
            fs::write(
                temp_dir.path().join(format!("a{:02}.test.png", i)),
                [0xff, 0xfe, 0x00],
            )
            .unwrap();
        }
        write_file(temp_dir.path(), "z.test.ts", "test('z', () => {});");

        let fs = WorkspaceFs::new(temp_dir.path());
        let examples = ExampleCorpusScanner::new(&fs).scan().await;

        let paths: Vec<_> = examples.iter().map(|t| t.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("z.test.ts")]);
    }

    #[tokio::test]
    async fn test_read_manifest_prefers_package_json() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "Cargo.toml", "[package]");
        write_file(
            temp_dir.path(),
            "package.json",
            r#"{"devDependencies":{"vitest":"^1.0.0"}}"#,
        );

        let fs = WorkspaceFs::new(temp_dir.path());
        let manifest = read_manifest(&fs).await.unwrap();
        assert_eq!(manifest.file_name, "package.json");
        assert!(manifest.content.contains("vitest"));
    }

    #[tokio::test]
    async fn test_read_manifest_skips_empty_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        let fs = WorkspaceFs::new(temp_dir.path());
        assert!(read_manifest(&fs).await.is_none());

        write_file(temp_dir.path(), "package.json", "   \n");
        write_file(temp_dir.path(), "go.mod", "module example.com/m");
        let manifest = read_manifest(&fs).await.unwrap();
        assert_eq!(manifest.file_name, "go.mod");
    }

    #[tokio::test]
    async fn test_search_files_by_prefix() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "src/utils/format.ts", "");
        write_file(temp_dir.path(), "src/format.test.ts", "");
        write_file(temp_dir.path(), "dist/format.js", "");
        write_file(temp_dir.path(), "src/parse.ts", "");

        let fs = WorkspaceFs::new(temp_dir.path());
        let found = search_files(&fs, "format").await.unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("src/format.test.ts"),
                PathBuf::from("src/utils/format.ts")
            ]
        );

        assert!(search_files(&fs, "  ").await.unwrap().is_empty());
    }
}
