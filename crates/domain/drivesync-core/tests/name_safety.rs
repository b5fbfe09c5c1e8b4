use drivesync_core::path_utils::{RemoteName, STAGING_DIR};

#[test]
fn ordinary_names_are_safe() {
    for name in ["a.txt", "Report 2024.pdf", ".hidden.txt", "..dots.txt", "ünïcode.md"] {
        assert!(RemoteName::verify_safe(name), "{name} should be accepted");
    }
}

#[test]
fn traversal_and_separators_are_rejected() {
    for name in ["", ".", "..", "../etc/passwd", "a/b.txt", "a\\b.txt", STAGING_DIR] {
        assert!(!RemoteName::verify_safe(name), "{name:?} should be rejected");
    }
}

#[test]
fn staged_name_keeps_original_extension() {
    assert_eq!(RemoteName::staged("a.txt"), "a.txt.part");
}
