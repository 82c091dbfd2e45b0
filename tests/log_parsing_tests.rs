//! Change-set derivation from realistic `svn log --verbose` output.

use rstest::rstest;
use svn_ftp_sync::change::{change_set_from_log, parse_log, ChangeKind, RepoPath};
use svn_ftp_sync::report::ChangeReport;
use svn_ftp_sync::SyncError;

const RANGE_LOG: &str = "\
------------------------------------------------------------------------
r193 | alice | 2024-03-01 10:12:44 +0100 (Fri, 01 Mar 2024) | 2 lines
Changed paths:
   A /trunk/www/News.php
   A /trunk/www/draft.php
   M /trunk/www/index.php
   A /trunk/www/img
   A /trunk/www/img/banner.jpg

New news page
with banner
------------------------------------------------------------------------
r194 | bob | 2024-03-02 09:01:10 +0100 (Sat, 02 Mar 2024) | 1 line
Changed paths:
   M /trunk/www/News.php
   D /trunk/www/draft.php
   M /trunk/www/about.php
   A /trunk/www/contact.php (from /trunk/www/about.php:193)

Tidy up
------------------------------------------------------------------------
r195 | alice | 2024-03-03 17:45:00 +0100 (Sun, 03 Mar 2024) | 1 line
Changed paths:
   D /trunk/www/about.php
   M /trunk/www/index.php
   D /trunk/www/legacy

Remove about page
------------------------------------------------------------------------
";

fn paths(changes: Vec<&svn_ftp_sync::change::PathChange>) -> Vec<(String, u64)> {
    changes
        .into_iter()
        .map(|c| (c.path().to_string(), c.revision()))
        .collect()
}

#[test]
fn test_range_log_collapses_to_net_effect() {
    let root = RepoPath::new("trunk/www").unwrap();
    let set = change_set_from_log(RANGE_LOG, Some(&root)).unwrap();

    assert_eq!(
        paths(set.added_paths()),
        vec![
            ("contact.php".to_string(), 194),
            ("img".to_string(), 193),
            ("img/banner.jpg".to_string(), 193),
            ("News.php".to_string(), 193),
        ]
    );
    assert_eq!(paths(set.modified_paths()), vec![("index.php".to_string(), 195)]);
    assert_eq!(
        paths(set.deleted_paths()),
        vec![("about.php".to_string(), 195), ("legacy".to_string(), 195)]
    );
    assert!(set.get(&RepoPath::new("draft.php").unwrap()).is_none());
}

#[test]
fn test_upload_set_merges_added_and_modified_in_order() {
    let set = change_set_from_log(RANGE_LOG, None).unwrap();
    let uploads: Vec<String> = set.upload_set().iter().map(|c| c.path().to_string()).collect();

    assert_eq!(
        uploads,
        vec![
            "trunk/www/contact.php",
            "trunk/www/img",
            "trunk/www/img/banner.jpg",
            "trunk/www/index.php",
            "trunk/www/News.php",
        ]
    );
}

#[test]
fn test_report_matches_change_set() {
    let set = change_set_from_log(RANGE_LOG, None).unwrap();
    let report = ChangeReport::from_change_set("Site", "193-195", &set);

    assert_eq!(report.added.len(), 4);
    assert_eq!(report.modified.len(), 1);
    assert_eq!(report.deleted.len(), 2);

    let markdown = report.to_markdown();
    assert!(markdown.contains("- `trunk/www/index.php` (r195)"));
}

#[rstest]
#[case::add_then_delete(&["A", "D"], None)]
#[case::add_then_modify(&["A", "M"], Some(ChangeKind::Added))]
#[case::modify_then_delete(&["M", "D"], Some(ChangeKind::Deleted))]
#[case::delete_then_add(&["D", "A"], Some(ChangeKind::Added))]
#[case::modify_twice(&["M", "M"], Some(ChangeKind::Modified))]
#[case::add_modify_delete(&["A", "M", "D"], None)]
#[case::delete_then_readd_then_modify(&["D", "A", "M"], Some(ChangeKind::Added))]
fn test_history_of_one_path(#[case] markers: &[&str], #[case] expected: Option<ChangeKind>) {
    let log: String = markers
        .iter()
        .enumerate()
        .map(|(i, marker)| format!("r{} | dev | date | 1 line\n   {} /x.txt\n", i + 1, marker))
        .collect();

    let set = change_set_from_log(&log, None).unwrap();
    let entry = set.get(&RepoPath::new("x.txt").unwrap());
    assert_eq!(entry.map(|c| c.kind()), expected);
}

#[test]
fn test_malformed_revision_aborts_parsing() {
    let log = "r1 | dev | date | 1 line\n   A /a.txt\nr184467440737095516160 | dev | date | 1 line\n";
    match parse_log(log) {
        Err(SyncError::Parsing { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a parsing error, got {:?}", other),
    }
}

#[test]
fn test_header_only_log_is_empty() {
    let set = change_set_from_log("r7 | dev | date | 1 line\n\nprops only\n", None).unwrap();
    assert!(set.is_empty());
    assert!(set.added_paths().is_empty());
    assert!(set.modified_paths().is_empty());
    assert!(set.deleted_paths().is_empty());
}
