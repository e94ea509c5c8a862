//! Integration tests covering the concrete translation scenarios: each
//! feeds a small `svnadmin dump` stream through [`DumpTranslator`] and
//! checks the resulting `git fast-import` stream and stats.

use svndump_core::{DumpTranslator, ParseError};

fn translate(body: &str) -> (String, svndump_core::TranslationStats) {
    let mut translator = DumpTranslator::new(Vec::new(), "master");
    let stats = translator
        .read(body.as_bytes(), "file:///repo")
        .expect("dump should translate cleanly");
    (String::from_utf8(translator.into_inner()).unwrap(), stats)
}

fn translate_err(body: &str) -> ParseError {
    let mut translator = DumpTranslator::new(Vec::new(), "master");
    translator
        .read(body.as_bytes(), "file:///repo")
        .expect_err("dump should be rejected")
}

const DUMP_HEADER: &str = "SVN-fs-dump-format-version: 3\nUUID: abc\n\n";

fn rev0() -> String {
    format!(
        "{DUMP_HEADER}Revision-number: 0\nProp-content-length: 10\nContent-length: 10\n\nPROPS-END\n\n"
    )
}

fn rev_props(log: &str, author: &str) -> String {
    let body = format!(
        "K 10\nsvn:author\nV {}\n{author}\nK 7\nsvn:log\nV {}\n{log}\nPROPS-END\n",
        author.len(),
        log.len(),
    );
    format!("Prop-content-length: {}\nContent-length: {}\n\n{body}\n", body.len(), body.len())
}

#[test]
fn hello_world_add() {
    let body = format!(
        "{}Revision-number: 1\n{}Node-path: README\nNode-kind: file\nNode-action: add\nText-content-length: 5\nContent-length: 5\n\nhello",
        rev0(),
        rev_props("init", "a"),
    );
    let (out, stats) = translate(&body);
    assert!(out.contains("blob\nmark :1\ndata 5\nhello"));
    assert!(out.contains("commit refs/heads/master"));
    assert!(out.contains("author a"));
    assert_eq!(stats.revisions, 1);
    assert_eq!(stats.blobs, 1);
}

#[test]
fn executable_property() {
    let props = "K 14\nsvn:executable\nV 1\n*\nPROPS-END\n";
    let body = format!(
        "{}Revision-number: 1\n{}Node-path: run.sh\nNode-kind: file\nNode-action: add\nProp-content-length: {}\nText-content-length: 5\nContent-length: {}\n\n{props}hello",
        rev0(),
        rev_props("init", "a"),
        props.len(),
        props.len() + 5,
    );
    let (out, _stats) = translate(&body);
    assert!(out.contains("M 100755 :1 run.sh"));
}

#[test]
fn copy_and_change() {
    let body = format!(
        "{}Revision-number: 1\n{}Node-path: A\nNode-kind: file\nNode-action: add\nText-content-length: 1\nContent-length: 1\n\nx\
         \nRevision-number: 2\n{}Node-path: B\nNode-kind: file\nNode-action: add\nNode-copyfrom-path: A\nNode-copyfrom-rev: 1\nContent-length: 0\n\n",
        rev0(),
        rev_props("add A", "a"),
        rev_props("copy A to B", "a"),
    );
    let (out, stats) = translate(&body);
    assert_eq!(stats.blobs, 1, "the copy must not allocate a new blob");
    assert!(out.contains("M 100644 :1 B"));
}

#[test]
fn delete_then_replace() {
    let body = format!(
        "{}Revision-number: 1\n{}Node-path: F\nNode-kind: file\nNode-action: add\nText-content-length: 1\nContent-length: 1\n\nx\
         \nRevision-number: 2\n{}Node-path: F\nNode-kind: file\nNode-action: replace\nText-content-length: 1\nContent-length: 1\n\ny",
        rev0(),
        rev_props("add F", "a"),
        rev_props("replace F", "a"),
    );
    let (out, _stats) = translate(&body);
    assert!(out.contains("blob\nmark :2\ndata 1\ny"));
}

#[test]
fn unsupported_delta_is_fatal() {
    let body = format!(
        "{}Revision-number: 1\n{}Node-path: F\nNode-kind: file\nNode-action: add\nText-delta: true\nText-content-length: 1\nContent-length: 1\n\nx",
        rev0(),
        rev_props("init", "a"),
    );
    let err = translate_err(&body);
    assert!(matches!(err, ParseError::TextDelta { .. }));
}

#[test]
fn skipped_extraneous_body_does_not_corrupt_state() {
    let body = format!(
        "SVN-fs-dump-format-version: 3\nContent-length: 7\n\nabcdefg\nUUID: abc\n\n{}Revision-number: 1\n{}Node-path: F\nNode-kind: file\nNode-action: add\nText-content-length: 1\nContent-length: 1\n\nz",
        rev0(),
        rev_props("init", "a"),
    );
    let (out, stats) = translate(&body);
    assert_eq!(stats.revisions, 1);
    assert!(out.contains("blob\nmark :1\ndata 1\nz"));
}

#[test]
fn reads_a_dump_file_from_disk() {
    use std::io::Write as _;

    let body = format!(
        "{}Revision-number: 1\n{}Node-path: README\nNode-kind: file\nNode-action: add\nText-content-length: 5\nContent-length: 5\n\nhello",
        rev0(),
        rev_props("init", "a"),
    );
    let dir = tempfile::tempdir().unwrap();
    let dump_path = dir.path().join("repo.dump");
    std::fs::File::create(&dump_path)
        .unwrap()
        .write_all(body.as_bytes())
        .unwrap();

    let mut translator = DumpTranslator::new(Vec::new(), "master");
    let file = std::fs::File::open(&dump_path).unwrap();
    let stats = translator.read(file, "file:///repo").unwrap();
    assert_eq!(stats.revisions, 1);
}
