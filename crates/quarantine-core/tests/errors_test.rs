//! Tests for the quarantine error handling system.

use std::collections::HashSet;
use std::path::PathBuf;

use quarantine_core::errors::*;

#[test]
fn test_all_errors_have_error_code() {
    let config = ConfigError::FileNotFound {
        path: "/tmp/quarantine.toml".into(),
    };
    assert_eq!(config.error_code(), "CONFIG_ERROR");

    let parse = ParseError::SyntaxError {
        path: PathBuf::from("tests/net/test_a.py"),
        line: 3,
        column: 7,
    };
    assert_eq!(parse.error_code(), "SYNTAX_ERROR");

    let grammar = ParseError::GrammarUnavailable {
        message: "version mismatch".into(),
    };
    assert_eq!(grammar.error_code(), "PARSE_ERROR");

    let scan = ScanError::TestsRootMissing {
        path: PathBuf::from("/repo/tests"),
    };
    assert_eq!(scan.error_code(), "SCAN_ERROR");

    let signal = SignalError::unavailable("history", "endpoint down");
    assert_eq!(signal.error_code(), "SIGNAL_UNAVAILABLE");

    let formatter = FormatterError::Failed {
        path: PathBuf::from("a.py"),
        status: "exit status: 2".into(),
        stderr: "boom".into(),
    };
    assert_eq!(formatter.error_code(), "FORMATTER_FAILED");
}

#[test]
fn test_mutation_error_codes_are_distinct() {
    let file = PathBuf::from("tests/net/test_a.py");
    let errors = vec![
        MutationError::InvalidTarget {
            target: "::".into(),
            message: "empty".into(),
        },
        MutationError::NotFound {
            file: file.clone(),
            function: "test_x".into(),
        },
        MutationError::Ambiguous {
            file: file.clone(),
            function: "test_x".into(),
            candidates: vec!["TestA::test_x".into(), "TestB::test_x".into()],
        },
        MutationError::AlreadyQuarantined {
            file: file.clone(),
            qualified_name: "net.test_a.test_x".into(),
        },
        MutationError::NoMarkerFound {
            file: file.clone(),
            qualified_name: "net.test_a.test_x".into(),
        },
        MutationError::InvalidTicket {
            ticket: "cnv-1".into(),
            pattern: "[A-Z][A-Z0-9_]*-[0-9]+".into(),
        },
        MutationError::EditConflict {
            file: file.clone(),
            offset: 10,
        },
        MutationError::VerificationFailed {
            file: file.clone(),
            qualified_name: "net.test_a.test_x".into(),
            expected: "quarantined".into(),
        },
        MutationError::Io {
            path: file.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        },
    ];
    let codes: HashSet<&str> = errors.iter().map(|e| e.error_code()).collect();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn test_from_conversions() {
    let parse = ParseError::NoTree {
        path: PathBuf::from("x.py"),
    };
    let scan: ScanError = parse.into();
    assert!(matches!(scan, ScanError::Parse(ParseError::NoTree { .. })));
    assert_eq!(scan.error_code(), "PARSE_ERROR");

    let parse = ParseError::SyntaxError {
        path: PathBuf::from("x.py"),
        line: 1,
        column: 1,
    };
    let mutation: MutationError = parse.into();
    assert_eq!(mutation.error_code(), "SYNTAX_ERROR");
}

#[test]
fn test_coded_string_format() {
    let err = MutationError::NotFound {
        file: PathBuf::from("tests/net/test_a.py"),
        function: "test_missing".into(),
    };
    assert_eq!(
        err.coded_string(),
        "[NOT_FOUND] Function 'test_missing' not found in tests/net/test_a.py"
    );
}

#[test]
fn test_ambiguous_lists_candidates() {
    let err = MutationError::Ambiguous {
        file: PathBuf::from("t.py"),
        function: "test_x".into(),
        candidates: vec!["TestA::test_x".into(), "TestB::test_x".into()],
    };
    let msg = err.to_string();
    assert!(msg.contains("TestA::test_x, TestB::test_x"));
}

#[test]
fn test_parse_error_with_path() {
    let err = ParseError::SyntaxError {
        path: PathBuf::new(),
        line: 4,
        column: 2,
    }
    .with_path("tests/storage/test_b.py");
    match err {
        ParseError::SyntaxError { path, line, column } => {
            assert_eq!(path, PathBuf::from("tests/storage/test_b.py"));
            assert_eq!((line, column), (4, 2));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_scan_file_error_captures_code_and_message() {
    let err = ScanError::MaxFileSizeExceeded {
        path: PathBuf::from("tests/big.py"),
        size: 10,
        max: 5,
    };
    let entry = ScanFileError::new("tests/big.py", &err);
    assert_eq!(entry.code, "SCAN_ERROR");
    assert!(entry.message.contains("10 bytes"));
    assert_eq!(entry.path, PathBuf::from("tests/big.py"));
}
