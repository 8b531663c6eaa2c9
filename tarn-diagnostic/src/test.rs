use crate::{
    ConcurrentDiagnostics, Diagnostic, DiagnosticCollector, Diagnostics, Location,
    LocalDiagnosticReporter, Range, RelatedInformation, Severity,
};
use std::sync::Arc;

#[test]
fn located_message_1() {
    assert_eq!(
        Diagnostic::report_located_message(
            5,
            3,
            "test/file",
            "abcdefg",
            Severity::Error,
            "some error",
        ),
        [
            "test/file:5:3: error: some error",
            "  |",
            "5 | abcdefg",
            "  |   ^",
        ]
        .join("\n")
    )
}

#[test]
fn located_message_2() {
    assert_eq!(
        Diagnostic::report_located_message(
            10,
            2,
            "test/file",
            "abcdefg",
            Severity::Warning,
            "some warning",
        ),
        [
            "test/file:10:2: warning: some warning",
            "   |",
            "10 | abcdefg",
            "   |  ^",
        ]
        .join("\n")
    )
}

#[test]
fn render_with_related_1() {
    let uri: Arc<str> = Arc::from("file:///Test.tarn");
    let source = "let x = 1\nlet x = 2";
    let diagnostic = Diagnostic::new(
        Location::new(uri.clone(), Range::on_line(1, 4, 5)),
        Severity::Error,
        "Duplicate definition of value 'x'",
        vec![RelatedInformation::new(
            Location::new(uri, Range::on_line(0, 4, 5)),
            "Original definition of value 'x'",
        )],
    );
    assert_eq!(
        diagnostic.render(source),
        [
            "file:///Test.tarn:2:5: error: Duplicate definition of value 'x'",
            "  |",
            "2 | let x = 2",
            "  |     ^",
            "file:///Test.tarn:1:5: info: Original definition of value 'x'",
            "  |",
            "1 | let x = 1",
            "  |     ^",
        ]
        .join("\n")
    )
}

#[test]
fn render_other_source_1() {
    let diagnostic = Diagnostic::new(
        Location::new(Arc::from("a"), Range::on_line(0, 0, 1)),
        Severity::Error,
        "boom",
        vec![RelatedInformation::new(
            Location::new(Arc::from("b"), Range::on_line(2, 1, 2)),
            "see here",
        )],
    );
    assert_eq!(
        diagnostic.render("x"),
        ["a:1:1: error: boom", "  |", "1 | x", "  | ^", "b:3:2: info: see here"].join("\n")
    )
}

#[test]
fn local_reporter_counts_1() {
    let mut diagnostics = Diagnostics::new();
    {
        let mut reporter = LocalDiagnosticReporter::new(Arc::from("uri"), &mut diagnostics);
        reporter.report_error(Range::EMPTY, String::from("first"), Vec::new());
        reporter.report_warning(Range::EMPTY, String::from("second"), Vec::new());
        reporter.report_hint(Range::EMPTY, String::from("third"), Vec::new());
    }
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(
        diagnostics
            .items()
            .iter()
            .map(|diagnostic| diagnostic.message.as_str())
            .collect::<Vec<_>>(),
        vec!["first", "second", "third"]
    );
    assert!(diagnostics
        .items()
        .iter()
        .all(|diagnostic| &*diagnostic.location.uri == "uri"));
}

#[test]
fn concurrent_keeps_unit_order_1() {
    let shared = ConcurrentDiagnostics::new();
    std::thread::scope(|scope| {
        for unit in 0..4 {
            let shared = &shared;
            scope.spawn(move || {
                let mut local = Diagnostics::new();
                for ix in 0..10 {
                    local.report_error(
                        Location::new(Arc::from(format!("unit{}", unit)), Range::EMPTY),
                        format!("{}", ix),
                        Vec::new(),
                    );
                }
                shared.append(local);
            });
        }
    });

    let items = shared.snapshot();
    assert_eq!(items.len(), 40);
    assert_eq!(shared.error_count(), 40);
    for unit in 0..4 {
        let uri = format!("unit{}", unit);
        let messages: Vec<&str> = items
            .iter()
            .filter(|diagnostic| *diagnostic.location.uri == *uri)
            .map(|diagnostic| diagnostic.message.as_str())
            .collect();
        assert_eq!(
            messages,
            (0..10).map(|ix| ix.to_string()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn concurrent_direct_report_1() {
    let shared = ConcurrentDiagnostics::new();
    let mut collector = &shared;
    collector.report_warning(
        Location::new(Arc::from("uri"), Range::EMPTY),
        String::from("careful"),
        Vec::new(),
    );
    assert_eq!(shared.warning_count(), 1);
    assert!(!shared.has_errors());
}
