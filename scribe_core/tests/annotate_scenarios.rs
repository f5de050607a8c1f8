use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scribe_core::oracle::OracleResult;
use scribe_core::plugins::{default_registry, PluginService};
use scribe_core::{
    Annotator, CommentCache, CommentGenerator, CommentOracle, CommentStyle, Error,
    FormattedComment, InsertionEngine, InsertionError, OracleRequest, OracleResponse, Result,
    SourceBuffer,
};

#[test]
fn python_google_docstring_goes_above_definition() -> Result<()> {
    let (annotator, _) = annotator_with_text("Does nothing.");
    let annotation = annotator.annotate_source_with_style(
        "python",
        "def foo():\n    pass\n",
        CommentStyle::Google,
    )?;

    assert_eq!(annotation.language, "python");
    assert_eq!(annotation.inserted, 1);
    assert_eq!(
        annotation.text,
        "\"\"\"\n    Does nothing.\n\"\"\"\ndef foo():\n    pass\n"
    );
    Ok(())
}

#[test]
fn c_doxygen_block_goes_above_line_ten() -> Result<()> {
    let source = "#include <stdio.h>\n\n#define ONE 1\n\n\n\n\n\n\nint add(int a, int b) {\n    return a + b;\n}\n";
    let (annotator, _) = annotator_with_text("Adds two integers.");
    let annotation = annotator.annotate_source_with_style("c", source, CommentStyle::Doxygen)?;

    let lines: Vec<&str> = annotation.text.split('\n').collect();
    assert_eq!(&lines[..9], &source.split('\n').collect::<Vec<_>>()[..9]);
    assert_eq!(
        &lines[9..13],
        &["/**", " * Adds two integers.", " */", "int add(int a, int b) {"]
    );
    Ok(())
}

#[test]
fn unknown_extension_is_unsupported() {
    let (annotator, oracle) = annotator_with_text("unused");
    let err = annotator
        .annotate_source(".rb", "def greet\nend\n")
        .expect_err("ruby has no plugin");
    assert!(matches!(err, Error::UnsupportedLanguage { language } if language == ".rb"));
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn two_comments_on_one_line_leave_buffer_untouched() {
    let original = SourceBuffer::from_text("a\nb\nc\nd\ne\nf\n");
    let snapshot = original.clone();
    let comments = vec![
        FormattedComment::new(5, vec!["# first".into()]),
        FormattedComment::new(5, vec!["# second".into()]),
    ];

    let result = InsertionEngine::new().insert(&original, &comments);
    assert_eq!(result, Err(InsertionError::AmbiguousLine { line: 5 }));
    assert_eq!(original, snapshot);
}

#[test]
fn declarations_sharing_a_line_abort_before_generation() {
    let (annotator, oracle) = annotator_with_text("Returns a number.");
    let err = annotator
        .annotate_source("javascript", "const f = () => 1, g = () => 2;\n")
        .expect_err("both declarators start on line 1");

    assert!(matches!(
        err,
        Error::Insertion {
            source: InsertionError::AmbiguousLine { line: 1 },
            ..
        }
    ));
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn insertion_preserves_original_line_order() {
    let original_lines: Vec<String> = (1..=40).map(|i| format!("    line {i}")).collect();
    let original = SourceBuffer::from_text(&original_lines.join("\n"));
    let targets = [1u32, 2, 7, 8, 9, 21, 33, 40];
    let comments: Vec<FormattedComment> = targets
        .iter()
        .rev()
        .map(|line| {
            FormattedComment::new(
                *line,
                vec![format!("// about {line}"), format!("//   more {line}")],
            )
        })
        .collect();

    let updated = InsertionEngine::new()
        .insert(&original, &comments)
        .expect("insert");
    assert_eq!(updated.len(), original.len() + targets.len() * 2);

    let mut cursor = 0;
    for (index, line) in original_lines.iter().enumerate() {
        let number = u32::try_from(index + 1).expect("line number");
        if targets.contains(&number) {
            assert_eq!(updated.lines()[cursor], format!("    // about {number}"));
            assert_eq!(updated.lines()[cursor + 1], format!("    //   more {number}"));
            cursor += 2;
        }
        assert_eq!(&updated.lines()[cursor], line);
        cursor += 1;
    }
    assert_eq!(cursor, updated.len());
}

#[test]
fn nested_methods_follow_their_indentation() -> Result<()> {
    let source = "class Greeter:\n    def hi(self):\n        return 'hi'\n";
    let (annotator, oracle) = annotator_with_text("Says hello.");
    let annotation = annotator.annotate_source("python", source)?;

    assert_eq!(oracle.calls(), 2);
    assert_eq!(annotation.inserted, 2);
    assert_eq!(
        annotation.text,
        concat!(
            "\"\"\"\n",
            "    Says hello.\n",
            "\"\"\"\n",
            "class Greeter:\n",
            "    \"\"\"\n",
            "        Says hello.\n",
            "    \"\"\"\n",
            "    def hi(self):\n",
            "        return 'hi'\n",
        )
    );
    Ok(())
}

#[test]
fn crlf_sources_keep_their_line_endings() -> Result<()> {
    let (annotator, _) = annotator_with_text("Entry point.");
    let annotation =
        annotator.annotate_source_with_style("java", "class Main {\r\n}\r\n", CommentStyle::Line)?;
    assert_eq!(annotation.text, "// Entry point.\r\nclass Main {\r\n}\r\n");
    Ok(())
}

#[test]
fn malformed_source_reports_location() {
    let (annotator, oracle) = annotator_with_text("unused");
    let err = annotator
        .annotate_source("python", "def ok():\n    pass\n\ndef broken(:\n    pass\n")
        .expect_err("parse should fail");
    match err {
        Error::Parse { source, .. } => assert_eq!(source.line, 4),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(oracle.calls(), 0);
}

struct FixedOracle {
    text: String,
    calls: AtomicUsize,
}

impl FixedOracle {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommentOracle for FixedOracle {
    fn id(&self) -> &'static str {
        "fixed"
    }

    fn generate(&self, _request: &OracleRequest) -> OracleResult<OracleResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OracleResponse::new(self.text.clone()))
    }
}

fn annotator_with_text(text: &str) -> (Annotator, Arc<FixedOracle>) {
    let oracle = Arc::new(FixedOracle {
        text: text.to_owned(),
        calls: AtomicUsize::new(0),
    });
    let generator = CommentGenerator::new(oracle.clone(), CommentCache::in_memory());
    let annotator = Annotator::new(PluginService::new(default_registry()), generator);
    (annotator, oracle)
}
