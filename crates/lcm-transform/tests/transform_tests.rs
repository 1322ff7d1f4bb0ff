use lcm_transform::{TransformError, Transformer};

#[test]
fn legacy_program_round_trips_to_modern_syntax() {
    let legacy = r#"def categorize_by_age(age):
    if age >= 0 and age <= 9:
        return "Child"
    else:
        return "Invalid age: %s" % age

print categorize_by_age(5)
"#;

    let result = Transformer::new().transform(legacy).unwrap();
    assert!(result.rewritten_text.contains("print(categorize_by_age(5))"));
    assert!(!result.rewritten_text.contains("print categorize_by_age"));
}

#[test]
fn mixed_legacy_constructs_rewrite_together() {
    let legacy = r#"import sys

def main():
    try:
        n = int(raw_input())
    except ValueError, e:
        print >>sys.stderr, "bad input", e
        return
    for i in xrange(n):
        if i <> 3:
            print i,

main()
"#;

    let result = Transformer::new().transform(legacy).unwrap();
    let modern = &result.rewritten_text;
    assert!(modern.contains("n = int(input())"));
    assert!(modern.contains("except ValueError as e:"));
    assert!(modern.contains("print(\"bad input\", e, file=sys.stderr)"));
    assert!(modern.contains("for i in range(n):"));
    assert!(modern.contains("if i != 3:"));
    assert!(modern.contains("print(i, end=\" \")"));
}

#[test]
fn modern_input_passes_through_unchanged() {
    let modern = "def add(a: int, b: int) -> int:\n    return a + b\n";
    let result = Transformer::new().transform(modern).unwrap();
    assert_eq!(result.rewritten_text, modern);
}

#[test]
fn unparsable_input_yields_no_partial_output() {
    let err = Transformer::new()
        .transform("class Broken(\n    print \"half\"")
        .unwrap_err();
    assert!(matches!(err, TransformError::Parse(_)));
}

#[test]
fn concurrent_transforms_do_not_collide() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let src = format!("print {i}\n");
                Transformer::new().transform(&src).unwrap().rewritten_text
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("print({i})\n"));
    }
}
