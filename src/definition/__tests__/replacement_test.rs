use crate::definition::{
    BodyRequirement, Comment, CreateInfo, OutputBody, ParameterType, ParametersType,
    ReplacementPiece, RuntimeDefinedReplacement, TemplateHole, UnicodeCodepoint,
};
use crate::{
    CommandsExecutor, ExecuteError, IEncoding, OutputBuffer, Tokenizer, TreeParser, Utf8,
};
use std::cell::RefCell;
use std::rc::Rc;

fn create_info(
    name: &str,
    before_body: &str,
    after_body: &str,
    parameters: ParametersType,
    body: BodyRequirement,
) -> CreateInfo<Utf8> {
    CreateInfo {
        name: name.to_string(),
        before_body: Utf8::encode_string(before_body),
        after_body: Utf8::encode_string(after_body),
        parameters,
        body,
    }
}

fn executor_with(
    output: &OutputBuffer<Utf8>,
    replacements: Vec<CreateInfo<Utf8>>,
) -> Rc<CommandsExecutor<Utf8>> {
    let mut executor = CommandsExecutor::<Utf8>::new();
    executor.add_command(Rc::new(OutputBody::<Utf8>::root(Some(output.clone()))));
    executor.add_command(Rc::new(OutputBody::<Utf8>::named(Some(output.clone()))));
    executor.add_command(Rc::new(Comment::new()));
    executor.add_command(Rc::new(UnicodeCodepoint::<Utf8>::new(Some(output.clone())).unwrap()));

    let mut pending = Vec::new();
    for info in replacements {
        let definition = Rc::new(RuntimeDefinedReplacement::new(info).unwrap());
        executor.add_command(definition.clone());
        pending.push(definition);
    }
    let executor = Rc::new(executor);
    for definition in pending {
        definition.set_executor(&executor).unwrap();
    }
    executor
}

fn execute(source: &str, executor: &CommandsExecutor<Utf8>) -> Result<(), ExecuteError> {
    let tokenizer = Tokenizer::from(source);
    let mut parser = TreeParser::new();
    parser.parse_all(&tokenizer).unwrap();
    let tree = parser.finish().unwrap();
    executor.execute(&tree)
}

#[test]
fn template_holes_are_scanned_with_their_spans() {
    let piece =
        ReplacementPiece::<Utf8>::new(Utf8::encode_string("a\\#0b\\#10c")).unwrap();
    assert_eq!(
        piece.holes(),
        [
            TemplateHole {
                parameter_index: 0,
                index_begin: 1,
                index_end: 4,
            },
            TemplateHole {
                parameter_index: 10,
                index_begin: 5,
                index_end: 9,
            },
        ]
    );
    assert_eq!(piece.required_parameter_count(), 11);
}

#[test]
fn templates_without_holes_require_no_parameters() {
    let piece = ReplacementPiece::<Utf8>::new(Utf8::encode_string("plain \\x text")).unwrap();
    assert!(piece.holes().is_empty());
    assert_eq!(piece.required_parameter_count(), 0);
}

#[test]
fn hole_without_digits_is_a_template_fault() {
    let error = ReplacementPiece::<Utf8>::new(Utf8::encode_string("bad \\#x")).unwrap_err();
    assert!(error.message.contains("after \"\\#\""), "{}", error);
    assert_eq!(error.position.offset, 4);
}

#[test]
fn fixed_wrapping_replacement_expands_around_its_body() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "bold",
            "<b>",
            "</b>",
            ParametersType::Absent,
            BodyRequirement::Required,
        )],
    );

    execute("\\bold{hi}", &executor).unwrap();

    assert_eq!(Utf8::decode_string(&output.borrow()), "<b>hi</b>");
}

#[test]
fn parameters_substitute_into_both_templates() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "wrap",
            "[\\#0:",
            ":\\#0]",
            ParametersType::Exact(vec![ParameterType::identifier()]),
            BodyRequirement::Required,
        )],
    );

    execute("\\wrap(tag){x}", &executor).unwrap();

    assert_eq!(Utf8::decode_string(&output.borrow()), "[tag:x:tag]");
}

#[test]
fn empty_templates_expand_to_the_body_alone() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "m",
            "",
            "",
            ParametersType::Absent,
            BodyRequirement::Optional,
        )],
    );
    execute("\\m{X}", &executor).unwrap();
    let expanded = Utf8::decode_string(&output.borrow());

    let plain_output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let plain_executor = executor_with(&plain_output, Vec::new());
    execute("X", &plain_executor).unwrap();

    assert_eq!(expanded, Utf8::decode_string(&plain_output.borrow()));
    assert_eq!(expanded, "X");
}

#[test]
fn templates_may_leave_a_body_open_for_the_splice() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "boxed",
            "\\output_body{(",
            ")}",
            ParametersType::Absent,
            BodyRequirement::Required,
        )],
    );

    execute("\\boxed{y}", &executor).unwrap();

    assert_eq!(Utf8::decode_string(&output.borrow()), "(y)");
}

#[test]
fn spliced_child_commands_execute_inside_the_expansion() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "bold",
            "<b>",
            "</b>",
            ParametersType::Absent,
            BodyRequirement::Required,
        )],
    );

    execute("\\bold{a\\unicode_codepoint(u21);b}", &executor).unwrap();

    assert_eq!(Utf8::decode_string(&output.borrow()), "<b>a!b</b>");
}

#[test]
fn replacements_may_invoke_other_replacements() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![
            create_info(
                "inner",
                "(",
                ")",
                ParametersType::Absent,
                BodyRequirement::Required,
            ),
            create_info(
                "outer",
                "\\inner{<",
                ">}",
                ParametersType::Absent,
                BodyRequirement::Required,
            ),
        ],
    );

    execute("\\outer{mid}", &executor).unwrap();

    assert_eq!(Utf8::decode_string(&output.borrow()), "(<mid>)");
}

#[test]
fn absent_parameters_reject_templates_with_holes() {
    let error = RuntimeDefinedReplacement::new(create_info(
        "m",
        "\\#0",
        "",
        ParametersType::Absent,
        BodyRequirement::Optional,
    ))
    .unwrap_err();
    let rendered = format!("{}", error);
    assert!(rendered.contains("declares 0 parameters"), "{}", rendered);
}

#[test]
fn exact_parameters_must_cover_every_hole() {
    let error = RuntimeDefinedReplacement::new(create_info(
        "m",
        "",
        "\\#1",
        ParametersType::Exact(vec![ParameterType::identifier()]),
        BodyRequirement::Optional,
    ))
    .unwrap_err();
    let rendered = format!("{}", error);
    assert!(rendered.contains("references parameter #1"), "{}", rendered);
}

#[test]
fn malformed_templates_fail_at_construction() {
    let error = RuntimeDefinedReplacement::new(create_info(
        "m",
        "\\#",
        "",
        ParametersType::Any,
        BodyRequirement::Optional,
    ))
    .unwrap_err();
    let rendered = format!("{}", error);
    assert!(rendered.contains("before body template"), "{}", rendered);
}

#[test]
fn call_sites_must_supply_every_referenced_parameter() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "m",
            "\\#1",
            "",
            ParametersType::Any,
            BodyRequirement::Optional,
        )],
    );

    let error = execute("\\m(only){}", &executor).unwrap_err();
    match error {
        ExecuteError::Validation { command, message, .. } => {
            assert_eq!(command, "m");
            assert!(message.contains("at least 2"), "{}", message);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn required_body_is_enforced_before_expansion() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "bold",
            "<b>",
            "</b>",
            ParametersType::Absent,
            BodyRequirement::Required,
        )],
    );

    let error = execute("\\bold;", &executor).unwrap_err();
    match error {
        ExecuteError::Validation { message, .. } => {
            assert!(message.contains("expects a body"), "{}", message)
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(output.borrow().is_empty());
}

#[test]
fn nested_faults_are_wrapped_with_the_outer_command() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "m",
            "\\missing;",
            "",
            ParametersType::Any,
            BodyRequirement::Optional,
        )],
    );

    let error = execute("top \\m{}", &executor).unwrap_err();
    match error {
        ExecuteError::Expansion {
            command,
            position,
            source,
        } => {
            assert_eq!(command, "m");
            assert_eq!(position.offset, 5);
            assert!(matches!(
                *source,
                ExecuteError::CommandNotFound { ref name, .. } if name == "missing"
            ));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn unbalanced_templates_are_wrapped_parse_faults() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let executor = executor_with(
        &output,
        vec![create_info(
            "m",
            "\\output_body{",
            "",
            ParametersType::Any,
            BodyRequirement::Optional,
        )],
    );

    let error = execute("\\m{x}", &executor).unwrap_err();
    match error {
        ExecuteError::Expansion { source, .. } => {
            assert!(matches!(*source, ExecuteError::Parse(_)), "source: {}", source)
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn executing_without_a_back_reference_is_a_runtime_fault() {
    let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
    let definition = Rc::new(
        RuntimeDefinedReplacement::new(create_info(
            "m",
            "",
            "",
            ParametersType::Any,
            BodyRequirement::Optional,
        ))
        .unwrap(),
    );
    let mut executor = CommandsExecutor::<Utf8>::new();
    executor.add_command(Rc::new(OutputBody::<Utf8>::root(Some(output.clone()))));
    executor.add_command(definition);

    let error = execute("\\m{x}", &executor).unwrap_err();
    match error {
        ExecuteError::Runtime { message, .. } => {
            assert!(message.contains("executor must be assigned"), "{}", message)
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn the_back_reference_is_set_at_most_once() {
    let definition = RuntimeDefinedReplacement::new(create_info(
        "m",
        "",
        "",
        ParametersType::Any,
        BodyRequirement::Optional,
    ))
    .unwrap();
    let executor = Rc::new(CommandsExecutor::<Utf8>::new());
    assert!(definition.set_executor(&executor).is_ok());
    assert!(definition.set_executor(&executor).is_err());
}
