use std::sync::Arc;

use augur::bytecode::{partition, Instruction, InstructionStream, LabelId, Opcode};
use augur::config::Config;
use augur::core::{MethodLocation, Result};
use augur::filters::{default_registry, ClassStreams, FilterPipeline};
use augur::mutation::{
    DetectionStatus, Mutant, Mutater, MutationAnalysis, MutationDetails, MutationIdentifier,
    MutationResult,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn count_loc() -> MethodLocation {
    MethodLocation::new("com/example/Widget", "count", "()V")
}

fn plain_loc() -> MethodLocation {
    MethodLocation::new("com/example/Widget", "plain", "()I")
}

fn drain_loc() -> MethodLocation {
    MethodLocation::new("com/example/Widget", "drain", "()V")
}

/// `for (i = 0; i != 10; i++) { this.target(); }` in the javac layout.
fn for_loop_method() -> InstructionStream {
    InstructionStream::new(
        count_loc(),
        vec![
            Instruction::line(3),                            // 0
            Instruction::constant(0),                        // 1
            Instruction::var(Opcode::IStore, 1),             // 2
            Instruction::jump(Opcode::Goto, LabelId(1)),     // 3
            Instruction::label(LabelId(0)),                  // 4
            Instruction::line(4),                            // 5
            Instruction::var(Opcode::ALoad, 0),              // 6
            Instruction::invoke(Opcode::InvokeVirtual, "com/example/Widget", "target", "()V"), // 7
            Instruction::line(3),                            // 8
            Instruction::iinc(1, 1),                         // 9
            Instruction::label(LabelId(1)),                  // 10
            Instruction::var(Opcode::ILoad, 1),              // 11
            Instruction::constant(10),                       // 12
            Instruction::jump(Opcode::IfIcmpNe, LabelId(0)), // 13
            Instruction::line(6),                            // 14
            Instruction::simple(Opcode::Return),             // 15
        ],
        Vec::new(),
    )
    .unwrap()
}

/// `return this.x + 1;` -- no loops anywhere.
fn plain_method() -> InstructionStream {
    InstructionStream::new(
        plain_loc(),
        vec![
            Instruction::var(Opcode::ALoad, 0),                          // 0
            Instruction::field(Opcode::GetField, "com/example/Widget", "x", "I"), // 1
            Instruction::constant(1),                                    // 2
            Instruction::simple(Opcode::IAdd),                           // 3
            Instruction::simple(Opcode::IReturn),                        // 4
        ],
        Vec::new(),
    )
    .unwrap()
}

/// `while (it.hasNext()) { it.next(); this.log(); }`
fn iterator_loop_method() -> InstructionStream {
    InstructionStream::new(
        drain_loc(),
        vec![
            Instruction::label(LabelId(0)),     // 0
            Instruction::var(Opcode::ALoad, 2), // 1
            Instruction::invoke(Opcode::InvokeInterface, "java/util/Iterator", "hasNext", "()Z"), // 2
            Instruction::jump(Opcode::IfEq, LabelId(1)), // 3
            Instruction::var(Opcode::ALoad, 2), // 4
            Instruction::invoke(
                Opcode::InvokeInterface,
                "java/util/Iterator",
                "next",
                "()Ljava/lang/Object;",
            ), // 5
            Instruction::simple(Opcode::Pop),   // 6
            Instruction::var(Opcode::ALoad, 0), // 7
            Instruction::invoke(Opcode::InvokeVirtual, "com/example/Widget", "log", "()V"), // 8
            Instruction::jump(Opcode::Goto, LabelId(0)), // 9
            Instruction::label(LabelId(1)),     // 10
            Instruction::simple(Opcode::Return), // 11
        ],
        Vec::new(),
    )
    .unwrap()
}

/// `i = 0; while (i < 10) { this.spin(); }` -- the counter is never written.
fn already_infinite_method() -> InstructionStream {
    InstructionStream::new(
        count_loc(),
        vec![
            Instruction::constant(0),                        // 0
            Instruction::var(Opcode::IStore, 1),             // 1
            Instruction::label(LabelId(0)),                  // 2
            Instruction::var(Opcode::ILoad, 1),              // 3
            Instruction::constant(10),                       // 4
            Instruction::jump(Opcode::IfIcmpGe, LabelId(1)), // 5
            Instruction::var(Opcode::ALoad, 0),              // 6
            Instruction::invoke(Opcode::InvokeVirtual, "com/example/Widget", "spin", "()V"), // 7
            Instruction::jump(Opcode::Goto, LabelId(0)),     // 8
            Instruction::label(LabelId(1)),                  // 9
            Instruction::simple(Opcode::Return),             // 10
        ],
        Vec::new(),
    )
    .unwrap()
}

fn candidate(location: MethodLocation, index: usize, mutator: &str) -> MutationDetails {
    MutationDetails::new(
        MutationIdentifier::new(location, index, mutator),
        "Widget.java",
        format!("{mutator} at instruction {index}"),
        1,
        Vec::new(),
    )
}

/// Mutater that replaces the mutated instruction with a nop, the simplest
/// behavior-removing alteration.
struct NopMutater {
    class: Arc<ClassStreams>,
}

impl Mutater for NopMutater {
    fn mutate(&self, id: &MutationIdentifier) -> Result<Mutant> {
        let stream = self
            .class
            .method(id.location())
            .expect("mutater asked about a method outside the class");
        let mut instructions = stream.instructions().to_vec();
        instructions[id.first_index()] = Instruction::simple(Opcode::Nop);
        let mutated =
            InstructionStream::new(stream.location().clone(), instructions, Vec::new())?;
        let details = MutationDetails::new(id.clone(), "Widget.java", "nopped", 1, Vec::new());
        Ok(Mutant::new(details, mutated))
    }
}

fn run_pipeline(
    class: Arc<ClassStreams>,
    candidates: Vec<MutationDetails>,
) -> Vec<MutationDetails> {
    let config = Config::default();
    let mut pipeline = FilterPipeline::from_config(&config, &default_registry()).unwrap();
    let mutater = NopMutater {
        class: class.clone(),
    };
    pipeline.run(&class, candidates, &mutater).unwrap()
}

// ---------------------------------------------------------------------------
// Block partitioning
// ---------------------------------------------------------------------------

#[test]
fn test_for_loop_blocks_do_not_overlap() {
    let blocks = partition(&for_loop_method());

    let bounds: Vec<(usize, usize)> = blocks.iter().map(|b| (b.first(), b.last())).collect();
    assert_eq!(bounds, vec![(0, 3), (4, 9), (10, 13), (14, 15)]);

    let mut covered = Vec::new();
    for block in &blocks {
        covered.extend(block.first()..=block.last());
    }
    assert_eq!(covered, (0..16).collect::<Vec<_>>());
}

#[test]
fn test_for_loop_blocks_start_at_jump_targets() {
    let stream = for_loop_method();
    let blocks = partition(&stream);

    // L0 (body) and L1 (guard) each start a block.
    assert!(blocks.iter().any(|b| b.first() == stream.resolve(LabelId(0))));
    assert!(blocks.iter().any(|b| b.first() == stream.resolve(LabelId(1))));
}

#[test]
fn test_for_loop_block_lines() {
    let blocks = partition(&for_loop_method());

    // The body block carries both the body line and the increment's line.
    let body = blocks.iter().find(|b| b.first() == 4).unwrap();
    assert!(body.lines().contains(&4));
    assert!(body.lines().contains(&3));
}

// ---------------------------------------------------------------------------
// Scenario 1: a single for loop
// ---------------------------------------------------------------------------

#[test]
fn test_counter_increment_candidate_is_removed_others_kept() {
    let class = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![for_loop_method()],
    ));
    let candidates = vec![
        candidate(count_loc(), 7, "void-call"),
        candidate(count_loc(), 9, "remove-increment"),
        candidate(count_loc(), 12, "inline-constant"),
    ];

    let survivors = run_pipeline(class, candidates);

    let indexes: Vec<usize> = survivors.iter().map(|c| c.id().first_index()).collect();
    assert_eq!(indexes, vec![7, 12]);
}

// ---------------------------------------------------------------------------
// Scenario 2: no loops at all
// ---------------------------------------------------------------------------

#[test]
fn test_loop_free_method_keeps_every_candidate() {
    let class = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![plain_method()],
    ));
    let candidates = vec![
        candidate(plain_loc(), 1, "field-access"),
        candidate(plain_loc(), 2, "inline-constant"),
        candidate(plain_loc(), 3, "math"),
    ];

    let survivors = run_pipeline(class, candidates.clone());
    assert_eq!(survivors, candidates);
}

// ---------------------------------------------------------------------------
// Scenario 3: pre-existing infinite loop
// ---------------------------------------------------------------------------

#[test]
fn test_already_infinite_loop_gives_up_without_filtering() {
    let class = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![already_infinite_method()],
    ));
    let candidates = vec![
        candidate(count_loc(), 4, "inline-constant"),
        candidate(count_loc(), 7, "void-call"),
    ];

    let survivors = run_pipeline(class, candidates.clone());
    assert_eq!(survivors, candidates);
}

// ---------------------------------------------------------------------------
// Scenario 4: iterator loop
// ---------------------------------------------------------------------------

#[test]
fn test_removing_only_next_call_is_filtered() {
    let class = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![iterator_loop_method()],
    ));
    let candidates = vec![
        candidate(drain_loc(), 5, "void-call"),
        candidate(drain_loc(), 8, "void-call"),
    ];

    let survivors = run_pipeline(class, candidates);

    let indexes: Vec<usize> = survivors.iter().map(|c| c.id().first_index()).collect();
    assert_eq!(indexes, vec![8]);
}

// ---------------------------------------------------------------------------
// Scenario 5: candidates in separate methods stay independent
// ---------------------------------------------------------------------------

#[test]
fn test_filtering_one_method_leaves_the_other_alone() {
    let class = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![for_loop_method(), plain_method()],
    ));
    let candidates = vec![
        candidate(count_loc(), 9, "remove-increment"),
        candidate(plain_loc(), 3, "math"),
        candidate(plain_loc(), 2, "inline-constant"),
    ];

    let survivors = run_pipeline(class, candidates);

    assert_eq!(survivors.len(), 2);
    assert!(survivors.iter().all(|c| c.id().location() == &plain_loc()));
}

// ---------------------------------------------------------------------------
// Parallel class driver
// ---------------------------------------------------------------------------

#[test]
fn test_filter_classes_runs_independent_pipelines() {
    use augur::filters::filter_classes;

    let looped = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![for_loop_method()],
    ));
    let plain_only = Arc::new(ClassStreams::new(
        "com/example/Other",
        vec![plain_method()],
    ));

    struct PerClassMutater;
    impl Mutater for PerClassMutater {
        fn mutate(&self, id: &MutationIdentifier) -> Result<Mutant> {
            // Only the loop class's increment is ever materialized, and the
            // counter filter removes it first, so this is unreachable here.
            panic!("unexpected mutate call for {id}");
        }
    }

    let results = filter_classes(
        vec![
            (looped, vec![candidate(count_loc(), 9, "remove-increment")]),
            (plain_only, vec![candidate(plain_loc(), 3, "math")]),
        ],
        &Config::default(),
        &default_registry(),
        &PerClassMutater,
    )
    .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "com/example/Widget");
    assert!(results[0].1.is_empty());
    assert_eq!(results[1].0, "com/example/Other");
    assert_eq!(results[1].1.len(), 1);
}

// ---------------------------------------------------------------------------
// Failure semantics
// ---------------------------------------------------------------------------

#[test]
fn test_candidate_for_unknown_method_aborts_the_class() {
    let class = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![plain_method()],
    ));
    let ghost = MethodLocation::new("com/example/Widget", "ghost", "()V");

    let config = Config::default();
    let mut pipeline = FilterPipeline::from_config(&config, &default_registry()).unwrap();
    let mutater = NopMutater {
        class: class.clone(),
    };
    let err = pipeline
        .run(&class, vec![candidate(ghost, 0, "math")], &mutater)
        .unwrap_err();

    assert!(err.to_string().contains("ghost"));
}

// ---------------------------------------------------------------------------
// Result composition
// ---------------------------------------------------------------------------

#[test]
fn test_analysis_value_for_harness_outcomes() {
    let survivors = run_pipeline(
        Arc::new(ClassStreams::new(
            "com/example/Widget",
            vec![for_loop_method()],
        )),
        vec![
            candidate(count_loc(), 7, "void-call"),
            candidate(count_loc(), 9, "remove-increment"),
        ],
    );
    assert_eq!(survivors.len(), 1);

    // The external harness assigns outcomes; the core composes them.
    let results: Vec<MutationResult> = survivors
        .into_iter()
        .map(|details| MutationResult::new(details, DetectionStatus::Killed, 40))
        .collect();
    let analysis = MutationAnalysis::new("com/example/Widget", results);

    assert_eq!(analysis.summary.killed, 1);
    assert!((analysis.summary.score - 1.0).abs() < f64::EPSILON);

    let value = analysis.to_value().unwrap();
    assert_eq!(value["summary"]["total"], 1);
    assert_eq!(value["results"][0]["status"], "killed");
}

#[test]
fn test_matcher_tracing_does_not_change_results() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("augur=trace")
        .with_test_writer()
        .try_init();

    let class = Arc::new(ClassStreams::new(
        "com/example/Widget",
        vec![for_loop_method()],
    ));
    let candidates = vec![
        candidate(count_loc(), 7, "void-call"),
        candidate(count_loc(), 9, "remove-increment"),
    ];

    let mut config = Config::default();
    config.filters.trace = true;
    let mut pipeline = FilterPipeline::from_config(&config, &default_registry()).unwrap();
    let mutater = NopMutater {
        class: class.clone(),
    };
    let traced = pipeline.run(&class, candidates.clone(), &mutater).unwrap();

    let quiet = run_pipeline(class, candidates);
    assert_eq!(traced, quiet);
}

#[test]
fn test_pipeline_reports_active_filters() {
    let config = Config::default();
    let pipeline = FilterPipeline::from_config(&config, &default_registry()).unwrap();

    let names: Vec<&str> = pipeline.interceptors().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![
            "avoid-loop-counter",
            "infinite-for-loop",
            "infinite-iterator-loop"
        ]
    );
    assert!(pipeline
        .interceptors()
        .all(|(_, description)| !description.is_empty()));
}
