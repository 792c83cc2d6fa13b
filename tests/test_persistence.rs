use std::fs;

use genprog::{
    engine::ScriptedEngine,
    error::GpError,
    evolution::{options::RunConfig, PopulationBuilder, PopulationState},
    fitness::TestCases,
    persistence,
    vocabulary::Vocabulary,
};

fn cases() -> TestCases {
    TestCases::new(vec![vec![1.0], vec![2.0]], Some(vec![2.0, 4.0])).unwrap()
}

#[test]
fn test_read_run_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let vectors = dir.path().join("inputs.txt");
    let outputs = dir.path().join("outputs.txt");
    let vocabulary = dir.path().join("vocabulary.txt");
    fs::write(&vectors, "1.0, 2.0\n3.5,-1\n").unwrap();
    fs::write(&outputs, "2.0\n\n4.0, 9.0\n").unwrap();
    fs::write(&vocabulary, "INPUT1, INPUT2, CONSTANT-SYNTHESIS\nsqrt\n+, -, *\n\n").unwrap();

    let inputs = persistence::read_vectors(&vectors).unwrap();
    assert_eq!(inputs, vec![vec![1.0, 2.0], vec![3.5, -1.0]]);
    assert_eq!(persistence::read_outputs(&outputs).unwrap(), vec![2.0, 4.0]);

    let vocabulary = persistence::read_vocabulary(&vocabulary).unwrap();
    assert_eq!(vocabulary.terminals(), ["INPUT1", "INPUT2", "CONSTANT-SYNTHESIS"]);
    assert_eq!(vocabulary.one_arg_functions(), ["sqrt"]);
    assert_eq!(vocabulary.two_arg_functions(), ["+", "-", "*"]);
    assert!(vocabulary.synthesizes_constants());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = persistence::read_vectors(dir.path().join("absent.txt"));
    assert!(result.is_err());
}

#[test]
fn test_save_and_load_generation() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::builder()
        .population_size(3)
        .vocabulary(Vocabulary::from_lists("X", "", "+"))
        .run_name("double")
        .output_dir(dir.path())
        .seed(5)
        .build()
        .unwrap();
    let engine = ScriptedEngine::new("4").with_programs(["2", "X"]);
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(engine)
        .with_cases(cases())
        .build()
        .unwrap();
    population.populate().unwrap();

    let (generation_path, stats_path) = population.save().unwrap();
    assert_eq!(generation_path, dir.path().join("double-gen.lsp"));
    assert_eq!(fs::read_to_string(&generation_path).unwrap(), "2\nX\n4\n");

    let stats = fs::read_to_string(&stats_path).unwrap();
    let rows: Vec<&str> = stats.lines().collect();
    assert_eq!(rows.len(), 3);
    // "2" misses the second case by 2
    assert_eq!(rows[0], format!("{},{}", 1.0 / 3.0, 2.0));

    let config = RunConfig::builder()
        .vocabulary(Vocabulary::from_lists("X", "", "+"))
        .build()
        .unwrap();
    let mut restored = PopulationBuilder::new()
        .with_config(config)
        .with_engine(ScriptedEngine::new("0"))
        .with_cases(cases())
        .build()
        .unwrap();

    assert_eq!(restored.load(&generation_path).unwrap(), 3);
    assert_eq!(restored.config().get_population_size(), Some(3));
    assert_eq!(restored.state(), PopulationState::Populated);
    assert!(restored.best().is_none());
    assert!(matches!(restored.next(), Err(GpError::IllegalState(_))));

    restored.recompute_stats().unwrap();
    assert_eq!(restored.state(), PopulationState::Scored);
    assert_eq!(restored.members()[2].raw_fitness(), Some(2.0));
    assert_eq!(restored.engine().calls().random_program, 0);
}

#[test]
fn test_load_stops_at_blank_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run-gen.lsp");
    fs::write(&path, "X\n(+ X X)\n\ntrailing notes\n").unwrap();

    let config = RunConfig::builder()
        .vocabulary(Vocabulary::from_lists("X", "", "+"))
        .build()
        .unwrap();
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(ScriptedEngine::new("X"))
        .with_cases(cases())
        .build()
        .unwrap();

    assert_eq!(population.load(&path).unwrap(), 2);
    assert_eq!(population.members()[1].expression().as_str(), "(+ X X)");
}

#[test]
fn test_load_empty_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty-gen.lsp");
    fs::write(&path, "\n").unwrap();

    let config = RunConfig::builder()
        .population_size(2)
        .vocabulary(Vocabulary::from_lists("X", "", "+"))
        .build()
        .unwrap();
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(ScriptedEngine::new("X"))
        .with_cases(cases())
        .build()
        .unwrap();

    assert!(matches!(population.load(&path), Err(GpError::EmptyPopulation)));
    assert_eq!(population.state(), PopulationState::Empty);
}

#[test]
fn test_save_without_output_dir() {
    let config = RunConfig::builder()
        .population_size(2)
        .vocabulary(Vocabulary::from_lists("X", "", "+"))
        .build()
        .unwrap();
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(ScriptedEngine::new("X"))
        .with_cases(cases())
        .build()
        .unwrap();
    population.populate().unwrap();
    assert!(matches!(population.save(), Err(GpError::IllegalState(_))));
}

#[cfg(feature = "serde")]
#[test]
fn test_config_and_members_serialize() {
    use genprog::individual::Individual;

    let config = RunConfig::builder()
        .population_size(8)
        .vocabulary(Vocabulary::from_lists("X, CONSTANT-SYNTHESIS", "", "+,*"))
        .seed(3)
        .build()
        .unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let restored: RunConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);

    let mut individual = Individual::new("(+ X 1)");
    individual.set_fitness(0.5, 1);
    let json = serde_json::to_string(&individual).unwrap();
    let restored: Individual = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, individual);
}

#[test]
fn test_load_rejects_dump_larger_than_population() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big-gen.lsp");
    fs::write(&path, "X\n1\n2\n3\n").unwrap();

    let config = RunConfig::builder()
        .population_size(3)
        .vocabulary(Vocabulary::from_lists("X", "", "+"))
        .build()
        .unwrap();
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(ScriptedEngine::new("X"))
        .with_cases(cases())
        .build()
        .unwrap();

    assert!(matches!(population.load(&path), Err(GpError::Configuration(_))));
    assert_eq!(population.state(), PopulationState::Empty);
    assert!(population.members().is_empty());
}

#[test]
fn test_next_refills_smaller_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small-gen.lsp");
    fs::write(&path, "X\n2\n").unwrap();

    let config = RunConfig::builder()
        .population_size(3)
        .vocabulary(Vocabulary::from_lists("X", "", "+"))
        .seed(9)
        .build()
        .unwrap();
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(ScriptedEngine::new("X"))
        .with_cases(cases())
        .build()
        .unwrap();

    assert_eq!(population.load(&path).unwrap(), 2);
    population.recompute_stats().unwrap();
    assert_eq!(population.len(), 2);

    population.next().unwrap();
    assert_eq!(population.len(), 3);
    assert_eq!(population.generation(), 1);
}
