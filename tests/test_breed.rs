use std::cell::RefCell;
use std::rc::Rc;

use genprog::{
    engine::{ExpressionEngine, ScriptedEngine},
    error::{GpError, Result},
    evolution::{
        options::{OperatorProbabilities, RunConfig},
        GenerationSummary, GeneticOperator, PopulationBuilder, PopulationObserver,
        PopulationState,
    },
    fitness::{CustomDeviance, DevianceMethod, TestCases},
    individual::Individual,
    selection::SelectionMethod,
    vocabulary::Vocabulary,
};

#[derive(Debug, Default)]
struct Events {
    created: usize,
    evaluated: usize,
    operators: Vec<GeneticOperator>,
    skipped: usize,
    generations: Vec<usize>,
    solutions: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default)]
struct RecordingObserver {
    events: Rc<RefCell<Events>>,
}

impl PopulationObserver for RecordingObserver {
    fn on_individual_created(&mut self, _individual: &Individual) {
        self.events.borrow_mut().created += 1;
    }

    fn on_individual_evaluated(&mut self, _index: usize, _individual: &Individual) {
        self.events.borrow_mut().evaluated += 1;
    }

    fn on_operator_applied(&mut self, operator: GeneticOperator, _children: usize) {
        self.events.borrow_mut().operators.push(operator);
    }

    fn on_attempt_skipped(&mut self, _operator: GeneticOperator, _error: &GpError) {
        self.events.borrow_mut().skipped += 1;
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary) {
        self.events.borrow_mut().generations.push(summary.generation);
    }

    fn on_solution_found(&mut self, solution: &Individual, generation: usize) {
        self.events
            .borrow_mut()
            .solutions
            .push((solution.expression().to_string(), generation));
    }
}

/// Squared error against the expected output.
#[derive(Debug)]
struct SquaredError;

impl CustomDeviance for SquaredError {
    fn calculate(
        &self,
        engine: &mut dyn ExpressionEngine,
        cases: &TestCases,
        individual: &Individual,
        case_index: usize,
    ) -> Result<f64> {
        let expected = cases.output(case_index).unwrap_or_default();
        let actual = engine.evaluate(individual.expression(), cases.input(case_index))?;
        Ok((expected - actual).powi(2))
    }
}

fn identity_cases() -> TestCases {
    TestCases::new(
        vec![vec![1.0], vec![2.0], vec![3.0]],
        Some(vec![1.0, 2.0, 3.0]),
    )
    .unwrap()
}

fn mutation_only(size: usize) -> RunConfig {
    RunConfig::builder()
        .population_size(size)
        .vocabulary(Vocabulary::from_lists("X", "", "+,*"))
        .probabilities(OperatorProbabilities::new(0.0, 0.0, 1.0, 0.0))
        .selection(SelectionMethod::Tournament { size: 2 })
        .seed(11)
        .build()
        .unwrap()
}

#[test]
fn test_breed_finds_the_identity() {
    let engine = ScriptedEngine::new("0").with_mutations(["5", "7", "X"]);
    let mut population = PopulationBuilder::new()
        .with_config(mutation_only(4))
        .with_engine(engine)
        .with_cases(identity_cases())
        .build()
        .unwrap();
    population.populate().unwrap();
    assert_eq!(population.best().unwrap().hits(), Some(0));

    let outcome = population.breed().unwrap();

    assert!(outcome.solved);
    assert_eq!(outcome.generation, 1);
    assert_eq!(outcome.best.expression().as_str(), "X");
    assert_eq!(outcome.best.hits(), Some(3));
    assert_eq!(outcome.best.raw_fitness(), Some(0.0));
    assert_eq!(outcome.solution_path, None);
    assert_eq!(population.state(), PopulationState::Terminated);
}

#[test]
fn test_breed_returns_immediately_when_solved() {
    let mut population = PopulationBuilder::new()
        .with_config(mutation_only(3))
        .with_engine(ScriptedEngine::new("X"))
        .with_cases(identity_cases())
        .build()
        .unwrap();
    population.populate().unwrap();

    let outcome = population.breed().unwrap();
    assert!(outcome.solved);
    assert_eq!(outcome.generation, 0);
    assert_eq!(population.engine().calls().mutate, 0);
}

#[test]
fn test_breed_requires_members() {
    let mut population = PopulationBuilder::new()
        .with_config(mutation_only(3))
        .with_engine(ScriptedEngine::new("X"))
        .with_cases(identity_cases())
        .build()
        .unwrap();
    assert!(matches!(population.breed(), Err(GpError::IllegalState(_))));
}

#[test]
fn test_breed_stops_at_generation_limit() {
    let mut config = mutation_only(4);
    config.set_probabilities(OperatorProbabilities::new(0.0, 0.0, 0.0, 1.0));
    config.set_max_generations(Some(3));
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(ScriptedEngine::new("0"))
        .with_cases(identity_cases())
        .build()
        .unwrap();
    population.populate().unwrap();

    let outcome = population.breed().unwrap();
    assert!(!outcome.solved);
    assert_eq!(outcome.generation, 3);
    assert_eq!(population.generation(), 3);
    assert_eq!(population.state(), PopulationState::Scored);
}

#[test]
fn test_solution_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = mutation_only(4);
    config.set_output_dir(Some(dir.path().to_path_buf()));
    config.set_run_name("identity");

    let engine = ScriptedEngine::new("0").with_mutations(["X"]);
    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(engine)
        .with_cases(identity_cases())
        .build()
        .unwrap();
    population.populate().unwrap();
    let outcome = population.breed().unwrap();

    let path = outcome.solution_path.unwrap();
    assert_eq!(path, dir.path().join("identity-sol.lsp"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "X\n");
}

#[test]
fn test_observer_sees_the_run() {
    let observer = RecordingObserver::default();
    let events = Rc::clone(&observer.events);

    let engine = ScriptedEngine::new("0").with_mutations(["5", "7", "X"]);
    let mut population = PopulationBuilder::new()
        .with_config(mutation_only(4))
        .with_engine(engine)
        .with_cases(identity_cases())
        .with_observer(observer)
        .build()
        .unwrap();
    population.populate().unwrap();
    population.breed().unwrap();

    let events = events.borrow();
    assert_eq!(events.created, 8);
    assert_eq!(events.evaluated, 8);
    assert_eq!(events.operators, vec![GeneticOperator::Mutation; 4]);
    assert_eq!(events.skipped, 0);
    assert_eq!(events.generations, vec![0, 1]);
    assert_eq!(events.solutions, vec![("X".to_string(), 1)]);
}

#[test]
fn test_custom_deviance() {
    let mut config = mutation_only(2);
    config.set_deviance("CUSTOM=squared".parse::<DevianceMethod>().unwrap());
    let engine = ScriptedEngine::new("2").with_programs(["0"]);

    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(engine)
        .with_cases(identity_cases())
        .with_custom_deviance("squared", SquaredError)
        .build()
        .unwrap();
    population.populate().unwrap();

    // 1 + 4 + 9 for "0"; 1 + 0 + 1 for "2"
    assert_eq!(population.members()[0].raw_fitness(), Some(14.0));
    assert_eq!(population.members()[1].raw_fitness(), Some(2.0));
    assert_eq!(population.best().unwrap().expression().as_str(), "2");
    assert_eq!(population.best().unwrap().hits(), Some(1));
}

#[test]
fn test_external_function_deviance() {
    let mut config = mutation_only(2);
    config.set_deviance(DevianceMethod::ExternalFunction("score".to_string()));
    let engine = ScriptedEngine::new("X")
        .with_programs(["GOOD"])
        .with_evaluator(|text, input| {
            let x = input.map(|v| v[0]).unwrap_or_default();
            match text {
                "(score GOOD)" => Ok(0.0),
                "(score X)" => Ok(-x),
                other => Err(GpError::Engine(format!("unexpected call {}", other))),
            }
        });

    let mut population = PopulationBuilder::new()
        .with_config(config)
        .with_engine(engine)
        .with_cases(TestCases::from_inputs(vec![vec![1.0], vec![2.0]]).unwrap())
        .build()
        .unwrap();
    population.populate().unwrap();

    assert_eq!(population.members()[0].hits(), Some(2));
    assert_eq!(population.members()[1].raw_fitness(), Some(3.0));

    let outcome = population.breed().unwrap();
    assert_eq!(outcome.best.expression().as_str(), "GOOD");
}

#[test]
fn test_fatal_engine_error_aborts_breeding() {
    let engine = ScriptedEngine::new("0").with_mutations(["BROKEN"]);
    let mut population = PopulationBuilder::new()
        .with_config(mutation_only(2))
        .with_engine(engine)
        .with_cases(identity_cases())
        .build()
        .unwrap();
    population.populate().unwrap();

    assert!(matches!(population.breed(), Err(GpError::Engine(_))));
}
