use criterion::{black_box, criterion_group, criterion_main, Criterion};
use genprog::{
    engine::ScriptedEngine,
    evolution::{
        options::{LogLevel, RunConfig},
        NoopObserver, PopulationBuilder,
    },
    fitness::TestCases,
    selection::SelectionMethod,
    vocabulary::Vocabulary,
    Population,
};

fn population(size: usize, selection: SelectionMethod) -> Population<ScriptedEngine> {
    let config = RunConfig::builder()
        .population_size(size)
        .vocabulary(Vocabulary::from_lists("X, CONSTANT-SYNTHESIS", "", "+,-,*"))
        .selection(selection)
        .log_level(LogLevel::None)
        .seed(17)
        .build()
        .unwrap();
    let inputs: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
    let outputs = inputs.iter().map(|v| v[0] * 2.0).collect();
    let engine = ScriptedEngine::new("X").with_programs(["0", "1", "2", "3", "4", "5"]);

    PopulationBuilder::new()
        .with_config(config)
        .with_engine(engine)
        .with_cases(TestCases::new(inputs, Some(outputs)).unwrap())
        .with_observer(NoopObserver)
        .build()
        .unwrap()
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate");
    for size in [10, 100, 1000].iter() {
        group.bench_function(&format!("populate_{}", size), |b| {
            b.iter(|| {
                let mut population = population(*size, SelectionMethod::default());
                assert!(black_box(population.populate()).is_ok());
            })
        });
    }
    group.finish();
}

fn bench_next_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_generation");
    let methods = [
        ("tournament", SelectionMethod::Tournament { size: 4 }),
        ("proportionate", SelectionMethod::FitnessProportionate { selectivity: 0.9 }),
    ];
    for (name, method) in methods.iter() {
        for size in [10, 100, 1000].iter() {
            let mut population = population(*size, *method);
            population.populate().unwrap();
            group.bench_function(&format!("{}_{}", name, size), |b| {
                b.iter(|| {
                    let report = population.next();
                    assert!(black_box(report).is_ok());
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_populate, bench_next_generation);
criterion_main!(benches);
