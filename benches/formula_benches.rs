use RustedWallpaper::Utils::generation_params::{GenerationParams, generate_render_arguments};
use RustedWallpaper::formulas::formula_grammar::{FormulaGrammarConfig, generate_formula_tree};
use RustedWallpaper::formulas::formula_serializer::deserialize;
use RustedWallpaper::formulas::operators::Operator;
use RustedWallpaper::rendering::render_arguments::FormulaRenderArguments;
use RustedWallpaper::rendering::renderer::render;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

fn bench_generate_formula(c: &mut Criterion) {
    let operators: Vec<(Operator, f64)> = ["x0", "x1", "x2", "sum", "mul", "sin", "cos", "div"]
        .iter()
        .map(|name| {
            (
                Operator::by_name(name).unwrap_or_else(|| Operator::variable(name)),
                1.0,
            )
        })
        .collect();
    let config = FormulaGrammarConfig {
        minimal_depth: 10,
        leaf_probability: 0.2,
        constant_probability: 0.2,
        arity_probabilities: BTreeMap::from([(0, 0.5), (1, 0.3), (2, 0.2)]),
    };
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("generate formula, depth 10", |b| {
        b.iter(|| generate_formula_tree(black_box(&operators), || 1.0, &config, &mut rng))
    });
}

fn bench_evaluate_formula(c: &mut Criterion) {
    let formula = deserialize("sum mul sin x0 cos x1 atan div x0 sum abs x1 0.01").unwrap();
    let compiled = formula.lambdify();
    c.bench_function("evaluate tree", |b| b.iter(|| formula.evaluate(black_box(&[0.3, 0.7]))));
    c.bench_function("evaluate lambdified", |b| b.iter(|| compiled(black_box(&[0.3, 0.7]))));
}

fn bench_render(c: &mut Criterion) {
    let arguments = FormulaRenderArguments::parse(
        "360;640;-3,0.02;-2,0.01\r\n1,0.5,0.2,0.1;0,1,0,0.2;-1,0,1,0.3\r\nmul sin x0 cos x1",
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    c.bench_function("render 360x640", |b| b.iter(|| render(&arguments, &mut rng)));
}

fn bench_random_render_arguments(c: &mut Criterion) {
    let params = GenerationParams::default();
    let mut rng = StdRng::seed_from_u64(3);
    c.bench_function("random render arguments", |b| {
        b.iter(|| generate_render_arguments(&params, &mut rng))
    });
}

criterion_group!(
    benches,
    bench_generate_formula,
    bench_evaluate_formula,
    bench_render,
    bench_random_render_arguments
);
criterion_main!(benches);
