#![allow(non_snake_case)]
use RustedWallpaper::Utils::formula_report::formula_report_table;
use RustedWallpaper::Utils::generation_params::{GenerationParams, generate_render_arguments};
use RustedWallpaper::Utils::logger::{init_logger, save_grid_to_csv, stamped_log_name};
use RustedWallpaper::formal_grammar::draw_source::ScriptedDraws;
use RustedWallpaper::formulas::arity_sequence_generator::AritySequenceGenerator;
use RustedWallpaper::formulas::formula_grammar::{
    FormulaGrammarConfig, build_formula_grammar, generate_formula_tree,
};
use RustedWallpaper::formulas::formula_serializer::{deserialize, serialize};
use RustedWallpaper::formulas::operators::Operator;
use RustedWallpaper::rendering::render_arguments::FormulaRenderArguments;
use RustedWallpaper::rendering::renderer::{evaluate_projection, render};
use log::LevelFilter;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

fn main() {
    let example = 0;
    match example {
        0 => {
            // random render arguments with the default settings, scaled down image
            init_logger(LevelFilter::Info, true, None);
            let mut params = GenerationParams::default();
            params.width = 36;
            params.height = 64;
            let mut rng = StdRng::seed_from_u64(42);
            match generate_render_arguments(&params, &mut rng) {
                Ok(arguments) => {
                    println!("{}", formula_report_table(&arguments));
                    println!("{}", arguments);
                    match render(&arguments, &mut rng) {
                        Ok(image) => println!("rendered {} bytes", image.rgb.len()),
                        Err(e) => println!("rendering failed: {}", e),
                    }
                }
                Err(e) => println!("generation failed: {}", e),
            }
        }
        1 => {
            // the formula grammar itself, then one formula from a scripted draw sequence
            init_logger(LevelFilter::Debug, true, None);
            let operators: Vec<(Operator, f64)> = ["x", "y", "abs", "sin"]
                .iter()
                .map(|name| {
                    (
                        Operator::by_name(name).unwrap_or_else(|| Operator::variable(name)),
                        1.0,
                    )
                })
                .collect();
            let config = FormulaGrammarConfig {
                minimal_depth: 5,
                leaf_probability: 0.3,
                constant_probability: 0.3,
                arity_probabilities: BTreeMap::from([(0, 0.3), (1, 0.4)]),
            };
            match build_formula_grammar(&operators, || 1.0, &config) {
                Ok(grammar) => println!("{}", grammar),
                Err(e) => println!("{}", e),
            }
            let mut draws = ScriptedDraws::new(vec![0.0, 0.0, 0.5, 0.5, 0.0, 0.5]);
            match generate_formula_tree(&operators, || 1.0, &config, &mut draws) {
                Ok(formula) => println!("{} (draws used: {})", formula, draws.consumed()),
                Err(e) => println!("{}", e),
            }
        }
        2 => {
            // settings from a task document, log to a file
            let log_name = stamped_log_name("wallpaper");
            init_logger(LevelFilter::Info, true, Some(&log_name));
            let document = r#"
            image
             width: 48
             height: 32
            formula
             dimensions: 2, 4
             minimal_depth: 4, 6
            operators
             sum: 0, 1
             mul: 0, 1
             sin: 0, 1
             atan: 0, 1
            "#;
            let params = match GenerationParams::from_task_document(document) {
                Ok(params) => params,
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };
            let mut rng = StdRng::seed_from_u64(7);
            match generate_render_arguments(&params, &mut rng) {
                Ok(arguments) => {
                    println!("{}", formula_report_table(&arguments));
                    if let Ok(grid) = evaluate_projection(&arguments) {
                        if let Err(e) = save_grid_to_csv(&grid, "wallpaper_grid.csv") {
                            println!("csv export failed: {}", e);
                        }
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        3 => {
            // text form of render arguments
            let text = "4;3;-1,0.5;0,1\r\n1,0,0,0;0,1,0,0.1;0,0,1,0\r\nsum sin x0 mul x1 2";
            match FormulaRenderArguments::parse(text) {
                Ok(arguments) => {
                    let formula = &arguments.formula;
                    println!("{} at (1, 2) = {}", serialize(formula), formula.evaluate(&[1.0, 2.0]));
                    let mut rng = StdRng::seed_from_u64(1);
                    if let Ok(image) = render(&arguments, &mut rng) {
                        println!("pixel (0, 0): {:?}", image.pixel(0, 0));
                    }
                }
                Err(e) => println!("{}", e),
            }
            if let Err(e) = deserialize("sum x") {
                println!("expected error: {}", e);
            }
        }
        4 => {
            // older generator without depth control
            let library = Operator::library();
            let mut generator = AritySequenceGenerator::new(StdRng::seed_from_u64(3));
            match generator.create_random_formula_tree(3, 6, 2, 2, &library) {
                Ok(formula) => println!("{}", formula),
                Err(e) => println!("{}", e),
            }
        }
        _ => println!("no such example"),
    }
}
