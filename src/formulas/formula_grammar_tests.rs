#[cfg(test)]
mod tests {
    use crate::formal_grammar::draw_source::ScriptedDraws;
    use crate::formulas::formula_errors::FormulaError;
    use crate::formulas::formula_grammar::*;
    use crate::formulas::operators::Operator;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeMap;

    fn ops(names: &[&str]) -> OperatorProbabilities {
        names
            .iter()
            .map(|name| {
                let op = Operator::by_name(name).unwrap_or_else(|| Operator::variable(name));
                (op, 1.0)
            })
            .collect()
    }

    fn cycling_constants() -> impl FnMut() -> f64 + 'static {
        let mut i = 0;
        move || {
            i += 1;
            ((i - 1) % 3 + 1) as f64
        }
    }

    fn scenario_config(minimal_depth: usize) -> FormulaGrammarConfig {
        FormulaGrammarConfig {
            minimal_depth,
            leaf_probability: 0.3,
            constant_probability: 0.3,
            arity_probabilities: BTreeMap::from([
                (0, 0.3),
                (1, 0.4),
                (2, 0.3),
                (3, 0.2),
                (4, 0.2),
            ]),
        }
    }

    // arity map without a bare variable weight, as generation settings usually give it
    fn shared_config(minimal_depth: usize) -> FormulaGrammarConfig {
        FormulaGrammarConfig {
            minimal_depth,
            leaf_probability: 0.3,
            constant_probability: 0.3,
            arity_probabilities: BTreeMap::from([(1, 0.4), (2, 0.3), (3, 0.2), (4, 0.2)]),
        }
    }

    fn run_linear(names: &[&str], minimal_depth: usize) -> (String, usize) {
        let mut draws = ScriptedDraws::linear(10, 0.1);
        let tree = generate_formula_tree(
            &ops(names),
            cycling_constants(),
            &shared_config(minimal_depth),
            &mut draws,
        )
        .unwrap();
        (tree.to_string(), draws.consumed())
    }

    fn run_scenario(names: &[&str], minimal_depth: usize, script: Vec<f64>) -> (String, usize) {
        let mut draws = ScriptedDraws::new(script);
        let tree = generate_formula_tree(
            &ops(names),
            cycling_constants(),
            &scenario_config(minimal_depth),
            &mut draws,
        )
        .unwrap();
        (tree.to_string(), draws.consumed())
    }

    #[test]
    fn unary_chain_reaches_minimal_depth() {
        let (formula, used) = run_scenario(
            &["x", "y", "abs", "sin"],
            5,
            vec![0.0, 0.0, 0.5, 0.5, 0.0, 0.5],
        );
        assert_eq!(formula, "abs abs sin sin y");
        assert_eq!(used, 6);
    }

    #[test]
    fn modulo_keeps_divisor_away_from_zero() {
        let (formula, used) =
            run_scenario(&["x", "y", "z", "mod"], 2, vec![0.0, 0.0, 0.0, 0.0, 0.5]);
        assert_eq!(formula, "mod x sum abs y 0.01");
        assert_eq!(used, 5);
    }

    #[test]
    fn guarded_division_with_max_operands() {
        let (formula, used) = run_scenario(
            &["x", "y", "z", "div", "max"],
            4,
            vec![
                0.0, 0.0, 0.5, 0.0, 0.0, 0.5, 0.0, 0.0, 0.7, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            ],
        );
        assert_eq!(formula, "atan div max y z max x x");
        assert_eq!(used, 16);
    }

    #[test]
    fn linear_draws_drive_every_scenario() {
        // depth 1..4 only allow unary nodes, then 0.4 falls on the bare variable (3/7)
        assert_eq!(
            run_linear(&["x", "y", "abs", "sin"], 5),
            ("abs abs abs abs y".to_string(), 6)
        );
        assert_eq!(
            run_linear(&["x", "y", "z", "mod"], 2),
            ("mod x sum abs y 0.01".to_string(), 5)
        );
        assert_eq!(
            run_linear(&["x", "y", "z", "div", "max"], 4),
            (
                "atan div atan div max z x x tanh div max x y max z x".to_string(),
                32
            )
        );
    }

    #[test]
    fn bare_variable_weight_defaults_to_leaf_probability() {
        let config = shared_config(3);
        assert!(!config.arity_probabilities.contains_key(&0));
        let grammar = build_formula_grammar(&ops(&["x", "y", "abs", "sin"]), || 1.0, &config);
        assert!(grammar.is_ok());
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..20 {
            let tree = generate_formula_tree(
                &ops(&["x", "y", "abs", "sin"]),
                cycling_constants(),
                &config,
                &mut rng,
            )
            .unwrap();
            assert!(tree.min_depth() >= 3, "{}", tree);
        }
    }

    #[test]
    fn unreachable_minimal_depth_is_rejected_up_front() {
        for names in [["x", "ifg0"], ["x", "ifg"]] {
            let result = build_formula_grammar(&ops(&names), || 1.0, &shared_config(13));
            assert!(matches!(result, Err(FormulaError::Configuration(_))), "{:?}", names);
            assert!(build_formula_grammar(&ops(&names), || 1.0, &shared_config(5)).is_ok());
        }
        // a unary operator keeps any depth within reach
        assert!(build_formula_grammar(&ops(&["x", "sin", "ifg"]), || 1.0, &shared_config(30)).is_ok());
    }

    #[test]
    fn arity_weights_are_normalized_over_present_arities() {
        let operators: Vec<Operator> = ops(&["sin", "pow"]).into_iter().map(|(op, _)| op).collect();
        let map = BTreeMap::from([(1, 30.0), (2, 20.0), (3, 30.0), (4, 10.0)]);
        let weights = normalize_arity_probabilities(&operators, &map);
        assert_eq!(weights.len(), 2);
        assert_relative_eq!(weights[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(weights[1], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn operator_set_without_variable_is_rejected() {
        let result = build_formula_grammar(&ops(&["sin", "sum"]), || 1.0, &scenario_config(3));
        assert!(matches!(result, Err(FormulaError::Configuration(_))));
        let empty: OperatorProbabilities = Vec::new();
        assert!(build_formula_grammar(&empty, || 1.0, &scenario_config(3)).is_err());
    }

    #[test]
    fn missing_arity_weight_is_rejected() {
        let mut config = scenario_config(3);
        config.arity_probabilities.remove(&2);
        let result = build_formula_grammar(&ops(&["x", "sum"]), || 1.0, &config);
        assert!(matches!(result, Err(FormulaError::Configuration(_))));
        config.arity_probabilities.remove(&1);
        assert!(build_formula_grammar(&ops(&["x", "sin"]), || 1.0, &config).is_err());
    }

    #[test]
    fn invalid_probabilities_are_rejected() {
        let mut config = scenario_config(3);
        config.leaf_probability = 1.5;
        assert!(build_formula_grammar(&ops(&["x", "sin"]), || 1.0, &config).is_err());
        let mut operators = ops(&["x", "sin"]);
        operators[1].1 = -0.5;
        assert!(build_formula_grammar(&operators, || 1.0, &scenario_config(3)).is_err());
    }

    #[test]
    fn zero_probability_operators_never_appear() {
        let mut operators = ops(&["x", "y", "sin", "cos", "sum"]);
        operators[1].1 = 0.0;
        operators[3].1 = 0.0;
        let grammar = build_formula_grammar(&operators, || 1.0, &scenario_config(4)).unwrap();
        assert!(!grammar.contains("cosNode"));
        assert!(grammar.contains("sinNode"));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let tree = generate_formula_tree(
                &operators,
                cycling_constants(),
                &scenario_config(4),
                &mut rng,
            )
            .unwrap();
            let text = tree.to_string();
            assert!(!text.contains("cos"), "{}", text);
            assert!(!text.split(' ').any(|token| token == "y"), "{}", text);
        }
    }

    #[test]
    fn random_trees_respect_minimal_depth() {
        let config = FormulaGrammarConfig {
            minimal_depth: 5,
            leaf_probability: 0.3,
            constant_probability: 0.2,
            arity_probabilities: BTreeMap::from([(0, 0.6), (1, 0.25), (2, 0.15)]),
        };
        let operators = ops(&["x", "y", "sin", "sum", "mul"]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let tree =
                generate_formula_tree(&operators, cycling_constants(), &config, &mut rng).unwrap();
            assert!(tree.min_depth() >= 5, "{}", tree);
            assert!(tree.is_balanced(), "{}", tree);
            assert!(tree.dimensions() >= 1, "{}", tree);
        }
    }

    fn assert_minimal_depth(operators: &OperatorProbabilities, minimal_depth: usize, seed: u64) {
        let config = FormulaGrammarConfig {
            minimal_depth,
            leaf_probability: 0.3,
            constant_probability: 0.2,
            arity_probabilities: BTreeMap::from([
                (0, 0.6),
                (1, 0.25),
                (2, 0.1),
                (3, 0.03),
                (4, 0.02),
            ]),
        };
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..100 {
            let tree =
                generate_formula_tree(operators, cycling_constants(), &config, &mut rng).unwrap();
            assert!(tree.min_depth() >= minimal_depth, "{}", tree);
            assert!(tree.is_balanced(), "{}", tree);
        }
    }

    #[test]
    fn power_operands_respect_minimal_depth() {
        assert_minimal_depth(&ops(&["x", "y", "sum", "pow"]), 6, 3);
        assert_minimal_depth(&ops(&["x", "y", "pow"]), 5, 4);
    }

    #[test]
    fn full_library_respects_minimal_depth() {
        let mut operators: OperatorProbabilities =
            Operator::library().into_iter().map(|op| (op, 1.0)).collect();
        operators.push((Operator::variable("x"), 1.0));
        operators.push((Operator::variable("y"), 1.0));
        assert_minimal_depth(&operators, 8, 5);
        assert_minimal_depth(&operators, 13, 6);
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let config = FormulaGrammarConfig {
            minimal_depth: 4,
            leaf_probability: 0.2,
            constant_probability: 0.3,
            arity_probabilities: BTreeMap::from([(0, 0.6), (1, 0.2), (2, 0.2)]),
        };
        let operators = ops(&["x", "y", "ln", "div", "pow"]);
        let first = generate_formula_tree(
            &operators,
            cycling_constants(),
            &config,
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();
        let second = generate_formula_tree(
            &operators,
            cycling_constants(),
            &config,
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn constants_are_rounded_and_kept_off_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let c = create_constant((-10.0, 10.0), &mut rng);
            assert!((-10.0..=10.0).contains(&c));
            assert!(c.abs() >= 0.01);
            assert_relative_eq!(c * 100.0, (c * 100.0).round(), epsilon = 1e-6);
        }
        assert_relative_eq!(create_constant((0.0, 0.0), &mut rng), 0.01);
        assert_relative_eq!(create_constant((1.234, 1.234), &mut rng), 1.23, epsilon = 1e-12);
    }
}
