use rand::rngs::StdRng;
use rand::SeedableRng;

use tutor_engine::{
    DimensionalAnalysis, LongDivision, PartOfWhole, RandomDaConfig, RandomDivisionConfig,
    RandomQuantityConfig, StepPayload, UnitSystem,
};
use tutor_engine::{Fraction, Quantity};

#[test]
fn long_division_page_flow() {
    // A page loads with explicit parameters, the engine is constructed,
    // and the answer plus ordered steps are handed to the renderer.
    let problem = LongDivision::new(846, 3).unwrap();

    assert_eq!(problem.problem_text(), "Find the quotient of 846 and 3");
    assert_eq!(problem.quotient(), 282);
    assert_eq!(problem.remainder(), 0);
    assert_eq!(problem.steps().len(), 3);

    let workbook = problem.workbook_steps();
    assert_eq!(workbook.len(), 3);
    let StepPayload::DivisionTrace { steps } = &workbook[2].payload else {
        panic!("expected the division trace");
    };
    assert_eq!(steps.as_slice(), problem.steps());
}

#[test]
fn random_long_division_page_flow() {
    let config = RandomDivisionConfig {
        divisor_digits: 2,
        quotient_digits: 2,
        has_remainder: true,
        difficulty: 3,
    };
    let problem = LongDivision::random(&config, &mut StdRng::seed_from_u64(17)).unwrap();

    assert_eq!(
        problem.quotient() * problem.divisor() + problem.remainder(),
        problem.dividend()
    );
    assert!(problem.remainder() >= 1);

    // The trace ends on the overall remainder.
    assert_eq!(
        problem.steps().last().unwrap().remainder,
        problem.remainder()
    );
}

#[test]
fn simplification_page_flow() {
    let length = UnitSystem::length();
    let config = RandomQuantityConfig::default();
    let quantity = length
        .random_unsimplified(&config, &mut StdRng::seed_from_u64(2))
        .unwrap();

    let result = length.simplify(&quantity).unwrap();

    // Magnitude is preserved and every non-top count is reduced.
    assert_eq!(
        length.magnitude_in_smallest(&quantity).unwrap(),
        length.magnitude_in_smallest(&result.simplified).unwrap()
    );
    assert!(result.simplified["inches"] < 12);
    assert!(result.simplified["feet"] < 3);

    // Steps come in division/addition pairs and the answer step is
    // consumable by the renderer.
    let steps = length.simplification_steps(&result).unwrap();
    assert!(!steps.is_empty());
    assert_eq!(steps.len() % 2, 0);
    for pair in steps.chunks(2) {
        assert!(matches!(pair[0].payload, StepPayload::Division { .. }));
        assert!(matches!(pair[1].payload, StepPayload::Addition { .. }));
    }
    let answer = length.simplification_answer(&result).unwrap();
    assert!(matches!(answer.payload, StepPayload::Answer { .. }));
}

#[test]
fn dimensional_analysis_page_flow() {
    let volume = UnitSystem::volume();
    let config = RandomDaConfig {
        unit_distance: 3,
        difficulty_level: 2,
        unit_offset: 1,
    };
    let spec = volume
        .random_dimensional_analysis(&config, &mut StdRng::seed_from_u64(8))
        .unwrap();

    assert_eq!(spec.from_unit, "qt");
    assert_eq!(spec.to_unit, "oz");

    let converted = volume.solve_dimensional_analysis(&spec).unwrap();
    // qt -> pt -> c -> oz crosses ratios 4, 2, 8.
    assert_eq!(converted, spec.from_value * 4 * 2 * 8);

    let steps = volume.dimensional_analysis_steps(&spec).unwrap();
    // distance fraction picks + distance checkpoints + cancellation.
    assert_eq!(steps.len(), 3 * 2 + 1);
    let yes_no: Vec<bool> = steps
        .iter()
        .filter_map(|s| match s.payload {
            StepPayload::YesNo { answer } => Some(answer),
            _ => None,
        })
        .collect();
    assert_eq!(yes_no, vec![true, true, false]);
}

#[test]
fn worked_conversion_matches_hand_computation() {
    let length = UnitSystem::length();
    let spec = DimensionalAnalysis {
        from_unit: "yards".to_string(),
        from_value: 2,
        to_unit: "inches".to_string(),
        unit_distance: 2,
        start_index: 2,
    };
    assert_eq!(length.solve_dimensional_analysis(&spec).unwrap(), 72);
    assert_eq!(
        length.dimensional_analysis_problem_text(&spec).unwrap(),
        "Convert 2 yards to inches"
    );
}

#[test]
fn part_of_whole_page_flow() {
    let problem = PartOfWhole::new(
        "A farmer must roast {{PART}} of the {{WHOLE}} chickens. How many is that?",
        "roasted chickens",
        24,
        Fraction::new(3, 4).unwrap(),
    );
    assert_eq!(
        problem.problem_text(),
        "A farmer must roast 3/4 of the 24 chickens. How many is that?"
    );
    assert_eq!(problem.compute_answer(), 18.0);
}

#[test]
fn step_lists_serialize_for_the_rendering_layer() {
    let length = UnitSystem::length();
    let mut quantity = Quantity::default();
    quantity.insert("inches".to_string(), 40);
    let result = length.simplify(&quantity).unwrap();
    let steps = length.simplification_steps(&result).unwrap();

    let json = serde_json::to_value(&steps).unwrap();
    assert_eq!(json[0]["payload"]["kind"], "division");
    assert_eq!(json[0]["payload"]["dividend"], 40);
    assert_eq!(json[1]["payload"]["kind"], "addition");
}
