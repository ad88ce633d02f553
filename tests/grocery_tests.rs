//! # Grocery List Integration Tests
//!
//! End-to-end checks of ingredient parsing and aggregation, from recipe
//! ingredient blocks to the rendered shopping list.

use growth_engine::aggregate_ingredients;
use growth_engine::grocery::collect_ingredient_lines;
use growth_engine::ingredient_model::{format_quantity, Unit};
use growth_engine::ingredient_parser::parse_ingredient;
use growth_engine::recipe::{Recipe, RecipeTag};

#[test]
fn test_parse_reference_lines() {
    let eggs = parse_ingredient("2 eggs").unwrap();
    assert_eq!(eggs.quantity, 2.0);
    assert_eq!(eggs.unit, Unit::Pieces);
    assert_eq!(eggs.item, "eggs");

    let chicken = parse_ingredient("200g chicken breast").unwrap();
    assert_eq!(chicken.quantity, 200.0);
    assert_eq!(chicken.unit, Unit::Grams);
    assert_eq!(chicken.item, "chicken breast");

    let sugar = parse_ingredient("1/2 cup sugar").unwrap();
    assert_eq!(sugar.quantity, 0.5);
    assert_eq!(sugar.unit, Unit::Other("cup".to_string()));
    assert_eq!(sugar.item, "sugar");

    let salt = parse_ingredient("salt").unwrap();
    assert_eq!(salt.quantity, 1.0);
    assert_eq!(salt.unit, Unit::Pieces);
    assert_eq!(salt.item, "salt");
}

#[test]
fn test_weekly_meal_plan() {
    let recipes = vec![
        Recipe::new(
            "Chicken Rice Bowl",
            &[RecipeTag::HighProtein, RecipeTag::MealPrep],
            "200g chicken breast\n100g rice\n1 avocado",
            "Cook and assemble.",
        )
        .unwrap(),
        Recipe::new(
            "Omelette",
            &[RecipeTag::Quick],
            "3 eggs\n50 grams cheese\n\nsalt",
            "",
        )
        .unwrap(),
        Recipe::new(
            "Chicken Salad",
            &[RecipeTag::LowCarb],
            "0.3 KG Chicken Breast\n1 avocado\n2 eggs",
            "",
        )
        .unwrap(),
    ];

    let lines = collect_ingredient_lines(&recipes, &["Chicken Rice Bowl", "Omelette", "Chicken Salad"]);
    assert_eq!(lines.len(), 9);

    let list = aggregate_ingredients(&lines);
    assert_eq!(
        list,
        vec![
            "0.3kg chicken breast",
            "1 salt",
            "100g rice",
            "2 avocado",
            "200g chicken breast",
            "5 eggs",
            "50g cheese",
        ]
    );
}

#[test]
fn test_unknown_recipe_is_skipped() {
    let recipes = vec![Recipe::new("Omelette", &[], "3 eggs", "").unwrap()];
    let lines = collect_ingredient_lines(&recipes, &["Pancakes", "Omelette"]);
    assert_eq!(aggregate_ingredients(&lines), vec!["3 eggs"]);
}

#[test]
fn test_aggregation_ignores_order() {
    let lines = vec![
        "2 eggs",
        "1/2 cup sugar",
        "200g flour",
        "3 eggs",
        "0.25 cup sugar",
        "pinch of salt",
        "1 kg potatoes",
    ];
    let expected = aggregate_ingredients(&lines);

    let mut reversed = lines.clone();
    reversed.reverse();
    assert_eq!(aggregate_ingredients(&reversed), expected);

    let mut rotated = lines.clone();
    rotated.rotate_left(3);
    assert_eq!(aggregate_ingredients(&rotated), expected);

    assert!(expected.contains(&"0.75cup sugar".to_string()));
    assert!(expected.contains(&"5 eggs".to_string()));
}

#[test]
fn test_aggregation_is_idempotent() {
    let lines = ["2 eggs", "3 eggs", "100g rice"];
    let first = aggregate_ingredients(&lines);
    let second = aggregate_ingredients(&lines);
    assert_eq!(first, second);
}

#[test]
fn test_rendered_quantities_parse_back() {
    for value in [0.5, 2.0, 0.75, 12.5, 1234.5] {
        let rendered = format_quantity(value);
        assert_eq!(rendered.parse::<f64>().unwrap(), value);
    }
}

#[test]
fn test_empty_input() {
    let none: [&str; 0] = [];
    assert!(aggregate_ingredients(&none).is_empty());
    assert!(aggregate_ingredients(&["", "   "]).is_empty());
}
