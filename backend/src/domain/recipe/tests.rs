//! Tests for recipe payload validation.

use super::*;
use rstest::{fixture, rstest};

const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

fn line(id: i64, amount: i64) -> IngredientLineInput {
    IngredientLineInput { id, amount }
}

#[fixture]
fn complete_input() -> RecipeInput {
    RecipeInput {
        name: Some("Pancakes".to_owned()),
        text: Some("Mix and fry.".to_owned()),
        cooking_time: Some(20),
        image: Some(PNG.to_owned()),
        ingredients: Some(vec![line(1, 200), line(2, 2)]),
    }
}

#[rstest]
#[case(None)]
#[case(Some(Vec::new()))]
fn missing_or_empty_ingredients_share_one_error(#[case] lines: Option<Vec<IngredientLineInput>>) {
    assert_eq!(
        IngredientSet::from_input(lines),
        Err(RecipeValidationError::NoIngredients)
    );
}

#[rstest]
#[case(0)]
#[case(-5)]
fn amounts_below_one_are_rejected(#[case] amount: i64) {
    let err = IngredientSet::from_input(Some(vec![line(1, 10), line(7, amount)]))
        .expect_err("bad amount");
    assert_eq!(
        err,
        RecipeValidationError::AmountTooSmall {
            ingredient_id: IngredientId::new(7)
        }
    );
    assert_eq!(err.field(), "ingredients");
}

#[rstest]
fn duplicate_ingredients_are_rejected() {
    let err = IngredientSet::from_input(Some(vec![line(3, 1), line(4, 1), line(3, 2)]))
        .expect_err("duplicate");
    assert_eq!(
        err,
        RecipeValidationError::DuplicateIngredient {
            ingredient_id: IngredientId::new(3)
        }
    );
}

#[rstest]
fn ingredient_ids_are_sorted() {
    let set = IngredientSet::from_input(Some(vec![line(9, 1), line(2, 1), line(5, 1)]))
        .expect("valid set");
    assert_eq!(
        set.ingredient_ids(),
        vec![IngredientId::new(2), IngredientId::new(5), IngredientId::new(9)]
    );
    assert_eq!(set.lines().first().map(|l| l.ingredient_id.get()), Some(9));
}

#[rstest]
#[case(0)]
#[case(-1)]
fn cooking_time_must_be_positive(#[case] minutes: i64) {
    assert_eq!(
        CookingTime::new(minutes),
        Err(RecipeValidationError::CookingTimeTooSmall)
    );
}

#[rstest]
fn draft_accepts_complete_input(complete_input: RecipeInput) {
    let draft = RecipeDraft::try_from_input(complete_input).expect("valid draft");
    assert_eq!(draft.name.as_ref(), "Pancakes");
    assert_eq!(draft.cooking_time.get(), 20);
    assert_eq!(draft.image.extension(), "png");
    assert_eq!(draft.ingredients.lines().len(), 2);
}

#[rstest]
fn draft_requires_an_image(mut complete_input: RecipeInput) {
    complete_input.image = None;
    let err = RecipeDraft::try_from_input(complete_input).expect_err("image required");
    assert_eq!(err, RecipeValidationError::MissingImage);
    assert_eq!(err.field(), "image");
}

#[rstest]
fn draft_reports_blank_name(mut complete_input: RecipeInput) {
    complete_input.name = Some("   ".to_owned());
    let err = RecipeDraft::try_from_input(complete_input).expect_err("blank name");
    assert_eq!(err.field(), "name");
}

#[rstest]
fn changes_keep_absent_scalars(mut complete_input: RecipeInput) {
    complete_input.name = None;
    complete_input.image = None;
    let changes = RecipeChanges::try_from_input(complete_input).expect("valid changes");
    assert!(changes.name.is_none());
    assert!(changes.image.is_none());
    assert_eq!(changes.cooking_time.map(CookingTime::get), Some(20));
}

#[rstest]
fn changes_require_ingredients(mut complete_input: RecipeInput) {
    complete_input.ingredients = None;
    assert_eq!(
        RecipeChanges::try_from_input(complete_input),
        Err(RecipeValidationError::NoIngredients)
    );
}

#[rstest]
fn image_errors_keep_their_code(mut complete_input: RecipeInput) {
    complete_input.image = Some("data:image/png;base64,@@".to_owned());
    let err = RecipeChanges::try_from_input(complete_input).expect_err("bad image");
    assert_eq!(err.field(), "image");
    assert_eq!(err.code(), "invalid_base64");
}

#[rstest]
#[case(Some("1"), Some(true))]
#[case(Some("0"), Some(false))]
#[case(Some("yes"), None)]
#[case(None, None)]
fn relation_flags_parse_leniently(#[case] raw: Option<&str>, #[case] expected: Option<bool>) {
    assert_eq!(RecipeFilter::parse_flag(raw), expected);
}

#[rstest]
fn relation_filters_need_a_viewer() {
    let viewer = UserId::random();
    let filter = RecipeFilter {
        is_in_shopping_cart: Some(true),
        ..RecipeFilter::default()
    };
    assert_eq!(filter.clone().scoped_to(None).is_in_shopping_cart, None);
    let scoped = filter.scoped_to(Some(viewer.clone()));
    assert_eq!(scoped.is_in_shopping_cart, Some(true));
    assert_eq!(scoped.viewer, Some(viewer));
}

#[rstest]
fn oversized_values_are_rejected() {
    let too_big = i64::from(POSITIVE_INT_MAX) + 1;
    assert_eq!(
        CookingTime::new(too_big),
        Err(RecipeValidationError::CookingTimeTooLarge)
    );
    assert_eq!(
        IngredientSet::from_input(Some(vec![line(1, too_big)])),
        Err(RecipeValidationError::AmountTooLarge {
            ingredient_id: IngredientId::new(1)
        })
    );
}
