use std::{fs, time::Duration};

use gridforge_catalog::{load_blueprints, load_catalog, save_blueprint, CatalogError};
use gridforge_core::{Blueprint, BlueprintPart, Catalog, GridPoint};
use tempfile::tempdir;

const COMPONENTS: &str = r#"{
    "Drill": { "color": [200, 50, 50], "valid_tile_types": ["resource"] },
    "Smelter": { "color": [180, 120, 40], "size": [2, 2] }
}"#;

const RECIPES: &str = r#"{
    "Smelter": { "inputs": { "iron_ore": 1 }, "outputs": { "iron_plate": 1 }, "process_time": 250 }
}"#;

#[test]
fn catalog_loads_components_and_recipes() {
    let dir = tempdir().expect("temporary directory");
    fs::write(dir.path().join("components.json"), COMPONENTS).expect("write components");
    fs::write(dir.path().join("buildings.json"), RECIPES).expect("write recipes");

    let catalog = load_catalog(dir.path()).expect("catalog loads");

    assert_eq!(catalog.components().count(), 2);
    assert!(catalog.component("Drill").is_some());
    assert_eq!(
        catalog.recipe("Smelter").map(|recipe| recipe.process_time),
        Some(Duration::from_millis(250)),
        "process_time is expressed in milliseconds",
    );
}

#[test]
fn missing_recipe_file_yields_no_recipes() {
    let dir = tempdir().expect("temporary directory");
    fs::write(dir.path().join("components.json"), COMPONENTS).expect("write components");

    let catalog = load_catalog(dir.path()).expect("catalog loads");
    assert_eq!(catalog.recipe_count(), 0);
}

#[test]
fn missing_component_file_is_an_error() {
    let dir = tempdir().expect("temporary directory");
    let error = load_catalog(dir.path()).expect_err("components are required");
    assert!(matches!(error, CatalogError::Io { .. }), "{error}");
}

#[test]
fn malformed_component_file_is_a_parse_error() {
    let dir = tempdir().expect("temporary directory");
    fs::write(dir.path().join("components.json"), "{ not json").expect("write components");
    let error = load_catalog(dir.path()).expect_err("malformed components");
    assert!(matches!(error, CatalogError::Parse { .. }), "{error}");
}

#[test]
fn blueprint_directory_skips_empty_and_malformed_files() {
    let dir = tempdir().expect("temporary directory");
    fs::write(
        dir.path().join("a_valid.json"),
        r#"{ "name": "Pair", "components": [ { "type": "Drill", "pos": [0, 0] }, { "type": "Drill", "pos": [1, 0] } ] }"#,
    )
    .expect("write valid");
    fs::write(
        dir.path().join("b_empty.json"),
        r#"{ "name": "Empty", "components": [] }"#,
    )
    .expect("write empty");
    fs::write(dir.path().join("c_broken.json"), "{ \"name\": ").expect("write malformed");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("write unrelated");

    let blueprints = load_blueprints(dir.path(), &Catalog::default());

    assert_eq!(blueprints.len(), 1, "only the valid blueprint survives");
    assert_eq!(blueprints[0].name(), "Pair");
    assert_eq!(blueprints[0].parts().len(), 2);
}

#[test]
fn blueprints_load_in_file_name_order() {
    let dir = tempdir().expect("temporary directory");
    for (file, name) in [("b.json", "Second"), ("a.json", "First"), ("c.json", "Third")] {
        fs::write(
            dir.path().join(file),
            format!(r#"{{ "name": "{name}", "components": [ {{ "type": "Drill", "pos": [0, 0] }} ] }}"#),
        )
        .expect("write blueprint");
    }

    let names: Vec<String> = load_blueprints(dir.path(), &Catalog::default())
        .iter()
        .map(|blueprint| blueprint.name().to_owned())
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[test]
fn missing_blueprint_directory_yields_nothing() {
    let dir = tempdir().expect("temporary directory");
    let blueprints = load_blueprints(&dir.path().join("absent"), &Catalog::default());
    assert!(blueprints.is_empty());
}

#[test]
fn saved_blueprints_are_normalized_and_reloadable() {
    let dir = tempdir().expect("temporary directory");
    let target = dir.path().join("blueprints");
    let blueprint = Blueprint::new(
        "Iron Line",
        vec![
            BlueprintPart::new("Drill", GridPoint::new(3, 4)),
            BlueprintPart::new("Smelter", GridPoint::new(5, 4)),
        ],
    );

    let path = save_blueprint(&target, &blueprint).expect("blueprint saves");
    assert_eq!(path, target.join("iron-line.json"));

    let loaded = load_blueprints(&target, &Catalog::default());
    assert_eq!(loaded, vec![blueprint.normalized()]);
    assert_eq!(loaded[0].parts()[1].offset, GridPoint::new(2, 0));
}

#[test]
fn empty_blueprints_are_not_saved() {
    let dir = tempdir().expect("temporary directory");
    let error = save_blueprint(dir.path(), &Blueprint::new("Nothing", Vec::new()))
        .expect_err("empty blueprint");
    assert!(matches!(error, CatalogError::EmptyBlueprint { .. }));
    assert_eq!(
        fs::read_dir(dir.path()).expect("readable").count(),
        0,
        "nothing is written"
    );
}

#[test]
fn saving_never_replaces_an_existing_blueprint() {
    let dir = tempdir().expect("temporary directory");
    let first = Blueprint::new(
        "Blueprint 1",
        vec![
            BlueprintPart::new("Drill", GridPoint::new(0, 0)),
            BlueprintPart::new("Drill", GridPoint::new(1, 0)),
            BlueprintPart::new("Drill", GridPoint::new(2, 0)),
        ],
    );
    let path = save_blueprint(dir.path(), &first).expect("first save");

    let second = Blueprint::new(
        "Blueprint 1",
        vec![BlueprintPart::new("Smelter", GridPoint::new(0, 0))],
    );
    let error = save_blueprint(dir.path(), &second).expect_err("file already exists");
    assert!(matches!(error, CatalogError::AlreadyExists { path: ref existing } if *existing == path));

    let loaded = load_blueprints(dir.path(), &Catalog::default());
    assert_eq!(loaded, vec![first], "the earlier layout is untouched");
}

#[test]
fn unnamed_blueprints_take_their_file_stem() {
    let dir = tempdir().expect("temporary directory");
    fs::write(
        dir.path().join("belt-loop.json"),
        r#"{ "components": [ { "type": "Belt", "pos": [0, 0] } ] }"#,
    )
    .expect("write blueprint");

    let blueprints = load_blueprints(dir.path(), &Catalog::default());
    assert_eq!(blueprints.len(), 1);
    assert_eq!(blueprints[0].name(), "belt-loop");
}
