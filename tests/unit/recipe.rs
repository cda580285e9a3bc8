use super::*;
use crate::{
    compose::orchestrator::ComposeOutcome, foundation::color::Rgb8,
    outline::model::OutlineDescriptor, source::InMemorySource,
};

const RECIPE: &str = r##"{
    "canvas": 120,
    "seed": 9,
    "compose": { "parallel": true, "threads": 2 },
    "layers": {
        "background": { "kind": "solid", "color": "#202830" },
        "body": { "kind": "solid", "outline": "body", "color": "#c05020" },
        "pattern": { "kind": "mosaic", "outline": "body", "color": "#40a080", "sites": 10 },
        "swirl": { "kind": "spiral", "outline": "body", "color": "#101010", "kinds": ["archimedean"] }
    }
}"##;

fn source() -> Arc<dyn OutlineSource> {
    Arc::new(InMemorySource::new().with(
        "body",
        OutlineDescriptor::new("M20,20 L100,20 L100,100 L20,100 Z")
            .with_sub_path("shadow", "M20,70 L100,70 L100,100 L20,100 Z"),
    ))
}

#[test]
fn parses_with_defaults() {
    let recipe = Recipe::from_json_str(RECIPE).unwrap();
    assert_eq!(recipe.canvas, 120);
    assert_eq!(recipe.seed, 9);
    assert_eq!(recipe.oracle, OracleKind::Winding);
    assert!(!recipe.optimize.enabled);
    assert_eq!(recipe.layers.len(), 4);
    match &recipe.layers["pattern"] {
        LayerSpec::Mosaic(m) => {
            assert_eq!(m.sites, 10);
            assert_eq!(m.hue_jitter, 18.0);
        }
        other => panic!("unexpected spec {other:?}"),
    }

    let empty = Recipe::from_json_str("{}").unwrap();
    assert_eq!(empty.canvas, Canvas::DEFAULT_SIZE);
    assert!(empty.layers.is_empty());
    assert_eq!(empty.canonical_order().unwrap(), CanonicalOrder::default());
}

#[test]
fn serializes_layer_kind_tags() {
    let recipe = Recipe::from_json_str(RECIPE).unwrap();
    let text = recipe.to_json_string().unwrap();
    assert!(text.contains(r#""kind": "mosaic""#));
    assert!(text.contains(r#""kind": "spiral""#));
    assert!(!text.contains(r#""order""#));
    assert_eq!(Recipe::from_json_str(&text).unwrap().layers.len(), 4);
}

#[test]
fn rejects_bad_recipes() {
    let cases = [
        r#"{"canvas":0}"#,
        r#"{"compose":{"threads":0}}"#,
        r#"{"optimize":{"enabled":true,"timeout_ms":0}}"#,
        r#"{"order":["a","a"]}"#,
        r##"{"layers":{"wings":{"kind":"solid","color":"#000000"}}}"##,
        r##"{"layers":{"swirl":{"kind":"spiral","outline":"","color":"#000000"}}}"##,
        r##"{"layers":{"swirl":{"kind":"spiral","outline":"b","color":"#000000","steps":1}}}"##,
        r##"{"layers":{"pattern":{"kind":"mosaic","outline":"b","color":"#000000","sites":0}}}"##,
        r##"{"layers":{"body":{"kind":"solid","outline":" ","color":"#000000"}}}"##,
    ];
    for text in cases {
        assert!(
            matches!(Recipe::from_json_str(text), Err(TraitforgeError::Validation(_))),
            "{text}"
        );
    }
    assert!(matches!(
        Recipe::from_json_str(r#"{"layers":{"body":{"kind":"hologram"}}}"#),
        Err(TraitforgeError::Serde(_))
    ));
}

#[test]
fn custom_order_admits_its_own_names() {
    let recipe = RecipeBuilder::new()
        .order(["sky", "ground"])
        .layer(
            "sky",
            LayerSpec::Solid(SolidTrait {
                outline: None,
                color: Rgb8::new(0, 0, 255),
                shading: Default::default(),
            }),
        )
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(recipe.canonical_order().unwrap().names(), ["sky", "ground"]);
    assert_eq!(recipe.registry().unwrap().names().collect::<Vec<_>>(), vec!["sky"]);
}

#[test]
fn builder_rejects_duplicate_layers() {
    let spec = LayerSpec::Spiral(SpiralTrait::new("body", Rgb8::new(0, 0, 0)));
    let builder = RecipeBuilder::new().layer("swirl", spec.clone()).unwrap();
    assert!(matches!(
        builder.layer("swirl", spec),
        Err(TraitforgeError::Validation(_))
    ));
}

#[test]
fn orchestrator_runs_every_layer() {
    let recipe = Recipe::from_json_str(RECIPE).unwrap();
    let report = recipe
        .orchestrator(source())
        .unwrap()
        .compose(["swirl", "pattern", "body", "background"])
        .unwrap();
    match &report.outcome {
        ComposeOutcome::Composed(c) => {
            assert_eq!(c.names(), vec!["background", "body", "pattern", "swirl"]);
            assert_eq!(c.size(), 120);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(report.failed().is_empty());
}
