use std::fs;
use color_scale::{pipeline, Config, DeltaE, Error, Filter, Method};
use tempfile::TempDir;

const CATALOG: &str = "\
name;L;a;b
Folio-020;22,0;3,0;-6,0
Folio-040;38,5;2,8;-5,1
Folio-100;53,0;2,5;-4,0
Folio-150;61,0;2,0;-3,5
Folio-200;77,5;1,5;-2,5
Folio-300;92,5;1,0;-1,8
;50;0;0
Folio-999;n/a;0;0
";

fn example_config() -> Config {
    Config::from_toml(r#"
        [gradient]
        start = [22.26, 3.29, -5.94]
        end = [92.52, 1.05, -1.82]
        steps = 10
    "#).unwrap()
}

#[test]
fn scale_matches_the_documented_example() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("catalog.csv");
    fs::write(&input, CATALOG).unwrap();
    let config = example_config();
    let catalog = config.catalog.load(&input).unwrap();
    assert_eq!(catalog.len(), 6);

    let steps = pipeline::scale(&config, &catalog).unwrap();
    assert_eq!(steps.len(), 10);
    assert_eq!(steps[0].target, config.start());
    assert_eq!(steps[9].target, config.end());
    let step5 = &steps[4];
    assert_eq!(step5.index, 5);
    assert!((step5.target.l - 53.49).abs() < 0.01);
    assert_eq!(step5.entry.name, "Folio-100");
    assert!(step5.delta_e > 0. && step5.delta_e < 1.);
    assert_eq!(steps[0].entry.name, "Folio-020");
    assert_eq!(steps[9].entry.name, "Folio-300");
}

#[test]
fn run_writes_the_report() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("catalog.csv");
    let output = dir.path().join("color_scale.html");
    fs::write(&input, CATALOG).unwrap();

    let n = pipeline::run(&example_config(), &input, &output).unwrap();
    assert_eq!(n, 10);
    let html = fs::read_to_string(&output).unwrap();
    assert_eq!(html.matches("class=\"swatch\"").count(), 20);
    assert!(html.contains("<th>Gradient</th><th>Catalog</th>"));
    assert!(html.contains("Closest match: Folio-100 (dE2000: "));
    assert!(html.contains("<b>Step 10</b>"));
}

#[test]
fn filters_and_methods_from_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("catalog.csv");
    fs::write(&input, CATALOG).unwrap();
    let mut config = example_config();
    config.gradient.method = color_scale::gradient::Interpolation::Alternating;
    config.matching.filters = vec![Filter::Lightness { tolerance: 0.1 },
                                   Filter::Chroma { tolerance: 5. }];
    assert!(matches!(config.method(), Method::Alternating(_)));
    let catalog = config.catalog.load(&input).unwrap();
    let steps = pipeline::scale(&config, &catalog).unwrap();
    assert_eq!(steps.len(), 10);
    assert_eq!(steps[9].target, config.end());
    // The lightness stage empties the set for most steps and is
    // skipped: every step still has a match.
    assert!(steps.iter().all(|s| catalog.iter().any(|e| e == s.entry)));
}

#[test]
fn report_is_labelled_with_the_metric() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("catalog.csv");
    fs::write(&input, CATALOG).unwrap();
    let mut config = example_config();
    config.matching.metric = DeltaE::Cie76;
    config.matching.filters = vec![Filter::Hue { tolerance: 20. }];
    let matcher = config.matcher();
    assert_eq!(matcher.metric(), DeltaE::Cie76);
    assert_eq!(matcher.filters(), config.matching.filters.as_slice());

    let catalog = config.catalog.load(&input).unwrap();
    let steps = pipeline::scale(&config, &catalog).unwrap();
    let mut html = Vec::new();
    pipeline::report(&matcher, &steps).write_to(&mut html).unwrap();
    let html = String::from_utf8(html).unwrap();
    assert!(html.contains("(dE76: "));
    assert!(!html.contains("dE2000"));
}

#[test]
fn missing_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.csv");
    let output = dir.path().join("color_scale.html");
    let err = pipeline::run(&Config::default(), &input, &output).unwrap_err();
    assert!(matches!(err, Error::NotFound(ref p) if *p == input));
    assert!(!output.exists());
}

#[test]
fn empty_catalog_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("catalog.csv");
    let output = dir.path().join("color_scale.html");
    fs::write(&input, "name;L;a;b\n;1;2;3\nX;;1;1\n").unwrap();
    let err = pipeline::run(&Config::default(), &input, &output).unwrap_err();
    assert!(matches!(err, Error::EmptyCatalog));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
