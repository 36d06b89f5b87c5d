use choropleth::palette::Color;
use choropleth::present::{VALUE_KEY, prepare_feature_properties};
use choropleth::template::{TemplateContext, format_simple_template};
use choropleth::join::prepare_data;
use choropleth::{FeatureCollection, RenderOptions, Row, render_layer};
use serde_json::{Value, json};

fn countries() -> FeatureCollection {
    serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"iso_a2": "US", "name": "United States", "name_long": "United States of America", "pop_est": 328239523},
                "geometry": {"type": "Polygon", "coordinates": [[[-125.0, 25.0], [-66.0, 25.0], [-66.0, 49.0], [-125.0, 25.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"iso_a2": "FR", "name": "France", "name_long": "France"},
                "geometry": {"type": "Polygon", "coordinates": [[[-5.0, 42.0], [8.0, 42.0], [8.0, 51.0], [-5.0, 42.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"iso_a2": "DE", "name": "Germany", "name_long": "Germany"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[6.0, 47.0], [15.0, 47.0], [15.0, 55.0], [6.0, 47.0]]]]}
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": null
            }
        ]
    }))
    .unwrap()
}

fn rows(v: Value) -> Vec<Row> {
    serde_json::from_value(v).unwrap()
}

fn options() -> RenderOptions {
    RenderOptions {
        code_column: "code".into(),
        code_type: "iso_a2".into(),
        value_column: "gdp".into(),
        steps: 2,
        ..RenderOptions::default()
    }
}

#[test]
fn features_are_styled_by_bucket() {
    let out = render_layer(
        &countries(),
        &rows(json!([
            {"code": "US", "gdp": 100},
            {"code": "fr", "gdp": "20"},
            {"code": "XX", "gdp": 5000}
        ])),
        &options(),
    )
    .unwrap();

    assert_eq!(out.features.len(), 4);
    // XX is not on the map and does not stretch the scale.
    assert_eq!(out.scale.samples, 2);
    assert_eq!(out.scale.limits, vec![20.0, 60.0, 100.0]);

    let defaults = RenderOptions::default().colors;
    let [us, fr, de, blank] = &out.features[..] else {
        panic!("expected four features");
    };
    assert_eq!(us.value, Some(100.0));
    assert_eq!(us.style.fill_color, defaults.max);
    assert_eq!(fr.style.fill_color, defaults.min);
    assert_eq!(de.value, None);
    assert_eq!(de.style.fill_color, defaults.no_value);
    assert_eq!(blank.code, None);
    assert_eq!(blank.style.fill_color, defaults.no_value);

    assert_eq!(us.style.color, defaults.borders);
    assert_eq!(us.style.weight, 1);
    assert_eq!(us.hover_style.weight, 2);
    assert_ne!(us.hover_style.fill_color, us.style.fill_color);
    assert_eq!(out.background, defaults.background);
}

#[test]
fn tooltips_and_popups_use_feature_and_row_fields() {
    let mut opts = options();
    opts.tooltip.template = "{{ @@name }}: {{ @@value }} ({{ note }})".into();
    opts.popup.enabled = false;
    let out = render_layer(
        &countries(),
        &rows(json!([{"code": "US", "gdp": 1234.5, "note": "est."}])),
        &opts,
    )
    .unwrap();

    let us = &out.features[0];
    assert_eq!(us.formatted_value, "1,234.50");
    assert_eq!(us.tooltip.as_deref(), Some("United States: 1,234.50 (est.)"));
    assert_eq!(us.popup, None);

    let fr = &out.features[1];
    assert_eq!(fr.formatted_value, "N/A");
    assert_eq!(fr.tooltip.as_deref(), Some("France: N/A ()"));
}

#[test]
fn default_popup_names_the_region() {
    let out = render_layer(
        &countries(),
        &rows(json!([{"code": "DE", "gdp": 3}])),
        &options(),
    )
    .unwrap();
    let popup = out.features[2].popup.as_deref().unwrap();
    assert!(popup.contains("<b>Germany</b>"));
    assert!(popup.contains("<b>3.00</b>"));
}

#[test]
fn legend_labels_are_formatted_ranges() {
    let out = render_layer(
        &countries(),
        &rows(json!([{"code": "US", "gdp": 1000}, {"code": "FR", "gdp": 3000}])),
        &options(),
    )
    .unwrap();
    let labels: Vec<&str> = out.legend.items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, ["1,000.00 - 2,000.00", "2,000.00 - 3,000.00"]);
    assert!(out.legend.visible);
}

#[test]
fn no_data_renders_everything_as_no_value() {
    let out = render_layer(&countries(), &[], &options()).unwrap();
    assert!(out.scale.is_empty());
    let gray = RenderOptions::default().colors.no_value;
    assert!(out.features.iter().all(|f| f.style.fill_color == gray));
}

#[test]
fn data_bounds_cover_every_geometry() {
    let out = render_layer(&countries(), &[], &options()).unwrap();
    let b = out.data_bounds.unwrap();
    assert_eq!((b.south_west.lat, b.south_west.lng), (25.0, -125.0));
    assert_eq!((b.north_east.lat, b.north_east.lng), (55.0, 15.0));
}

#[test]
fn invalid_steps_are_rejected() {
    let mut opts = options();
    opts.steps = 0;
    assert!(render_layer(&countries(), &[], &opts).is_err());
}

#[test]
fn custom_colors_flow_into_styles() {
    let mut opts = options();
    opts.colors.no_value = Color::rgb(1, 2, 3);
    opts.colors.borders = "Black".parse().unwrap();
    let out = render_layer(&countries(), &[], &opts).unwrap();
    assert_eq!(out.features[0].style.fill_color, Color::rgb(1, 2, 3));
    assert_eq!(out.features[0].style.color, Color::rgb(0, 0, 0));
}

#[test]
fn feature_context_has_prefixed_properties_and_row_columns() {
    let fc = countries();
    let data = prepare_data(
        &rows(json!([{"code": "US", "gdp": 7, "region": "Americas"}])),
        "code",
        "gdp",
    );
    let ctx: TemplateContext = prepare_feature_properties(&fc.features[0], "7.00", &data, "iso_a2");
    assert_eq!(ctx["@@name"], "United States");
    assert_eq!(ctx["@@pop_est"], "328239523");
    assert_eq!(ctx[VALUE_KEY], "7.00");
    assert_eq!(ctx["region"], "Americas");
    assert_eq!(ctx["gdp"], "7");
    assert_eq!(
        format_simple_template("{{region}}/{{ @@iso_a2 }}/{{ nope }}", &ctx),
        "Americas/US/"
    );

    let ctx = prepare_feature_properties(&fc.features[1], "N/A", &data, "iso_a2");
    assert!(!ctx.contains_key("region"));
}

#[test]
fn output_serializes_to_json() {
    let out = render_layer(
        &countries(),
        &rows(json!([{"code": "US", "gdp": 1}])),
        &options(),
    )
    .unwrap();
    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["background"], json!("#ffffff"));
    assert_eq!(v["features"][0]["style"]["fill_color"], json!("#002fb4"));
    assert!(v["features"][0].get("context").is_none());
}
