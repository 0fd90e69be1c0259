use base64::Engine as _;
use cardsmith::{
    AddTemplateCommand, CardBlockRenderer, CardError, CpuBackend, FontLibrary, MemoryImageResolver,
    MemorySink, PreparedImage, RegisterOutcome, RenderSettings, TemplateStore,
};

const TEMPLATE_DOC: &str = "# Frames\n\n```cardTemplate\n{\"name\":\"Plain\",\n \"background\":\"frame.png\",\n \"attributes\":[]}\n```\n";

fn registered_store() -> TemplateStore {
    let mut store = TemplateStore::new();
    let mut sink = MemorySink::default();
    let out = AddTemplateCommand
        .run(&mut store, &mut sink, TEMPLATE_DOC)
        .unwrap();
    assert!(matches!(out, RegisterOutcome::Registered { .. }));
    store
}

fn backend() -> CpuBackend {
    CpuBackend::new(RenderSettings::default(), FontLibrary::empty())
}

fn assets() -> MemoryImageResolver {
    let mut assets = MemoryImageResolver::new();
    assets.insert("frame.png", PreparedImage::solid(2, 3, [10, 20, 30, 255]));
    assets
}

#[test]
fn command_metadata() {
    assert_eq!(AddTemplateCommand::ID, "add-card-template");
    assert_eq!(AddTemplateCommand::NAME, "Add card template");
    assert!(AddTemplateCommand.check(TEMPLATE_DOC));
}

#[test]
fn empty_block_renders_nothing() {
    let store = registered_store();
    let view = CardBlockRenderer
        .render("", &store, &mut backend(), &mut assets())
        .unwrap();
    assert_eq!(view, None);
}

#[test]
fn unknown_template_has_only_source_row() {
    let store = registered_store();
    let source = r#"{"templateName":"Missing","attributes":[]}"#;
    let view = CardBlockRenderer
        .render(source, &store, &mut backend(), &mut assets())
        .unwrap()
        .unwrap();
    assert_eq!(view.image_data_uri, None);

    let html = view.to_html();
    assert_eq!(html.matches("<tr>").count(), 1);
    assert!(html.contains("&quot;templateName&quot;"));
    assert!(!html.contains("<img"));
}

#[test]
fn known_template_adds_png_image_row() {
    let store = registered_store();
    let source = r#"{"templateName":"Plain","attributes":[{"type":"nothing","text":"x"}]}"#;
    let view = CardBlockRenderer
        .render(source, &store, &mut backend(), &mut assets())
        .unwrap()
        .unwrap();

    let uri = view.image_data_uri.as_deref().unwrap();
    let body = uri.strip_prefix("data:image/png;base64,").unwrap();
    let png = base64::engine::general_purpose::STANDARD
        .decode(body)
        .unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (700, 1050));
    let px = img.get_pixel(350, 525).0;
    assert!(px[0].abs_diff(10) <= 2 && px[1].abs_diff(20) <= 2 && px[2].abs_diff(30) <= 2);

    let html = view.to_html();
    assert_eq!(html.matches("<tr>").count(), 2);
    assert!(html.contains("<img src=\"data:image/png;base64,"));
}

#[test]
fn malformed_card_json_is_parse_error() {
    let store = registered_store();
    let out = CardBlockRenderer.render("{not json", &store, &mut backend(), &mut assets());
    assert!(matches!(out, Err(CardError::Parse(_))));
}

#[test]
fn missing_instance_attributes_is_validation_error() {
    let store = registered_store();
    let out = CardBlockRenderer.render(
        r#"{"templateName":"Plain"}"#,
        &store,
        &mut backend(),
        &mut assets(),
    );
    assert!(matches!(out, Err(CardError::Validation(_))));
}

#[test]
fn malformed_template_registers_then_fails_to_render() {
    let mut store = TemplateStore::new();
    let mut sink = MemorySink::default();
    let doc = "```cardTemplate\n{\"name\":\"Odd\",\"attributes\":{\"oops\":1}}\n```";
    let out = AddTemplateCommand.run(&mut store, &mut sink, doc).unwrap();
    assert_eq!(
        out,
        RegisterOutcome::Registered {
            name: "Odd".to_string(),
            replaced: false
        }
    );
    assert!(sink.saved.as_deref().unwrap().contains("\"oops\""));

    let out = CardBlockRenderer.render(
        r#"{"templateName":"Odd","attributes":[{"type":"hp","text":"7"}]}"#,
        &store,
        &mut backend(),
        &mut assets(),
    );
    assert!(matches!(out, Err(CardError::Parse(_))));
}

#[test]
fn wrong_background_type_fails_at_render_time() {
    let mut store = TemplateStore::new();
    let mut sink = MemorySink::default();
    let doc = "```cardTemplate\n{\"name\":\"Odd\",\"background\":42,\"attributes\":[]}\n```";
    assert!(matches!(
        AddTemplateCommand.run(&mut store, &mut sink, doc).unwrap(),
        RegisterOutcome::Registered { .. }
    ));

    let out = CardBlockRenderer.render(
        r#"{"templateName":"Odd","attributes":[]}"#,
        &store,
        &mut backend(),
        &mut assets(),
    );
    assert!(matches!(out, Err(CardError::Parse(_))));
}
