use cardsmith::{
    Affine, CardAttribute, CardTemplate, Canvas, DrawOp, ImageLayer, Point, TemplateBlock,
    compile_card, parse_instance, parse_template_block, text::font::FontFamily,
};

fn text_ops(ops: &[DrawOp]) -> Vec<(&str, &str, Point, Affine)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                attribute,
                text,
                anchor,
                transform,
                ..
            } => Some((attribute.as_str(), text.as_str(), *anchor, *transform)),
            DrawOp::Image { .. } => None,
        })
        .collect()
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn end_to_end_example_plans_one_text_and_no_layers() {
    let doc = "```cardTemplate\n{\"name\":\"Fire\",\"background\":\"\",\"attributes\":[{\"name\":\"hp\",\"x\":10,\"y\":20,\"styling\":\"16px sans\"}]}\n```";
    let TemplateBlock::Parsed(template) = parse_template_block(doc).unwrap() else {
        panic!("template should parse");
    };
    let instance = parse_instance(r#"{"templateName":"Fire","attributes":[{"type":"hp","text":"7"}]}"#)
        .unwrap()
        .unwrap();

    let plan = compile_card(&template, &instance, Canvas::CARD).unwrap();
    assert_eq!(plan.ops.len(), 1);
    let DrawOp::Text {
        text,
        font,
        anchor,
        transform,
        ..
    } = &plan.ops[0]
    else {
        panic!("expected a text op");
    };
    assert_eq!(text, "7");
    assert_eq!(*anchor, Point::new(10.0, 20.0));
    assert_eq!(*transform, Affine::IDENTITY);
    assert_eq!(font.size_px, 16.0);
    assert_eq!(font.families, vec![FontFamily::SansSerif]);
}

#[test]
fn rotation_does_not_carry_to_next_attribute() {
    let template = CardTemplate::new("Spin")
        .with_attribute(CardAttribute::new("a", 100.0, 100.0, "20px serif").with_rotation(90.0))
        .with_attribute(CardAttribute::new("b", 300.0, 400.0, "20px serif"));
    let instance = parse_instance(
        r#"{"templateName":"Spin","attributes":[{"type":"a","text":"turned"},{"type":"b","text":"level"}]}"#,
    )
    .unwrap()
    .unwrap();

    let plan = compile_card(&template, &instance, Canvas::CARD).unwrap();
    let ops = text_ops(&plan.ops);
    assert_eq!(ops.len(), 2);

    let (_, _, anchor_a, rot_a) = ops[0];
    assert!(close(rot_a * anchor_a, anchor_a));
    assert!(close(
        rot_a * Point::new(110.0, 100.0),
        Point::new(100.0, 110.0)
    ));

    let (name_b, _, _, rot_b) = ops[1];
    assert_eq!(name_b, "b");
    assert_eq!(rot_b, Affine::IDENTITY);
}

#[test]
fn unknown_types_are_skipped_silently() {
    let template = CardTemplate::new("Fire")
        .with_attribute(CardAttribute::new("hp", 10.0, 20.0, "16px sans"));
    let instance = parse_instance(
        r#"{"templateName":"Fire","attributes":[{"type":"mana","text":"3"},{"type":"hp","text":"7"},{"type":"flavor","text":"hot"}]}"#,
    )
    .unwrap()
    .unwrap();

    let plan = compile_card(&template, &instance, Canvas::CARD).unwrap();
    let ops = text_ops(&plan.ops);
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].1, "7");
}

#[test]
fn duplicate_attribute_names_resolve_to_last() {
    let template = CardTemplate::new("Dup")
        .with_attribute(CardAttribute::new("hp", 1.0, 1.0, "10px serif"))
        .with_attribute(CardAttribute::new("hp", 50.0, 60.0, "10px serif"));
    let instance = parse_instance(r#"{"templateName":"Dup","attributes":[{"type":"hp","text":"9"}]}"#)
        .unwrap()
        .unwrap();

    let plan = compile_card(&template, &instance, Canvas::CARD).unwrap();
    assert_eq!(text_ops(&plan.ops)[0].2, Point::new(50.0, 60.0));
}

#[test]
fn layers_precede_text_with_art_first() {
    let template = CardTemplate::new("Fire")
        .with_background("frame.png")
        .with_attribute(CardAttribute::new("hp", 10.0, 20.0, "16px sans"));
    let instance = parse_instance(
        r#"{"templateName":"Fire","art":"dragon.png","attributes":[{"type":"hp","text":"7"}]}"#,
    )
    .unwrap()
    .unwrap();

    let plan = compile_card(&template, &instance, Canvas::CARD).unwrap();
    let kinds: Vec<_> = plan
        .ops
        .iter()
        .map(|op| match op {
            DrawOp::Image { layer, source, .. } => format!("{layer:?}:{source}"),
            DrawOp::Text { text, .. } => format!("Text:{text}"),
        })
        .collect();
    assert_eq!(kinds, ["Art:dragon.png", "Background:frame.png", "Text:7"]);
    assert!(matches!(
        plan.ops[0],
        DrawOp::Image {
            layer: ImageLayer::Art,
            ..
        }
    ));
}
