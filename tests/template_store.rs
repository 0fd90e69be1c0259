use cardsmith::{
    AddTemplateCommand, CardAttribute, CardError, CardResult, CardTemplate, JsonFileSink,
    RegisterOutcome, TemplateSink, TemplateStore, Upsert,
};

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "cardsmith_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn fire() -> CardTemplate {
    CardTemplate::new("Fire")
        .with_background("bg/fire.png")
        .with_attribute(CardAttribute::new("title", 40.0, 80.0, "bold 32px serif"))
        .with_attribute(CardAttribute::new("hp", 600.0, 80.0, "24px sans").with_rotation(-15.0))
}

#[test]
fn upsert_twice_keeps_one_entry_in_place() {
    let mut store = TemplateStore::from_templates(vec![CardTemplate::new("A"), fire()]);
    let before = store.clone();

    let first = store.upsert(fire());
    let second = store.upsert(fire());
    assert_eq!(first.index(), 1);
    assert_eq!(second.index(), 1);
    assert_eq!(store, before);
}

#[test]
fn upsert_replaces_without_appending() {
    let mut store =
        TemplateStore::from_templates(vec![CardTemplate::new("A"), CardTemplate::new("B")]);
    let out = store.upsert(CardTemplate::new("A").with_background("x"));

    assert!(matches!(out, Upsert::Replaced { index: 0, .. }));
    assert_eq!(
        store.templates(),
        [
            CardTemplate::new("A").with_background("x"),
            CardTemplate::new("B")
        ]
    );
}

#[test]
fn file_sink_round_trips_collection() {
    let tmp = temp_dir("store_round_trip");
    let path = tmp.join("nested").join("templates.json");

    let store = TemplateStore::from_templates(vec![fire(), CardTemplate::new("Water")]);
    let mut sink = JsonFileSink::new(&path);
    store.save_to(&mut sink).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["data"][0]["name"], "Fire");
    assert_eq!(json["data"][0]["attributes"][1]["rotation"], -15.0);

    let loaded = TemplateStore::load_json(&path).unwrap();
    assert_eq!(loaded, store);
    assert!(!path.with_extension("json.tmp").exists());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_file_and_missing_data_key_load_empty() {
    let tmp = temp_dir("store_missing");
    assert!(
        TemplateStore::load_json(&tmp.join("absent.json"))
            .unwrap()
            .is_empty()
    );
    assert!(TemplateStore::from_json_str("{}").unwrap().is_empty());
    assert!(matches!(
        TemplateStore::from_json_str("{\"data\": 3}"),
        Err(CardError::Serde(_))
    ));
}

#[test]
fn register_persists_and_reloads() {
    let tmp = temp_dir("store_register");
    let path = tmp.join("templates.json");
    let doc = "Notes\n```cardTemplate\n{\"name\":\"Fire\",\n\"attributes\":[{\"name\":\"hp\",\"x\":10,\"y\":20,\"styling\":\"16px sans\"}]}\n```\n";

    let mut store = TemplateStore::load_json(&path).unwrap();
    let mut sink = JsonFileSink::new(&path);
    let out = AddTemplateCommand.run(&mut store, &mut sink, doc).unwrap();
    assert_eq!(
        out,
        RegisterOutcome::Registered {
            name: "Fire".to_string(),
            replaced: false
        }
    );

    let reloaded = TemplateStore::load_json(&path).unwrap();
    let hp = reloaded
        .find_by_name("Fire")
        .unwrap()
        .attribute("hp")
        .unwrap()
        .unwrap();
    assert_eq!((hp.x, hp.y), (10.0, 20.0));
    assert_eq!(hp.styling, "16px sans");

    std::fs::remove_dir_all(&tmp).ok();
}

struct RejectingSink {
    attempts: usize,
}

impl TemplateSink for RejectingSink {
    fn save(&mut self, _store: &TemplateStore) -> CardResult<()> {
        self.attempts += 1;
        Err(CardError::Other(anyhow::anyhow!("read-only vault")))
    }
}

#[test]
fn failed_save_restores_replaced_template() {
    let original = fire();
    let mut store = TemplateStore::from_templates(vec![original.clone()]);
    let mut sink = RejectingSink { attempts: 0 };
    let doc = "```cardTemplate\n{\"name\":\"Fire\",\"background\":\"other.png\"}\n```";

    assert!(AddTemplateCommand.run(&mut store, &mut sink, doc).is_err());
    assert_eq!(sink.attempts, 1);
    assert_eq!(store.templates(), [original]);
}
