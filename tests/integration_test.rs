use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use regex_styler::config::{Config, CONFIG_FILE};
use regex_styler::dom::Document;
use regex_styler::settings::{EngineSettings, JsonFileStore, Operator, RuleConfig, Threshold};
use regex_styler::Styler;
use std::fs;
use tempfile::TempDir;

const PAGE: &str = r#"{"tag": "body", "children": [
    {"class": "calendar-event-container", "children": [
        {"tag": "span", "style": "padding: 1px", "children": ["Prazo fatal 18/03"]},
        {"tag": "span", "children": ["Reunião 10/01"]}
    ]},
    {"class": "calendar-event-container", "children": [
        {"tag": "span", "children": ["Audiência sem data"]}
    ]},
    {"class": "sidebar", "children": [
        {"tag": "span", "children": ["Prazo 19/03 fora do calendário"]}
    ]}
]}"#;

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn deadline_rule() -> RuleConfig {
    RuleConfig {
        id: "1".to_string(),
        name: "Prazos".to_string(),
        pattern: "prazo|reuni".to_string(),
        enabled: true,
        enable_background: true,
        background_color: "#fff3cd".to_string(),
        enable_badge: true,
        thresholds: Threshold::stock(),
        ..RuleConfig::default()
    }
}

fn settings(rules: Vec<RuleConfig>) -> EngineSettings {
    EngineSettings {
        class_name: Some("calendar-event-container".to_string()),
        regex_configs: Some(rules),
    }
}

fn badge_labels(doc: &Document) -> Vec<String> {
    doc.elements_by_class("date-badge")
        .into_iter()
        .map(|id| doc.text_content(id))
        .collect()
}

#[test]
fn test_full_workflow_from_files() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::new(temp_dir.path().join("settings.json"));
    store.save(&settings(vec![deadline_rule()]))?;
    Config::init(temp_dir.path())?;
    assert!(temp_dir.path().join(CONFIG_FILE).exists());

    let styler = Styler::load(temp_dir.path(), &store)?;
    let mut doc = Document::from_json(PAGE)?;

    let report = styler.apply(&mut doc, reference()).expect("settings are complete");
    assert_eq!(report.targets, 2);
    assert_eq!(report.decorated, 2);
    assert_eq!(report.badges, 2);
    assert!(report.errors.is_empty());

    // 18/03 is three days out; 10/01 rolled over to next year.
    assert_eq!(badge_labels(&doc), vec!["3d".to_string(), "301d".to_string()]);

    // Elements outside the target class are untouched.
    let sidebar = doc.elements_by_class("sidebar")[0];
    let outside = doc.descendants(sidebar)[0];
    assert!(!doc.element(outside).unwrap().has_class("regex-styled-title"));

    Ok(())
}

#[test]
fn test_rescan_is_idempotent() -> anyhow::Result<()> {
    let styler = Styler::new(Config::default(), settings(vec![deadline_rule()]));
    let mut doc = Document::from_json(PAGE)?;

    styler.apply(&mut doc, reference());
    let first = doc.to_html();
    styler.apply(&mut doc, reference());
    styler.apply(&mut doc, reference());

    assert_eq!(doc.to_html(), first);
    Ok(())
}

#[test]
fn test_clear_restores_original_page() -> anyhow::Result<()> {
    let styler = Styler::new(Config::default(), settings(vec![deadline_rule()]));
    let mut doc = Document::from_json(PAGE)?;
    let pristine = doc.to_html();

    styler.apply(&mut doc, reference());
    assert_eq!(styler.clear(&mut doc), 2);
    assert_eq!(doc.to_html(), pristine);
    Ok(())
}

#[test]
fn test_invalid_pattern_does_not_block_valid_rule() -> anyhow::Result<()> {
    let broken = RuleConfig {
        id: "0".to_string(),
        name: "Broken".to_string(),
        pattern: "[".to_string(),
        enabled: true,
        enable_border: true,
        ..RuleConfig::default()
    };
    let styler = Styler::new(Config::default(), settings(vec![broken, deadline_rule()]));
    let mut doc = Document::from_json(PAGE)?;

    let report = styler.apply(&mut doc, reference()).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].rule, "Broken");
    assert_eq!(report.decorated, 2);

    for id in doc.elements_by_class("regex-styled-title") {
        let element = doc.element(id).unwrap();
        assert_eq!(element.attribute("data-config-id"), Some("1"));
        assert_eq!(element.style.get("background-color"), Some("#fff3cd"));
        assert_eq!(element.style.get("border"), None);
    }
    Ok(())
}

#[test]
fn test_no_target_class_leaves_page_alone() -> anyhow::Result<()> {
    let mut missing = settings(vec![deadline_rule()]);
    missing.class_name = Some("nonexistent-xyz".to_string());
    let styler = Styler::new(Config::default(), missing);
    let mut doc = Document::from_json(PAGE)?;
    let pristine = doc.to_html();

    let report = styler.apply(&mut doc, reference()).unwrap();
    assert!(!report.found_targets());
    assert_eq!(report.rules_applied, 0);
    assert_eq!(doc.to_html(), pristine);
    Ok(())
}

#[test]
fn test_incomplete_settings_do_nothing() -> anyhow::Result<()> {
    let styler = Styler::new(Config::default(), EngineSettings::default());
    let mut doc = Document::from_json(PAGE)?;
    assert!(styler.apply(&mut doc, reference()).is_none());
    Ok(())
}

#[test]
fn test_settings_written_by_editor_are_understood() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("settings.json");
    fs::write(
        &path,
        r##"{
            "className": "calendar-event-container",
            "regexConfigs": [{
                "id": 1718000000000.5,
                "name": "Config 1",
                "pattern": "PRAZO",
                "enabled": true,
                "enableFontSize": true,
                "fontSize": 20,
                "enableBadge": true,
                "thresholds": [{"operator": ">", "value": 0, "color": "#008000"}]
            }]
        }"##,
    )?;
    let store = JsonFileStore::new(&path);

    let styler = Styler::load(temp_dir.path(), &store)?;
    let mut doc = Document::from_json(PAGE)?;
    styler.apply(&mut doc, reference());

    let styled = doc.elements_by_class("regex-styled-title");
    assert_eq!(styled.len(), 1);
    assert_eq!(doc.element(styled[0]).unwrap().style.get("font-size"), Some("20px"));

    let badge = doc.elements_by_class("date-badge")[0];
    assert_eq!(doc.element(badge).unwrap().style.get("background-color"), Some("#008000"));
    Ok(())
}

#[test]
fn test_badge_helper_matches_scan_badges() {
    let styler = Styler::new(Config::default(), EngineSettings::default());
    let rule = RuleConfig {
        thresholds: vec![
            Threshold::new(Operator::Greater, 4, "green"),
            Threshold::new(Operator::LessOrEqual, 1, "black"),
            Threshold::new(Operator::Equal, 2, "red"),
            Threshold::new(Operator::LessOrEqual, 4, "orange"),
        ],
        ..RuleConfig::default()
    };

    let colors: Vec<String> = ["15/03", "17/03", "18/03", "20/03"]
        .iter()
        .map(|text| styler.badge(text, &rule, reference()).unwrap().color)
        .collect();
    assert_eq!(colors, vec!["black", "red", "orange", "green"]);

    assert!(styler.badge("fatal 15/12", &rule, reference()).unwrap().square);
    assert!(!styler.badge("ok 15/12", &rule, reference()).unwrap().square);
    assert!(styler.badge("no date", &rule, reference()).is_none());
}
