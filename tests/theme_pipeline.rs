//! Theme pipeline integration tests
//!
//! Full resolution passes over on-disk layer directories: merge precedence,
//! generated artifacts, fault isolation and regeneration behavior.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use theme_kit::config::FsLoader;
use theme_kit::{
    enumerate_paths, generate_options_typing, merge_layers, CacheStore, ChannelPublisher,
    ConfigurationLayer, FileStore, LayerDirs, LayerSource, ModuleOptions, RefreshOutcome,
    Refresher, Trigger,
};
use theme_protocol::{files, OPTIONS_CACHE_KEY, TOKENS_CACHE_KEY};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn module(build_dir: &Path) -> ModuleOptions {
    ModuleOptions {
        build_dir: build_dir.to_path_buf(),
        ..Default::default()
    }
}

/// App layer overriding a base theme, both using conventional files.
fn two_layer_project() -> (TempDir, TempDir) {
    let app = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();

    write(
        app.path(),
        "theme.config.json",
        r#"{"header": {"title": "My Docs"}, "socials": ["github"]}"#,
    );
    write(
        app.path(),
        "tokens.config.yaml",
        "color:\n  primary:\n    value: \"#ff0000\"\n",
    );

    write(
        base.path(),
        "theme.config.toml",
        r#"
socials = ["twitter", "discord"]

[header]
title = "Base Theme"
logo = true

[footer]
credits = "Powered by theme-kit"
"#,
    );
    write(
        base.path(),
        "tokens.config.json",
        r##"{"color": {"primary": {"value": "#00dc82"}, "secondary": {"value": "{color.primary}"}}, "space": {"sm": {"value": "4px"}}}"##,
    );
    write(
        base.path(),
        "layer.config.json",
        r#"{"theme": {"meta": {"name": "Base", "author": "Acme", "motd": true}}}"#,
    );

    (app, base)
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

// =============================================================================
// Merge precedence across on-disk layers
// =============================================================================

#[test]
fn test_two_layer_merge() {
    let (app, base) = two_layer_project();
    let layers = LayerDirs::new(vec![app.path().to_path_buf(), base.path().to_path_buf()])
        .layers()
        .unwrap();

    let merged = merge_layers(&layers, &ModuleOptions::default(), &FsLoader);

    // Options: first layer wins, arrays replaced wholesale
    assert_eq!(
        merged.options_value(),
        json!({
            "header": {"title": "My Docs", "logo": true},
            "socials": ["twitter", "discord"],
            "footer": {"credits": "Powered by theme-kit"}
        })
    );

    // Tokens: later layer wins
    assert_eq!(merged.tokens["color"]["primary"]["value"], "#00dc82");
    assert_eq!(merged.tokens["space"]["sm"]["value"], "4px");

    assert_eq!(
        merged.options_file_paths,
        vec![app.path().join("theme.config.json"), base.path().join("theme.config.toml")]
    );
    assert_eq!(
        merged.tokens_file_paths,
        vec![app.path().join("tokens.config.yaml"), base.path().join("tokens.config.json")]
    );
    assert_eq!(merged.metas.len(), 1);
    assert_eq!(merged.metas[0].author.as_deref(), Some("Acme"));
}

#[test]
fn test_end_to_end_inline_layer() {
    let layers = vec![ConfigurationLayer::new(
        "/app",
        json!({"theme": {"meta": {"name": "T"}, "options": {"color": "red"}}}),
    )];

    let merged = merge_layers(&layers, &ModuleOptions::default(), &FsLoader);

    assert_eq!(serde_json::to_value(&merged.metas).unwrap(), json!([{"name": "T"}]));
    assert_eq!(merged.options_value(), json!({"color": "red"}));
    assert!(merged.options_file_paths.is_empty());
}

#[test]
fn test_explicit_paths_without_extension() {
    let app = TempDir::new().unwrap();
    fs::create_dir(app.path().join("design")).unwrap();
    write(&app.path().join("design"), "options.yml", "accent: teal\n");
    write(
        app.path(),
        "layer.config.json",
        r#"{"theme": {"options": "design/options", "tokens": false}}"#,
    );

    let layers = LayerDirs::new(vec![app.path().to_path_buf()]).layers().unwrap();
    let merged = merge_layers(&layers, &ModuleOptions::default(), &FsLoader);

    assert_eq!(merged.options_value(), json!({"accent": "teal"}));
    assert_eq!(merged.options_file_paths, vec![app.path().join("design/options.yml")]);
    assert!(merged.tokens_file_paths.is_empty());
}

// =============================================================================
// Full passes
// =============================================================================

#[test]
fn test_boot_pass_writes_every_artifact() {
    let (app, base) = two_layer_project();
    let build = TempDir::new().unwrap();
    let store_dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::new(store_dir.path()));
    let publisher = Arc::new(ChannelPublisher::new());
    let updates = publisher.subscribe();

    let refresher = Refresher::new(
        module(build.path()),
        LayerDirs::new(vec![app.path().to_path_buf(), base.path().to_path_buf()]),
    )
    .with_store(store.clone())
    .with_publisher(publisher.clone());

    let RefreshOutcome::Completed(report) = refresher.trigger(Trigger::Boot) else {
        panic!("boot pass failed");
    };
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    assert_eq!(report.written.len(), files::OPTIONS_OUTPUTS.len() + files::TOKEN_OUTPUTS.len());

    let declaration = read(build.path(), files::OPTIONS_TYPES);
    assert!(declaration.contains("export interface ThemeOptions {"));
    assert!(declaration.contains("'header.title'"));
    assert!(declaration.contains("socials: Array<string>,"));

    let css = read(build.path(), files::CSS_VARIABLES);
    assert!(css.contains("--color-primary: #00dc82;"));
    assert!(css.contains("--color-secondary: #00dc82;"));

    let module_ts = read(build.path(), files::TOKENS_MODULE);
    assert!(module_ts.contains("export const $t = $tokens"));

    let cached = store.get(OPTIONS_CACHE_KEY).unwrap().unwrap();
    assert_eq!(cached["header"]["title"], "My Docs");
    assert!(store.get(TOKENS_CACHE_KEY).unwrap().is_some());

    let update = updates.try_recv().unwrap();
    assert_eq!(update.options, cached);
}

#[test]
fn test_regeneration_is_idempotent() {
    let (app, base) = two_layer_project();
    let build = TempDir::new().unwrap();
    let dirs = vec![app.path().to_path_buf(), base.path().to_path_buf()];

    let first = Refresher::new(module(build.path()), LayerDirs::new(dirs.clone()));
    first.trigger(Trigger::Boot);
    let before: Vec<String> = files::OPTIONS_OUTPUTS
        .iter()
        .chain(files::TOKEN_OUTPUTS)
        .map(|name| read(build.path(), name))
        .collect();

    let second = Refresher::new(module(build.path()), LayerDirs::new(dirs));
    let RefreshOutcome::Completed(report) = second.trigger(Trigger::Boot) else {
        panic!("second pass failed");
    };

    assert!(report.written.is_empty(), "rewrote {:?}", report.written);
    let after: Vec<String> = files::OPTIONS_OUTPUTS
        .iter()
        .chain(files::TOKEN_OUTPUTS)
        .map(|name| read(build.path(), name))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_typing_is_byte_identical() {
    let options = json!({"header": {"title": "x", "links": [{"to": "/"}]}, "debug": null});
    let first = generate_options_typing(&options, None).unwrap();
    let second = generate_options_typing(&options, None).unwrap();

    assert_eq!(first.declaration.as_bytes(), second.declaration.as_bytes());
    assert_eq!(first.module.as_bytes(), second.module.as_bytes());
}

#[test]
fn test_force_rewrites_token_outputs() {
    let (app, base) = two_layer_project();
    let build = TempDir::new().unwrap();
    let dirs = vec![app.path().to_path_buf(), base.path().to_path_buf()];

    Refresher::new(module(build.path()), LayerDirs::new(dirs.clone())).trigger(Trigger::Boot);

    let forced = Refresher::new(module(build.path()), LayerDirs::new(dirs)).with_force(true);
    let RefreshOutcome::Completed(report) = forced.trigger(Trigger::Boot) else {
        panic!("forced pass failed");
    };

    let mut written = report.written.clone();
    written.sort();
    let mut expected: Vec<String> = files::TOKEN_OUTPUTS.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(written, expected);

    let mut unchanged = report.unchanged.clone();
    unchanged.sort();
    let mut options_outputs: Vec<String> = files::OPTIONS_OUTPUTS.iter().map(|s| s.to_string()).collect();
    options_outputs.sort();
    assert_eq!(unchanged, options_outputs);
}

// =============================================================================
// Fault isolation
// =============================================================================

#[test]
fn test_malformed_token_file_keeps_first_layer() {
    let app = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    write(app.path(), "tokens.config.json", r#"{"radius": {"md": {"value": "8px"}}}"#);
    write(base.path(), "tokens.config.json", r#"{"radius": {"md": "#);

    let layers = LayerDirs::new(vec![app.path().to_path_buf(), base.path().to_path_buf()])
        .layers()
        .unwrap();
    let merged = merge_layers(&layers, &ModuleOptions::default(), &FsLoader);

    assert_eq!(merged.tokens_value(), json!({"radius": {"md": {"value": "8px"}}}));
    assert_eq!(merged.tokens_file_paths, vec![app.path().join("tokens.config.json")]);
}

#[test]
fn test_invalid_schema_hint_keeps_previous_typing() {
    let app = TempDir::new().unwrap();
    let build = TempDir::new().unwrap();
    write(app.path(), "theme.config.json", r#"{"title": "Docs"}"#);

    let dirs = vec![app.path().to_path_buf()];
    Refresher::new(module(build.path()), LayerDirs::new(dirs.clone())).trigger(Trigger::Boot);
    let before = read(build.path(), files::OPTIONS_TYPES);

    write(
        app.path(),
        "theme.config.json",
        r#"{"title": "Docs", "extra": 1, "schema": {"title": "date"}}"#,
    );
    let RefreshOutcome::Completed(report) =
        Refresher::new(module(build.path()), LayerDirs::new(dirs)).trigger(Trigger::Boot)
    else {
        panic!("pass should complete with a warning");
    };

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("options typing:"));
    assert_eq!(read(build.path(), files::OPTIONS_TYPES), before);
}

// =============================================================================
// Paths
// =============================================================================

#[test]
fn test_option_paths_follow_merge_order() {
    let (app, base) = two_layer_project();
    let layers = LayerDirs::new(vec![app.path().to_path_buf(), base.path().to_path_buf()])
        .layers()
        .unwrap();
    let merged = merge_layers(&layers, &ModuleOptions::default(), &FsLoader);

    assert_eq!(
        enumerate_paths(&merged.options_value()),
        vec!["header", "header.title", "header.logo", "socials", "footer", "footer.credits"]
    );

    let token_paths = enumerate_paths(&Value::Object(merged.tokens));
    assert!(token_paths.contains(&"color.secondary.value".to_string()));
}
