#![deny(warnings)]
#![deny(rust_2018_idioms)]

use ais_consumer::settings::Settings;
use config::{Config, File};

pub mod consumer;
pub mod helper;
pub mod startup;

fn load(file: &str, environment: &str) -> Settings {
    Config::builder()
        .add_source(File::with_name(file).required(true))
        .set_override("environment", environment)
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap()
}

#[test]
fn test_local_settings_are_valid() {
    let settings = load("config/local.yml", "Local");
    assert_eq!(settings.stream.url, None);
    assert_eq!(settings.stream.backlog_capacity, 10);
}

#[test]
fn test_development_settings_are_valid() {
    let settings = load("config/development.yml", "Development");
    assert!(settings.stream.url.is_some());
}

#[test]
fn test_production_settings_are_valid() {
    load("config/production.yml", "Production");
}
