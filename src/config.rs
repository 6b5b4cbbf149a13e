use std::ffi::OsStr;
use std::fs::File;

use itertools::Itertools;
use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::Unquote;

// Set some default values
const DEFAULT_HOW_MANY: usize = 5;
const DEFAULT_SIMPLE_RESULT_PATH: &str = "result-simple.txt";
const DEFAULT_ADVANCED_RESULT_PATH: &str = "result-advanced.txt";

pub struct AppConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub output: OutputConfig,
}

pub struct DataConfig {
    pub ratings_path: String,
    pub users_path: String,
    pub items_path: String,
}

pub struct ModelConfig {
    pub reference_items: Vec<String>,
    pub how_many: usize,
}

pub struct OutputConfig {
    pub simple_path: String,
    pub advanced_path: String,
}

impl AppConfig {
    pub fn new(config_path: String) -> AppConfig {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(&config_path) {
            let config_text = ConfigText::new(config_file, &config_path)
                .expect("Loading configuration file failed.");
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "ratings_path"]),
                OsStr::new("RATINGS_DATA"),
            ),
            (
                ConfPath::from(&["model", "how_many"]),
                OsStr::new("HOW_MANY"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    fn parse(conf: justconfig::Config) -> AppConfig {
        AppConfig {
            data: DataConfig::parse(&conf, ConfPath::from(&["data"])),
            model: ModelConfig::parse(&conf, ConfPath::from(&["model"])),
            output: OutputConfig::parse(&conf, ConfPath::from(&["output"])),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> DataConfig {
        DataConfig {
            ratings_path: conf
                .get(path.push("ratings_path"))
                .unquote()
                .value()
                .unwrap(),
            users_path: conf.get(path.push("users_path")).unquote().value().unwrap(),
            items_path: conf.get(path.push("items_path")).unquote().value().unwrap(),
        }
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> ModelConfig {
        // The reference items are configured as one comma-separated value.
        let reference_items: String = conf
            .get(path.push("reference_items"))
            .trim()
            .value()
            .unwrap();
        let reference_items = reference_items
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect_vec();

        ModelConfig {
            reference_items,
            how_many: conf
                .get(path.push("how_many"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_HOW_MANY),
        }
    }
}

impl OutputConfig {
    fn parse(conf: &Config, path: ConfPath) -> OutputConfig {
        OutputConfig {
            simple_path: conf
                .get(path.push("simple_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_SIMPLE_RESULT_PATH)),
            advanced_path: conf
                .get(path.push("advanced_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_ADVANCED_RESULT_PATH)),
        }
    }
}
