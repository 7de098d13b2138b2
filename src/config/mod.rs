use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
	pub storage: StorageConfig,
}

impl AppConfig {
	/// Loads configuration from the embedded defaults, an optional
	/// `obs-filestore.toml` in the working directory and the environment.
	pub fn new() -> Result<Self, config::ConfigError> {
		Self::load(environment())
	}

	fn load(env: config::Environment) -> Result<Self, config::ConfigError> {
		use config::Config;
		let s = Config::builder()
			.add_source(config::File::from_str(
				include_str!("defaults.toml"),
				config::FileFormat::Toml,
			))
			.add_source(config::File::with_name("obs-filestore.toml").required(false))
			.add_source(env)
			.build()?;

		s.try_deserialize()
	}
}

fn environment() -> config::Environment {
	config::Environment::with_prefix("OBS_FILESTORE")
		.prefix_separator("_")
		.separator("__")
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
	// Directory for complex observation payload files. Also configurable via
	// env var OBS_FILESTORE_STORAGE__COMPLEX_OBS_DIR.
	pub complex_obs_dir: PathBuf,
}
