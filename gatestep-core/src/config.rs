use std::path::{Path, PathBuf};

use serde::Deserialize;

use gatestep_types::{GateMode, PanelParams, SequencerState};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

const SAMPLE_RATE_RANGE: (u32, u32) = (1_000, 384_000);
const BLOCK_SIZE_RANGE: (usize, usize) = (1, 4096);
const RENDER_SECONDS_RANGE: (f32, f32) = (0.001, 3600.0);

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    render: RenderConfig,
}

#[derive(Deserialize, Default)]
struct EngineConfig {
    sample_rate: Option<u32>,
    block_size: Option<usize>,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    clock: Option<f32>,
    steps: Option<f32>,
    gate_mode: Option<String>,
}

#[derive(Deserialize, Default)]
struct RenderConfig {
    seconds: Option<f32>,
}

pub struct Config {
    engine: EngineConfig,
    defaults: DefaultsConfig,
    render: RenderConfig,
}

impl Config {
    /// Embedded defaults overlaid with the user's config file, if any.
    pub fn load() -> Self {
        Self::load_with_user(user_config_path().as_deref())
    }

    /// Embedded defaults overlaid with the file at `user_path`, if it exists.
    pub fn load_with_user(user_path: Option<&Path>) -> Self {
        let mut base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!(target: "config", "embedded config.toml is invalid: {}", e);
            ConfigFile::default()
        });

        if let Some(path) = user_path {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_engine(&mut base.engine, user.engine);
                            merge_defaults(&mut base.defaults, user.defaults);
                            merge_render(&mut base.render, user.render);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            engine: base.engine,
            defaults: base.defaults,
            render: base.render,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.engine
            .sample_rate
            .unwrap_or(44_100)
            .clamp(SAMPLE_RATE_RANGE.0, SAMPLE_RATE_RANGE.1)
    }

    pub fn block_size(&self) -> usize {
        self.engine
            .block_size
            .unwrap_or(64)
            .clamp(BLOCK_SIZE_RANGE.0, BLOCK_SIZE_RANGE.1)
    }

    pub fn render_seconds(&self) -> f32 {
        let secs = self.render.seconds.unwrap_or(8.0);
        if secs.is_finite() {
            secs.clamp(RENDER_SECONDS_RANGE.0, RENDER_SECONDS_RANGE.1)
        } else {
            8.0
        }
    }

    pub fn default_gate_mode(&self) -> GateMode {
        self.defaults
            .gate_mode
            .as_deref()
            .and_then(GateMode::from_name)
            .unwrap_or_default()
    }

    /// Panel knobs for a new patch.
    pub fn default_params(&self) -> PanelParams {
        let mut params = PanelParams::new();
        if let Some(clock) = self.defaults.clock {
            params.set_clock(clock);
        }
        if let Some(steps) = self.defaults.steps {
            params.set_steps(steps);
        }
        params
    }

    /// Pattern state for a new patch.
    pub fn default_state(&self) -> SequencerState {
        SequencerState {
            gate_mode: self.default_gate_mode(),
            ..SequencerState::new()
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gatestep").join("config.toml"))
}

fn merge_engine(base: &mut EngineConfig, user: EngineConfig) {
    if user.sample_rate.is_some() {
        base.sample_rate = user.sample_rate;
    }
    if user.block_size.is_some() {
        base.block_size = user.block_size;
    }
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.clock.is_some() {
        base.clock = user.clock;
    }
    if user.steps.is_some() {
        base.steps = user.steps;
    }
    if user.gate_mode.is_some() {
        base.gate_mode = user.gate_mode;
    }
}

fn merge_render(base: &mut RenderConfig, user: RenderConfig) {
    if user.seconds.is_some() {
        base.seconds = user.seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatestep_types::MAX_STEPS;

    fn write_user(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn test_load_embedded_config() {
        let config = Config::load_with_user(None);
        assert_eq!(config.sample_rate(), 44_100);
        assert_eq!(config.block_size(), 64);
        assert_eq!(config.render_seconds(), 8.0);
        assert_eq!(config.default_gate_mode(), GateMode::Trigger);
        let params = config.default_params();
        assert_eq!(params.clock, 2.0);
        assert_eq!(params.steps, MAX_STEPS as f32);
    }

    #[test]
    fn test_user_overrides_merge() {
        let file = write_user("[engine]\nsample_rate = 48000\n\n[defaults]\ngate_mode = \"gate\"\n");
        let config = Config::load_with_user(Some(file.path()));
        assert_eq!(config.sample_rate(), 48_000);
        // untouched keys keep embedded values
        assert_eq!(config.block_size(), 64);
        assert_eq!(config.default_state().gate_mode, GateMode::Gate);
    }

    #[test]
    fn test_malformed_user_config_is_ignored() {
        let file = write_user("[engine\nsample_rate = ");
        let config = Config::load_with_user(Some(file.path()));
        assert_eq!(config.sample_rate(), 44_100);
    }

    #[test]
    fn test_missing_user_config_is_ignored() {
        let config = Config::load_with_user(Some(Path::new("/nonexistent/gatestep.toml")));
        assert_eq!(config.block_size(), 64);
    }

    #[test]
    fn test_values_are_clamped() {
        let file = write_user(
            "[engine]\nsample_rate = 10\nblock_size = 100000\n\n[defaults]\nclock = 40.0\nsteps = 0.0\ngate_mode = \"bogus\"\n\n[render]\nseconds = -1.0\n",
        );
        let config = Config::load_with_user(Some(file.path()));
        assert_eq!(config.sample_rate(), 1_000);
        assert_eq!(config.block_size(), 4096);
        assert_eq!(config.render_seconds(), 0.001);
        assert_eq!(config.default_gate_mode(), GateMode::Trigger);
        let params = config.default_params();
        assert_eq!(params.clock, 6.0);
        assert_eq!(params.steps, 1.0);
    }
}
