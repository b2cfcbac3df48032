use anyhow::Result;
use serde::Deserialize;

use crate::session::LiveSessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub live: LiveConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub input_sample_rate: u32,
    pub output_sample_rate: u32,
    pub frame_samples: usize,
}

#[derive(Debug, Deserialize)]
pub struct LiveConfig {
    pub voice: String,
    pub system_instruction: String,
    pub transcribe_input: bool,
    pub transcribe_output: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Build a per-session configuration from the application settings
    pub fn session_config(&self) -> LiveSessionConfig {
        LiveSessionConfig {
            voice: self.live.voice.clone(),
            system_instruction: self.live.system_instruction.clone(),
            transcribe_input: self.live.transcribe_input,
            transcribe_output: self.live.transcribe_output,
            input_sample_rate: self.audio.input_sample_rate,
            output_sample_rate: self.audio.output_sample_rate,
            frame_samples: self.audio.frame_samples,
            ..LiveSessionConfig::default()
        }
    }
}
