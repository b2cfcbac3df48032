use anyhow::Result;
use aura_live::Config;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/aura-live")?;

    info!("Aura Live v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    info!(
        "Audio: capture {} Hz / playback {} Hz, {} samples per frame",
        cfg.audio.input_sample_rate, cfg.audio.output_sample_rate, cfg.audio.frame_samples
    );

    let session_config = cfg.session_config();
    info!(
        "Session defaults: voice={}, transcribe_input={}, transcribe_output={}",
        session_config.voice, session_config.transcribe_input, session_config.transcribe_output
    );
    info!("Connect a capture device, playback device, and endpoint to go live");

    Ok(())
}
