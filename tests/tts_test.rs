use reelsmith::audio::cache::AudioCache;
use reelsmith::audio::AudioFormat;
use reelsmith::config::Config;
use reelsmith::tts::{self, elevenlabs, provider};

fn elevenlabs_config(cache_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.tts.backend = Some("elevenlabs".to_string());
    config.tts.elevenlabs.voice_id = None;
    config.cache_dir = Some(cache_dir.to_path_buf());
    config
}

// Only test in this binary that touches the ElevenLabs environment.
#[test]
fn cached_speech_follows_the_voice_from_the_environment() {
    let dir = tempfile::tempdir().unwrap();
    let config = elevenlabs_config(dir.path());
    let backend = provider::select_backend("elevenlabs").unwrap();
    let text = "Routines reduce stress.";

    std::env::remove_var(elevenlabs::API_KEY_ENV);
    std::env::set_var(elevenlabs::VOICE_ID_ENV, "voice-a");
    let key_a = tts::cache_key(backend.as_ref(), text, &config.tts).unwrap();
    let (max_bytes, max_entries) = config.cache_limits();
    AudioCache::new(dir.path().to_path_buf(), max_bytes, max_entries)
        .put(&key_a, AudioFormat::Mp3, b"VOICE_A_AUDIO")
        .unwrap();

    let speech = tts::synthesize(text, &config, &None).unwrap();
    assert_eq!(speech.bytes, b"VOICE_A_AUDIO");

    std::env::set_var(elevenlabs::VOICE_ID_ENV, "voice-b");
    let key_b = tts::cache_key(backend.as_ref(), text, &config.tts).unwrap();
    assert_ne!(key_a, key_b);
    // No cached audio for voice-b and no API key, so synthesis must be attempted and fail.
    let err = tts::synthesize(text, &config, &None).unwrap_err();
    assert!(format!("{err:#}").contains(elevenlabs::API_KEY_ENV));

    std::env::remove_var(elevenlabs::VOICE_ID_ENV);
}

#[test]
fn config_voice_overrides_are_part_of_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = elevenlabs_config(dir.path());
    let backend = provider::select_backend("elevenlabs").unwrap();

    config.tts.elevenlabs.voice_id = Some("voice-a".to_string());
    let key_a = tts::cache_key(backend.as_ref(), "hello", &config.tts).unwrap();
    config.tts.elevenlabs.voice_id = Some("voice-b".to_string());
    let key_b = tts::cache_key(backend.as_ref(), "hello", &config.tts).unwrap();
    assert_ne!(key_a, key_b);
}

#[test]
fn unknown_backend_is_rejected_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let config = elevenlabs_config(dir.path());
    let err = tts::synthesize("hello", &config, &Some("festival".to_string())).unwrap_err();
    assert!(err.to_string().contains("unknown backend: festival"));
}
