use super::*;
use crate::cli::say::reveal_one;
use crate::core::completion::{CompletionClient, CompletionError};
use crate::core::conversation::SubmitError;
use crate::core::message::Turn;
use async_trait::async_trait;
use std::time::Duration;

struct FixedReply(&'static str);

#[async_trait]
impl CompletionClient for FixedReply {
    async fn complete(&self, _prompt: &str, _history: &[Turn]) -> Result<String, CompletionError> {
        Ok(self.0.to_string())
    }
}

fn test_engine(reply: &'static str) -> Arc<ChatEngine> {
    Arc::new(ChatEngine::new(
        Arc::new(FixedReply(reply)),
        RevealScheduler::new(Duration::from_millis(20)),
    ))
}

#[test]
fn no_subcommand_means_chat() {
    let args = Args::try_parse_from(["prodev"]).unwrap();
    assert_eq!(args.command, None);
    assert_eq!(args.model, None);
}

#[test]
fn say_collects_the_whole_prompt() {
    let args =
        Args::try_parse_from(["prodev", "-m", "gemini-pro", "say", "write", "--fast", "code"])
            .unwrap();
    assert_eq!(
        args.command,
        Some(Commands::Say {
            prompt: vec!["write".into(), "--fast".into(), "code".into()]
        })
    );
    assert_eq!(args.model.as_deref(), Some("gemini-pro"));
}

#[test]
fn flags_override_config_values() {
    let args = Args::try_parse_from(["prodev", "--tick-ms", "5", "--model", "flag-model"]).unwrap();
    let mut config = Config {
        model: Some("file-model".into()),
        tick_interval_ms: Some(50),
        request_timeout_secs: Some(7),
        ..Default::default()
    };

    apply_overrides(&mut config, &args);

    assert_eq!(config.model(), "flag-model");
    assert_eq!(config.tick_interval(), Duration::from_millis(5));
    assert_eq!(config.request_timeout(), Some(Duration::from_secs(7)));
}

#[test]
fn absent_flags_keep_config_values() {
    let args = Args::try_parse_from(["prodev", "chat"]).unwrap();
    let mut config = Config {
        model: Some("file-model".into()),
        ..Default::default()
    };

    apply_overrides(&mut config, &args);

    assert_eq!(config.model(), "file-model");
    assert_eq!(args.command, Some(Commands::Chat));
}

#[test]
fn api_key_must_be_present_and_non_blank() {
    assert_eq!(api_key_from(None).err(), Some(MissingApiKey));
    assert_eq!(api_key_from(Some("  ".into())).err(), Some(MissingApiKey));

    let key = api_key_from(Some(" abc123 \n".into())).expect("key");
    assert_eq!(key.expose(), "abc123");
}

#[test]
fn engine_is_built_from_config() {
    let config = Config {
        base_url: Some("http://localhost:1234/v1beta/".into()),
        tick_interval_ms: Some(3),
        ..Default::default()
    };
    let engine = build_engine(&config, ApiKey::new("k"));

    assert_eq!(
        engine.state(),
        crate::core::conversation::ConversationState::Idle
    );
    assert!(engine.snapshot().turns.is_empty());
}

#[tokio::test(start_paused = true)]
async fn say_reveals_a_single_reply() {
    let out = reveal_one(test_engine("Hi there"), "hello".into(), Vec::new())
        .await
        .expect("reply revealed");

    // The thinking line depends on whether the waiting snapshot was observed
    // before the reply arrived.
    let out = String::from_utf8(out).unwrap();
    assert!(out.ends_with("\nProDev AI:\nHi there\n\n"), "{out:?}");
    assert!(!out.contains("[stopped]"));
}

#[tokio::test(start_paused = true)]
async fn say_reports_blank_prompts() {
    let err = reveal_one(test_engine("unused"), "   ".into(), Vec::new())
        .await
        .expect_err("blank prompt rejected");

    assert_eq!(
        err.downcast_ref::<SubmitError>(),
        Some(&SubmitError::EmptyInput)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn say_output_survives_engine_teardown() {
    // The caller hands over its only reference to the engine.
    let out = reveal_one(test_engine("Hi"), "hello".into(), Vec::new())
        .await
        .expect("reply revealed");

    let out = String::from_utf8(out).unwrap();
    assert!(out.ends_with("\nProDev AI:\nHi\n\n"), "{out:?}");
}
