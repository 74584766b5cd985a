// Reads real process variables, so it lives in its own test binary and
// keeps every step in one test: nothing else here touches the environment.

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use choice_agents::config::{API_KEY_VAR, API_URL_VAR};
use choice_agents::{Agent, AgentOptions, Error, Summarizer};

#[tokio::test]
async fn test_agent_reads_credentials_from_environment()
{   let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .and(header("Authorization", "Bearer env-key"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "content": "from env" } }]
      })))
      .expect(1)
      .mount(&server)
      .await;

    std::env::set_var(API_KEY_VAR, "env-key");
    std::env::set_var(API_URL_VAR, server.uri());

    let agent = assert_ok!(Summarizer::new(AgentOptions::default()));
    assert_eq!(agent.core().config().base_url, server.uri());
    let reply = assert_ok!(agent.process("Hello", None).await);
    assert_eq!(reply, "from env");

    // An empty variable counts as unset
    std::env::set_var(API_KEY_VAR, "");
    let err = assert_err!(Summarizer::new(AgentOptions::default()));
    assert_eq!(err, Error::MissingApiKey(API_KEY_VAR.to_string()));

    std::env::remove_var(API_KEY_VAR);
    std::env::remove_var(API_URL_VAR);
    let err = assert_err!(Summarizer::new(AgentOptions::default()));
    assert!(err.is_configuration());
}
