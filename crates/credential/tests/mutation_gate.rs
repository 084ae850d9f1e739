//! Integration tests for mutation serialization
//!
//! The mock service records when each request arrives and holds every
//! response for a fixed delay. With the gate in place no two exchanges may
//! overlap, so consecutive arrivals are at least one delay apart.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use credbridge_credential::prelude::*;
use credbridge_credential::providers::TOKEN_VAR;
use secrecy::SecretString;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate, matchers::method};

const HOLD: Duration = Duration::from_millis(100);

#[derive(Clone, Default)]
struct ArrivalRecorder {
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl ArrivalRecorder {
    fn sorted(&self) -> Vec<Instant> {
        let mut arrivals = self.arrivals.lock().unwrap().clone();
        arrivals.sort();
        arrivals
    }
}

impl Respond for ArrivalRecorder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": 0}))
            .set_delay(HOLD)
    }
}

async fn setup() -> (MockServer, ArrivalRecorder, Arc<Orchestrator>) {
    let server = MockServer::start().await;
    let recorder = ArrivalRecorder::default();
    Mock::given(method("POST"))
        .respond_with(recorder.clone())
        .mount(&server)
        .await;

    let env = Arc::new(StaticEnv::new().with(TOKEN_VAR, "tok"));
    let orchestrator = Orchestrator::with_environment(env);
    let mut config = serde_json::Map::new();
    config.insert("connection_url".into(), server.uri().into());
    orchestrator.initialize(&config, false).unwrap();

    (server, recorder, Arc::new(orchestrator))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_issue_and_revoke_never_overlap() {
    // GIVEN: A slow provisioning service
    let (_server, recorder, orchestrator) = setup().await;

    // WHEN: Issues and revokes are fired concurrently
    let mut tasks = Vec::new();
    for i in 0..3 {
        let issuer = Arc::clone(&orchestrator);
        tasks.push(tokio::spawn(async move {
            issuer
                .issue(
                    &RequestContext::new(),
                    &[json!({"dbname": format!("db{i}")}).to_string()],
                    &SecretString::from("pw".to_string()),
                )
                .await
                .map(drop)
        }));

        let revoker = Arc::clone(&orchestrator);
        tasks.push(tokio::spawn(async move {
            revoker
                .revoke(&RequestContext::new(), &format!("V-USER{i}_r"), &["{}".to_string()])
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // THEN: Every exchange started after the previous one finished
    let arrivals = recorder.sorted();
    assert_eq!(arrivals.len(), 6);
    for pair in arrivals.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap >= HOLD - Duration::from_millis(10),
            "exchanges overlapped: gap was {gap:?}"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_update_waits_for_in_flight_mutation() {
    let (_server, _recorder, orchestrator) = setup().await;

    let issuer = Arc::clone(&orchestrator);
    let issue = tokio::spawn(async move {
        issuer
            .issue(
                &RequestContext::new(),
                &["{}".to_string()],
                &SecretString::from("pw".to_string()),
            )
            .await
    });

    // Let the issue take the gate before updating.
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(orchestrator.gate().is_held());

    let started = Instant::now();
    orchestrator
        .update(&RequestContext::new(), "V-ABC_r", None)
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(40));

    issue.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queued_call_cancelled_before_network() {
    let (server, recorder, orchestrator) = setup().await;

    let issuer = Arc::clone(&orchestrator);
    let first = tokio::spawn(async move {
        issuer
            .issue(
                &RequestContext::new(),
                &["{}".to_string()],
                &SecretString::from("pw".to_string()),
            )
            .await
    });
    tokio::time::sleep(Duration::from_millis(30)).await;

    // WHEN: A queued revoke is cancelled while the gate is held
    let token = CancellationToken::new();
    let ctx = RequestContext::with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });
    let err = orchestrator
        .revoke(&ctx, "V-ABC_r", &["{}".to_string()])
        .await
        .unwrap_err();
    canceller.await.unwrap();

    // THEN: It aborts and only the first call reached the service
    assert!(err.is_aborted());
    first.await.unwrap().unwrap();
    assert_eq!(recorder.sorted().len(), 1);
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gate_covers_validation() {
    // GIVEN: An issue holding the gate
    let (_server, recorder, orchestrator) = setup().await;
    let issuer = Arc::clone(&orchestrator);
    let issue = tokio::spawn(async move {
        issuer
            .issue(
                &RequestContext::new(),
                &["{}".to_string()],
                &SecretString::from("pw".to_string()),
            )
            .await
    });
    tokio::time::sleep(Duration::from_millis(30)).await;

    // WHEN: A revoke with a broken statement arrives meanwhile
    let started = Instant::now();
    let err = orchestrator
        .revoke(&RequestContext::new(), "V-ABC_r", &["{broken".to_string()])
        .await
        .unwrap_err();

    // THEN: It fails only after the issue has released the gate
    assert!(matches!(err, ProvisionError::InvalidStatement { .. }));
    assert!(started.elapsed() >= Duration::from_millis(40));
    issue.await.unwrap().unwrap();
    assert_eq!(recorder.sorted().len(), 1);
}
