//! Submission and polling over real HTTP.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hunyuan_client::{
        ClientError, GenerateRequest, HunyuanClient, JobHandle, JobKind, JobPoller, JobStatus,
        PollOutcome, PollPolicy, TokioDelay,
    };
    use serde_json::json;

    use crate::{FakeApi, JOB_ID, Reply, SECRET_KEY, closed_addr, config_for};

    fn fast_policy(kind: JobKind) -> PollPolicy {
        PollPolicy::for_kind(kind).with_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_should_submit_and_poll_until_done() {
        let api = FakeApi::start([
            Reply::Status("WAIT"),
            Reply::Status("RUN"),
            Reply::Finished("DONE"),
        ])
        .await
        .unwrap();
        let client = api.client().unwrap();

        let (handle, outcome) = client
            .submit_and_wait(
                JobKind::Professional,
                &json!({"Prompt": "a cute cat"}),
                fast_policy(JobKind::Professional),
                TokioDelay,
            )
            .await
            .unwrap();

        assert_eq!(handle.job_id, JOB_ID);
        assert_eq!(handle.request_id.as_deref(), Some("req-submit"));
        match outcome {
            PollOutcome::Terminal {
                status,
                response,
                attempts,
            } => {
                assert_eq!(status, JobStatus::Done);
                assert_eq!(attempts, 3);
                assert_eq!(response.result_files().len(), 1);
                assert_eq!(response.result_files()[0].file_type, "OBJ");
            }
            other => panic!("expected Terminal, got {other:?}"),
        }

        assert_eq!(
            api.actions(),
            [
                "SubmitHunyuanTo3DProJob",
                "QueryHunyuanTo3DProJob",
                "QueryHunyuanTo3DProJob",
                "QueryHunyuanTo3DProJob",
            ]
        );
        assert!(api.calls().iter().all(|c| c.verified));
    }

    #[tokio::test]
    async fn test_should_send_shaped_body_for_rapid_job() {
        let api = FakeApi::start([]).await.unwrap();
        let client = api.client().unwrap();
        let request = GenerateRequest {
            result_format: Some("glb".to_owned()),
            enable_pbr: Some(true),
            ..GenerateRequest::from_prompt("a wooden chair")
        };

        let handle = client.submit_request(JobKind::Rapid, &request).await.unwrap();

        assert_eq!(handle.kind, JobKind::Rapid);
        let calls = api.calls();
        assert_eq!(calls[0].action, "SubmitHunyuanTo3DRapidJob");
        assert_eq!(
            calls[0].body,
            json!({"Prompt": "a wooden chair", "EnablePBR": true, "ResultFormat": "GLB"})
        );
        assert!(calls[0].verified);
    }

    #[tokio::test]
    async fn test_should_not_contact_api_for_invalid_request() {
        let api = FakeApi::start([]).await.unwrap();
        let client = api.client().unwrap();
        let request = GenerateRequest {
            face_count: Some(10),
            ..GenerateRequest::from_prompt("cube")
        };

        let result = client.submit_request(JobKind::Professional, &request).await;

        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_exhaust_when_job_never_finishes() {
        let api = FakeApi::start([
            Reply::Status("pending"),
            Reply::Status("pending"),
            Reply::Status("pending"),
            Reply::Finished("DONE"),
        ])
        .await
        .unwrap();
        let client = api.client().unwrap();
        let handle = JobHandle::new(JOB_ID, JobKind::Rapid);

        let outcome = JobPoller::new(fast_policy(JobKind::Rapid), TokioDelay)
            .poll(&client, &handle)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            PollOutcome::Exhausted { attempts: 3, ref last_status, .. }
                if last_status.as_deref() == Some("pending")
        ));
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_should_report_remote_failure_as_terminal() {
        let api = FakeApi::start([Reply::Failed("prompt rejected")]).await.unwrap();
        let client = api.client().unwrap();
        let handle = JobHandle::new(JOB_ID, JobKind::Standard);

        let outcome = JobPoller::new(fast_policy(JobKind::Standard), TokioDelay)
            .poll(&client, &handle)
            .await
            .unwrap();

        match &outcome {
            PollOutcome::Terminal {
                status, response, ..
            } => {
                assert_eq!(*status, JobStatus::Failed);
                assert_eq!(response.error_message.as_deref(), Some("prompt rejected"));
            }
            other => panic!("expected Terminal, got {other:?}"),
        }
        assert!(!outcome.is_success());
        assert_eq!(api.actions(), ["QueryHunyuanTo3DJob"]);
    }

    #[tokio::test]
    async fn test_should_keep_polling_through_gateway_errors() {
        let api = FakeApi::start([
            Reply::Raw(http::StatusCode::BAD_GATEWAY, "upstream unavailable"),
            Reply::Finished("success"),
        ])
        .await
        .unwrap();
        let client = api.client().unwrap();
        let handle = JobHandle::new(JOB_ID, JobKind::Professional);

        let outcome = JobPoller::new(fast_policy(JobKind::Professional), TokioDelay)
            .poll(&client, &handle)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            PollOutcome::Terminal { status: JobStatus::Success, attempts: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_should_map_non_json_error_to_http_status() {
        let api = FakeApi::start([Reply::Raw(
            http::StatusCode::SERVICE_UNAVAILABLE,
            "maintenance",
        )])
        .await
        .unwrap();
        let client = api.client().unwrap();

        let err = client
            .query(&JobHandle::new(JOB_ID, JobKind::Professional))
            .await
            .unwrap_err();

        assert!(
            matches!(err, ClientError::HttpStatus { status: 503, ref body } if body == "maintenance")
        );
    }

    #[tokio::test]
    async fn test_should_map_non_json_success_body_to_protocol_error() {
        let api = FakeApi::start([Reply::Raw(http::StatusCode::OK, "not json")])
            .await
            .unwrap();
        let client = api.client().unwrap();

        let err = client
            .query(&JobHandle::new(JOB_ID, JobKind::Rapid))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Protocol(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_should_count_connection_failures_as_attempts() {
        let addr = closed_addr().await.unwrap();
        let client = HunyuanClient::from_config(&config_for(addr, SECRET_KEY)).unwrap();
        let handle = JobHandle::new(JOB_ID, JobKind::Rapid);

        let outcome = JobPoller::new(fast_policy(JobKind::Rapid), TokioDelay)
            .poll(&client, &handle)
            .await
            .unwrap();

        match outcome {
            PollOutcome::Exhausted {
                attempts,
                last_status,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_status, None);
                assert!(
                    matches!(last_error, Some(ClientError::Transport(_))),
                    "got {last_error:?}"
                );
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }
}
