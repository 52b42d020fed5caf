//! Signature acceptance and rejection by the server side.

#[cfg(test)]
mod tests {
    use hunyuan_client::{ClientError, HunyuanClient, JobHandle, JobKind};
    use serde_json::json;

    use crate::{FakeApi, JOB_ID, Reply};

    #[tokio::test]
    async fn test_should_accept_signature_from_valid_credentials() {
        let api = FakeApi::start([Reply::Status("RUN")]).await.unwrap();
        let client = api.client().unwrap();

        let response = client
            .query(&JobHandle::new(JOB_ID, JobKind::Professional))
            .await
            .unwrap();

        assert_eq!(response.status, "RUN");
        assert!(api.calls()[0].verified);
        assert_eq!(api.calls()[0].body, json!({"JobId": JOB_ID}));
    }

    #[tokio::test]
    async fn test_should_surface_signature_failure_as_api_error() {
        let api = FakeApi::start([]).await.unwrap();
        let client = HunyuanClient::from_config(&api.config("wrong-secret")).unwrap();

        let err = client
            .submit(JobKind::Standard, &json!({"Prompt": "cube"}))
            .await
            .unwrap_err();

        match err {
            ClientError::Api {
                code, request_id, ..
            } => {
                assert_eq!(code, "AuthFailure.SignatureFailure");
                assert_eq!(request_id.as_deref(), Some("req-auth"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(!api.calls()[0].verified);
    }

    #[tokio::test]
    async fn test_should_sign_configured_host_independently_of_endpoint_url() {
        let api = FakeApi::start([]).await.unwrap();
        let mut config = api.config(crate::SECRET_KEY);
        config.endpoint.host = "other.tencentcloudapi.com".to_owned();
        let client = HunyuanClient::from_config(&config).unwrap();

        let result = client.submit(JobKind::Rapid, &json!({"Prompt": "cube"})).await;

        assert!(result.is_ok());
        assert!(api.calls()[0].verified);
    }

    #[tokio::test]
    async fn test_should_not_send_when_credentials_cannot_sign() {
        let api = FakeApi::start([]).await.unwrap();
        let mut config = api.config(crate::SECRET_KEY);
        config.endpoint.version = "2025-05-13\r\n".to_owned();
        let client = HunyuanClient::from_config(&config).unwrap();

        let result = client.submit(JobKind::Standard, &json!({"Prompt": "cube"})).await;

        assert!(matches!(result, Err(ref e) if e.is_signing()));
        assert!(api.calls().is_empty());
    }
}
